// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 仓库托管服务类型
///
/// 表示一个仓库URL所属的git托管服务家族。
/// 每个URL在其生命周期内只解析一次，解析结果按
/// scheme+authority缓存，同一主机上的其他仓库不再探测。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostType {
    /// github.com
    GitHub,
    /// gitlab.com
    GitLab,
    /// 自托管GitLab实例（通过manifest.json指纹识别）
    GitLabSelfHosted,
    /// Gitea或Forgejo实例（通过页面标记识别）
    Gitea,
    /// codeberg.org（Forgejo，走Gitea适配器）
    Codeberg,
    /// bitbucket.org（可识别但无适配器）
    Bitbucket,
    /// 无法识别托管软件但仍可能按原始路径抓取的git服务
    GenericGit,
    /// 完全无法识别的主机
    Unknown,
}

impl HostType {
    /// 判断该类型是否有可用的仓库访问适配器
    pub fn has_adapter(&self) -> bool {
        !matches!(self, HostType::Bitbucket | HostType::Unknown)
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HostType::GitHub => "github",
            HostType::GitLab => "gitlab",
            HostType::GitLabSelfHosted => "gitlab-selfhosted",
            HostType::Gitea => "gitea",
            HostType::Codeberg => "codeberg",
            HostType::Bitbucket => "bitbucket",
            HostType::GenericGit => "generic-git",
            HostType::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for HostType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "github" => Ok(HostType::GitHub),
            "gitlab" => Ok(HostType::GitLab),
            "gitlab-selfhosted" => Ok(HostType::GitLabSelfHosted),
            "gitea" => Ok(HostType::Gitea),
            "codeberg" => Ok(HostType::Codeberg),
            "bitbucket" => Ok(HostType::Bitbucket),
            "generic-git" => Ok(HostType::GenericGit),
            "unknown" => Ok(HostType::Unknown),
            _ => Err(()),
        }
    }
}
