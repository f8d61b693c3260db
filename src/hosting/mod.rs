// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 托管服务模块
///
/// 提供主机类型解析、探测缓存以及三类REST API之上的
/// 统一只读仓库访问适配器
pub mod generic;
pub mod gitea;
pub mod github;
pub mod gitlab;
pub mod http;
pub mod probe_cache;
pub mod resolver;
pub mod throttle;
pub mod traits;

use crate::domain::models::host::HostType;
use crate::hosting::generic::GenericGitClient;
use crate::hosting::gitea::GiteaClient;
use crate::hosting::github::GitHubClient;
use crate::hosting::gitlab::GitLabClient;
use crate::hosting::http::ProviderHttp;
use crate::hosting::traits::{ClientError, RepositoryClient};
use std::sync::Arc;

/// 按主机类型构造仓库访问适配器
///
/// 闭合的静态工厂：HostType标签决定实现，没有运行时反射。
/// 无适配器的类型（bitbucket、unknown）返回None，由调用方
/// 决定如何标记任务。
pub fn client_for(
    host_type: HostType,
    url: &str,
    http: &Arc<ProviderHttp>,
) -> Result<Option<Box<dyn RepositoryClient>>, ClientError> {
    let client: Box<dyn RepositoryClient> = match host_type {
        HostType::GitHub => Box::new(GitHubClient::from_url(url, http.clone())?),
        HostType::GitLab | HostType::GitLabSelfHosted => {
            Box::new(GitLabClient::from_url(url, host_type, http.clone())?)
        }
        HostType::Gitea | HostType::Codeberg => {
            Box::new(GiteaClient::from_url(url, host_type, http.clone())?)
        }
        HostType::GenericGit => Box::new(GenericGitClient::from_url(url, http.clone())?),
        HostType::Bitbucket | HostType::Unknown => return Ok(None),
    };
    Ok(Some(client))
}
