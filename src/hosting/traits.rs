// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::models::host::HostType;
use crate::utils::url_utils;
use async_trait::async_trait;
use thiserror::Error;

/// 仓库访问错误类型
///
/// 与"路径不存在"严格区分：404由各操作以Ok(None)表达，
/// 此处的错误都是传输层或配额层面的失败
#[derive(Error, Debug)]
pub enum ClientError {
    /// 请求失败（超时、连接错误等）
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 服务端错误
    #[error("Server error: HTTP {0}")]
    ServerError(u16),
    /// 服务方配额耗尽，本次运行内暂停该服务的调度
    #[error("Rate limited by provider")]
    RateLimited,
    /// 响应格式不符合预期
    #[error("Malformed response: {0}")]
    Malformed(String),
    /// 仓库URL无法解析出owner/repo
    #[error("Invalid repository url: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// 判断错误是否可重试
    ///
    /// # 返回值
    ///
    /// 如果错误是可重试的则返回true，否则返回false
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::RequestFailed(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            ClientError::ServerError(_) => true,
            // RateLimited is handled by pausing the provider, not by retrying
            _ => false,
        }
    }
}

/// 仓库身份
///
/// 从裸URL构造适配器所需的最小信息：scheme+host、owner、repo。
/// 匿名公开访问是基线契约，不要求认证会话。
#[derive(Debug, Clone)]
pub struct RepoIdentity {
    /// scheme+authority，例如 https://codeberg.org
    pub base_url: String,
    /// 仓库所有者（用户或组织）
    pub owner: String,
    /// 仓库名
    pub repo: String,
}

impl RepoIdentity {
    /// 从仓库URL解析身份
    pub fn from_url(url: &str) -> Result<Self, ClientError> {
        let base_url = url_utils::host_key(url)
            .ok_or_else(|| ClientError::InvalidUrl(url.to_string()))?;
        let (owner, repo) = url_utils::owner_and_repo(url)
            .ok_or_else(|| ClientError::InvalidUrl(url.to_string()))?;
        Ok(Self {
            base_url,
            owner,
            repo,
        })
    }
}

/// 文件夹条目
#[derive(Debug, Clone)]
pub struct FolderEntry {
    /// 条目名
    pub name: String,
    /// 仓库内路径
    pub path: String,
    /// 条目种类（file / dir / tree / blob，按各服务的叫法）
    pub kind: String,
}

/// 发布版本
#[derive(Debug, Clone)]
pub struct Release {
    /// 版本名
    pub name: String,
    /// 关联的tag名
    pub tag_name: String,
}

/// 仓库访问特质
///
/// 三个结构不同的REST API之上的统一只读契约。
/// 所有路径操作接受可选分支，缺省使用服务端报告的默认分支
/// （每实例惰性获取并缓存一次）。
///
/// 统一约定：底层API的404表示"该ref下路径不存在"，以Ok(None)
/// 返回；传输失败以Err返回，调用方必须能区分"确定不存在"与
/// "因失败而未知"。
#[async_trait]
pub trait RepositoryClient: Send + Sync {
    /// 仓库身份
    fn identity(&self) -> &RepoIdentity;

    /// 所属托管服务类型
    fn host_type(&self) -> HostType;

    /// 读取文件文本内容；路径不存在或内容无法解码为文本时返回None
    async fn get_file(
        &self,
        path: &str,
        branch: Option<&str>,
    ) -> Result<Option<String>, ClientError>;

    /// 读取文件夹列表；路径不存在时返回None
    async fn get_folder(
        &self,
        path: &str,
        branch: Option<&str>,
    ) -> Result<Option<Vec<FolderEntry>>, ClientError>;

    /// 读取发布列表；服务不提供时返回None
    async fn get_releases(&self) -> Result<Option<Vec<Release>>, ClientError>;

    /// 开放issue数，未知时为0
    async fn get_issue_count(&self) -> Result<u64, ClientError>;

    /// fork数，未知时为0
    async fn get_fork_count(&self) -> Result<u64, ClientError>;
}
