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
use crate::hosting::http::ProviderHttp;
use crate::hosting::throttle::Provider;
use crate::hosting::traits::{ClientError, FolderEntry, Release, RepoIdentity, RepositoryClient};
use async_trait::async_trait;
use std::sync::Arc;

/// 无法识别托管软件的git服务适配器
///
/// 没有可用的REST API时退而求其次：按常见web前端的原始文件
/// 路径约定（cgit、gitweb等）逐个尝试。只支持读文件，
/// 文件夹、发布和计数均按未知处理。
pub struct GenericGitClient {
    identity: RepoIdentity,
    repo_url: String,
    http: Arc<ProviderHttp>,
}

impl GenericGitClient {
    /// 从仓库URL构造适配器
    pub fn from_url(url: &str, http: Arc<ProviderHttp>) -> Result<Self, ClientError> {
        Ok(Self {
            identity: RepoIdentity::from_url(url)?,
            repo_url: url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// 候选的原始文件URL，按命中概率排序
    fn candidate_urls(&self, path: &str, branch: Option<&str>) -> Vec<String> {
        let mut candidates = Vec::new();
        if let Some(branch) = branch {
            candidates.push(format!("{}/raw/{}/{}", self.repo_url, branch, path));
        }
        for refname in ["master", "main", "HEAD"] {
            candidates.push(format!("{}/raw/{}/{}", self.repo_url, refname, path));
        }
        candidates.push(format!("{}/plain/{}", self.repo_url, path));
        candidates
    }
}

#[async_trait]
impl RepositoryClient for GenericGitClient {
    fn identity(&self) -> &RepoIdentity {
        &self.identity
    }

    fn host_type(&self) -> HostType {
        HostType::GenericGit
    }

    async fn get_file(
        &self,
        path: &str,
        branch: Option<&str>,
    ) -> Result<Option<String>, ClientError> {
        let mut last_err: Option<ClientError> = None;

        for url in self.candidate_urls(path, branch) {
            match self.http.get_text(Provider::Generic, &url).await {
                Ok(Some(content)) => return Ok(Some(content)),
                Ok(None) => continue,
                Err(ClientError::RateLimited) => return Err(ClientError::RateLimited),
                Err(e) => last_err = Some(e),
            }
        }

        // All candidates missed; an unreachable host is still a transport
        // failure, not a confirmed absence
        match last_err {
            Some(e) => Err(e),
            None => Ok(None),
        }
    }

    async fn get_folder(
        &self,
        _path: &str,
        _branch: Option<&str>,
    ) -> Result<Option<Vec<FolderEntry>>, ClientError> {
        Ok(None)
    }

    async fn get_releases(&self) -> Result<Option<Vec<Release>>, ClientError> {
        Ok(None)
    }

    async fn get_issue_count(&self) -> Result<u64, ClientError> {
        Ok(0)
    }

    async fn get_fork_count(&self) -> Result<u64, ClientError> {
        Ok(0)
    }
}
