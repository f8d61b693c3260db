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
use crate::hosting::github::text_field;
use crate::hosting::http::ProviderHttp;
use crate::hosting::throttle::Provider;
use crate::hosting::traits::{ClientError, FolderEntry, Release, RepoIdentity, RepositoryClient};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// GitLab仓库访问适配器
///
/// 基于GitLab REST API v4，对gitlab.com与自托管实例同样适用
/// （base_url来自仓库URL本身）。项目路径在API中以URL编码的
/// "owner%2Frepo"寻址。
pub struct GitLabClient {
    identity: RepoIdentity,
    host_type: HostType,
    http: Arc<ProviderHttp>,
    default_branch: OnceCell<String>,
}

impl GitLabClient {
    /// 从仓库URL构造适配器
    pub fn from_url(
        url: &str,
        host_type: HostType,
        http: Arc<ProviderHttp>,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            identity: RepoIdentity::from_url(url)?,
            host_type,
            http,
            default_branch: OnceCell::new(),
        })
    }

    fn project_api(&self) -> String {
        let project_path = format!("{}/{}", self.identity.owner, self.identity.repo);
        format!(
            "{}/api/v4/projects/{}",
            self.identity.base_url,
            urlencoding::encode(&project_path)
        )
    }

    async fn project_info(&self) -> Result<Option<serde_json::Value>, ClientError> {
        self.http.get_json(Provider::GitLab, &self.project_api()).await
    }

    async fn resolve_branch(&self, branch: Option<&str>) -> Result<String, ClientError> {
        if let Some(b) = branch {
            return Ok(b.to_string());
        }
        let resolved = self
            .default_branch
            .get_or_try_init(|| async {
                let info = self.project_info().await?;
                Ok::<String, ClientError>(
                    info.as_ref()
                        .and_then(|v| v.get("default_branch"))
                        .and_then(|v| v.as_str())
                        .unwrap_or("master")
                        .to_string(),
                )
            })
            .await?;
        Ok(resolved.clone())
    }
}

#[async_trait]
impl RepositoryClient for GitLabClient {
    fn identity(&self) -> &RepoIdentity {
        &self.identity
    }

    fn host_type(&self) -> HostType {
        self.host_type
    }

    async fn get_file(
        &self,
        path: &str,
        branch: Option<&str>,
    ) -> Result<Option<String>, ClientError> {
        let branch = self.resolve_branch(branch).await?;
        let url = format!(
            "{}/repository/files/{}/raw?ref={}",
            self.project_api(),
            urlencoding::encode(path),
            urlencoding::encode(&branch)
        );
        // The raw endpoint serves bytes; binary content is treated as
        // absent rather than handed to the classifier
        let Some(bytes) = self.http.get_bytes(Provider::GitLab, &url).await? else {
            return Ok(None);
        };
        Ok(String::from_utf8(bytes).ok())
    }

    async fn get_folder(
        &self,
        path: &str,
        branch: Option<&str>,
    ) -> Result<Option<Vec<FolderEntry>>, ClientError> {
        let branch = self.resolve_branch(branch).await?;
        let url = format!(
            "{}/repository/tree?path={}&ref={}",
            self.project_api(),
            urlencoding::encode(path),
            urlencoding::encode(&branch)
        );
        let Some(value) = self.http.get_json(Provider::GitLab, &url).await? else {
            return Ok(None);
        };
        let Some(items) = value.as_array() else {
            return Ok(None);
        };
        // GitLab reports a missing path as an empty tree rather than a 404
        if items.is_empty() {
            return Ok(None);
        }
        let entries = items
            .iter()
            .map(|item| FolderEntry {
                name: text_field(item, "name"),
                path: text_field(item, "path"),
                kind: text_field(item, "type"),
            })
            .collect();
        Ok(Some(entries))
    }

    async fn get_releases(&self) -> Result<Option<Vec<Release>>, ClientError> {
        let url = format!("{}/releases", self.project_api());
        let Some(value) = self.http.get_json(Provider::GitLab, &url).await? else {
            return Ok(None);
        };
        let Some(items) = value.as_array() else {
            return Ok(None);
        };
        let releases = items
            .iter()
            .map(|item| Release {
                name: text_field(item, "name"),
                tag_name: text_field(item, "tag_name"),
            })
            .collect();
        Ok(Some(releases))
    }

    async fn get_issue_count(&self) -> Result<u64, ClientError> {
        Ok(self
            .project_info()
            .await?
            .as_ref()
            .and_then(|v| v.get("open_issues_count"))
            .and_then(|v| v.as_u64())
            .unwrap_or(0))
    }

    async fn get_fork_count(&self) -> Result<u64, ClientError> {
        Ok(self
            .project_info()
            .await?
            .as_ref()
            .and_then(|v| v.get("forks_count"))
            .and_then(|v| v.as_u64())
            .unwrap_or(0))
    }
}

#[cfg(test)]
#[path = "gitlab_test.rs"]
mod tests;
