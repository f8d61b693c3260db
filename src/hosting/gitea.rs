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
use crate::hosting::http::{decode_base64_text, ProviderHttp};
use crate::hosting::throttle::Provider;
use crate::hosting::traits::{ClientError, FolderEntry, Release, RepoIdentity, RepositoryClient};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Gitea/Forgejo仓库访问适配器
///
/// 两个项目共享同一套API v1，codeberg.org也走这里。
/// contents接口与GitHub同构：base64内容或download_url兜底。
pub struct GiteaClient {
    identity: RepoIdentity,
    host_type: HostType,
    http: Arc<ProviderHttp>,
    default_branch: OnceCell<String>,
}

impl GiteaClient {
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

    fn api_root(&self) -> String {
        format!(
            "{}/api/v1/repos/{}/{}",
            self.identity.base_url, self.identity.owner, self.identity.repo
        )
    }

    async fn repo_info(&self) -> Result<Option<serde_json::Value>, ClientError> {
        self.http.get_json(Provider::Gitea, &self.api_root()).await
    }

    async fn resolve_branch(&self, branch: Option<&str>) -> Result<String, ClientError> {
        if let Some(b) = branch {
            return Ok(b.to_string());
        }
        let resolved = self
            .default_branch
            .get_or_try_init(|| async {
                let info = self.repo_info().await?;
                Ok::<String, ClientError>(
                    info.as_ref()
                        .and_then(|v| v.get("default_branch"))
                        .and_then(|v| v.as_str())
                        .unwrap_or("main")
                        .to_string(),
                )
            })
            .await?;
        Ok(resolved.clone())
    }

    async fn contents(
        &self,
        path: &str,
        branch: Option<&str>,
    ) -> Result<Option<serde_json::Value>, ClientError> {
        let branch = self.resolve_branch(branch).await?;
        let url = format!(
            "{}/contents/{}?ref={}",
            self.api_root(),
            path,
            urlencoding::encode(&branch)
        );
        self.http.get_json(Provider::Gitea, &url).await
    }
}

#[async_trait]
impl RepositoryClient for GiteaClient {
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
        let Some(info) = self.contents(path, branch).await? else {
            return Ok(None);
        };

        if info.get("encoding").and_then(|v| v.as_str()) == Some("base64") {
            let content = info.get("content").and_then(|v| v.as_str()).unwrap_or("");
            return Ok(decode_base64_text(content));
        }
        if let Some(download_url) = info.get("download_url").and_then(|v| v.as_str()) {
            return self.http.get_text(Provider::Gitea, download_url).await;
        }
        Ok(None)
    }

    async fn get_folder(
        &self,
        path: &str,
        branch: Option<&str>,
    ) -> Result<Option<Vec<FolderEntry>>, ClientError> {
        let Some(listing) = self.contents(path, branch).await? else {
            return Ok(None);
        };
        let Some(items) = listing.as_array() else {
            return Ok(None);
        };
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
        let url = format!("{}/releases", self.api_root());
        let Some(value) = self.http.get_json(Provider::Gitea, &url).await? else {
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
            .repo_info()
            .await?
            .as_ref()
            .and_then(|v| v.get("open_issues_count"))
            .and_then(|v| v.as_u64())
            .unwrap_or(0))
    }

    async fn get_fork_count(&self) -> Result<u64, ClientError> {
        Ok(self
            .repo_info()
            .await?
            .as_ref()
            .and_then(|v| v.get("forks_count"))
            .and_then(|v| v.as_u64())
            .unwrap_or(0))
    }
}
