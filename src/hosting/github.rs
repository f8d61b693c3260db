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
use crate::hosting::http::{decode_base64_text, ProviderHttp};
use crate::hosting::throttle::Provider;
use crate::hosting::traits::{ClientError, FolderEntry, Release, RepoIdentity, RepositoryClient};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// GitHub仓库访问适配器
///
/// 基于GitHub REST API v3的匿名只读访问。
/// 文件内容经contents接口以base64返回，在此解码。
pub struct GitHubClient {
    identity: RepoIdentity,
    http: Arc<ProviderHttp>,
    /// 默认分支，首次需要时从仓库信息惰性获取
    default_branch: OnceCell<String>,
}

impl GitHubClient {
    /// 从仓库URL构造适配器
    pub fn from_url(url: &str, http: Arc<ProviderHttp>) -> Result<Self, ClientError> {
        Ok(Self {
            identity: RepoIdentity::from_url(url)?,
            http,
            default_branch: OnceCell::new(),
        })
    }

    fn api_root(&self) -> String {
        format!(
            "https://api.github.com/repos/{}/{}",
            self.identity.owner, self.identity.repo
        )
    }

    async fn repo_info(&self) -> Result<Option<serde_json::Value>, ClientError> {
        self.http.get_json(Provider::GitHub, &self.api_root()).await
    }

    async fn default_branch(&self) -> Result<&str, ClientError> {
        let branch = self
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
        Ok(branch.as_str())
    }

    async fn resolve_branch(&self, branch: Option<&str>) -> Result<String, ClientError> {
        match branch {
            Some(b) => Ok(b.to_string()),
            None => Ok(self.default_branch().await?.to_string()),
        }
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
        self.http.get_json(Provider::GitHub, &url).await
    }
}

#[async_trait]
impl RepositoryClient for GitHubClient {
    fn identity(&self) -> &RepoIdentity {
        &self.identity
    }

    fn host_type(&self) -> HostType {
        HostType::GitHub
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
        // Content API falls back to a raw download URL for large files
        if let Some(download_url) = info.get("download_url").and_then(|v| v.as_str()) {
            return self.http.get_text(Provider::GitHub, download_url).await;
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
        // A file path yields an object instead of an array
        let Some(items) = listing.as_array() else {
            return Ok(None);
        };
        Ok(Some(items.iter().map(folder_entry).collect()))
    }

    async fn get_releases(&self) -> Result<Option<Vec<Release>>, ClientError> {
        let url = format!("{}/releases", self.api_root());
        let Some(value) = self.http.get_json(Provider::GitHub, &url).await? else {
            return Ok(None);
        };
        let Some(items) = value.as_array() else {
            return Ok(None);
        };
        Ok(Some(items.iter().map(release_entry).collect()))
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

fn folder_entry(item: &serde_json::Value) -> FolderEntry {
    FolderEntry {
        name: text_field(item, "name"),
        path: text_field(item, "path"),
        kind: text_field(item, "type"),
    }
}

fn release_entry(item: &serde_json::Value) -> Release {
    Release {
        name: text_field(item, "name"),
        tag_name: text_field(item, "tag_name"),
    }
}

pub(crate) fn text_field(value: &serde_json::Value, key: &str) -> String {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}
