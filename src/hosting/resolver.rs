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
use crate::hosting::probe_cache::HostProbeCache;
use crate::hosting::throttle::Provider;
use crate::utils::url_utils;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::debug;

/// 已知托管域名的快速匹配表，按顺序第一个命中生效
///
/// 命中即短路，不发起任何网络访问
static KNOWN_HOST_PATTERNS: Lazy<Vec<(Regex, HostType)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"^https://github\.com/[\w\-\.]+/[\w\-\.]+/?$").expect("valid regex"),
            HostType::GitHub,
        ),
        (
            Regex::new(r"^https://gitlab\.com/[\w\-\.]+/[\w\-\.]+/?$").expect("valid regex"),
            HostType::GitLab,
        ),
        (
            Regex::new(r"^https://codeberg\.org/[\w\-\.]+/[\w\-\.]+/?$").expect("valid regex"),
            HostType::Codeberg,
        ),
        (
            Regex::new(r"^https://bitbucket\.org/[\w\-\.]+/[\w\-\.]+/?$").expect("valid regex"),
            HostType::Bitbucket,
        ),
        (
            Regex::new(r"^https?://.*\.git$").expect("valid regex"),
            HostType::GenericGit,
        ),
    ]
});

/// Gitea/Forgejo实例的页面标记
const GITEA_MARKERS: [&str; 6] = [
    r#"href="https://about.gitea.com/""#,
    r#"href="https://forgejo.org/""#,
    "Powered by Gitea",
    "Powered by Forgejo",
    r#"content="Gitea""#,
    r#"content="Forgejo""#,
];

/// 托管服务解析器
///
/// 从裸URL判定适用的托管服务适配器，调用方无需预先知道。
/// 快速路径按字面域名匹配；未知域名走指纹探测，结果按
/// scheme+authority缓存，同一自托管实例的兄弟仓库不再探测。
pub struct HostResolver {
    http: Arc<ProviderHttp>,
    cache: Arc<HostProbeCache>,
}

impl HostResolver {
    /// 创建解析器
    pub fn new(http: Arc<ProviderHttp>, cache: Arc<HostProbeCache>) -> Self {
        Self { http, cache }
    }

    /// 解析URL所属的托管服务类型
    ///
    /// 探测期间的网络错误被吞掉并视为负信号（继续尝试下一个
    /// 候选服务），绝不作为错误向调用方传播：指纹缺失是证据，
    /// 不是失败。
    pub async fn resolve(&self, url: &str) -> HostType {
        let url = url.trim();

        // Fast path: literal domains, no network access
        for (pattern, host_type) in KNOWN_HOST_PATTERNS.iter() {
            if pattern.is_match(url) {
                return *host_type;
            }
        }

        // Only host/owner/repo shaped URLs are worth probing
        if !url_utils::looks_like_repo_url(url) {
            return HostType::Unknown;
        }
        let Some(host) = url_utils::host_key(url) else {
            return HostType::Unknown;
        };

        if let Some(cached) = self.cache.get(&host).await {
            debug!(host = %host, host_type = %cached, "Host type resolved from cache");
            return cached;
        }

        let host_type = self.probe(&host).await;
        self.cache.insert(&host, host_type).await;
        host_type
    }

    /// 对未知主机进行指纹探测
    async fn probe(&self, host: &str) -> HostType {
        if self.probe_gitlab(host).await {
            return HostType::GitLabSelfHosted;
        }
        if self.probe_gitea(host).await {
            return HostType::Gitea;
        }
        // No fingerprint matched; still potentially fetchable over raw paths
        HostType::GenericGit
    }

    /// GitLab指纹：/-/manifest.json 的name字段为"GitLab"
    async fn probe_gitlab(&self, host: &str) -> bool {
        let manifest_url = format!("{}/-/manifest.json", host);
        match self.http.get_json(Provider::Generic, &manifest_url).await {
            Ok(Some(manifest)) => {
                manifest.get("name").and_then(|v| v.as_str()) == Some("GitLab")
            }
            _ => false,
        }
    }

    /// Gitea/Forgejo指纹：首页HTML中的已知标记
    async fn probe_gitea(&self, host: &str) -> bool {
        match self.http.get_text(Provider::Generic, host).await {
            Ok(Some(body)) => GITEA_MARKERS.iter().any(|marker| body.contains(marker)),
            _ => false,
        }
    }
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;
