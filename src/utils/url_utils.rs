// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// 仓库URL形状：https://<host>/<owner>/<repo>，可带结尾斜杠
static REPO_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://[\w\-\.]+(?::\d+)?/[\w\-\.]+/[\w\-\.]+/?$").expect("valid regex")
});

/// 归一化仓库URL：去掉结尾斜杠和.git后缀
pub fn normalize_repo_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    trimmed.strip_suffix(".git").unwrap_or(trimmed).to_string()
}

/// 判断URL是否具有 https://<host>/<owner>/<repo> 的形状
pub fn looks_like_repo_url(url: &str) -> bool {
    REPO_SHAPE.is_match(url)
}

/// 提取scheme+authority作为主机缓存键
pub fn host_key(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let key = match parsed.port() {
        Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
        None => format!("{}://{}", parsed.scheme(), host),
    };
    Some(key)
}

/// 从仓库URL中提取owner和repo两段路径
pub fn owner_and_repo(url: &str) -> Option<(String, String)> {
    let parsed = Url::parse(url).ok()?;
    let mut segments = parsed.path_segments()?.filter(|s| !s.is_empty());
    let owner = segments.next()?.to_string();
    let repo = segments.next()?.trim_end_matches(".git").to_string();
    Some((owner, repo))
}
