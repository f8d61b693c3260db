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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// 应用程序配置设置
///
/// 包含数据库、HTTP、限流和并发控制等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 数据库配置
    pub database: DatabaseSettings,
    /// HTTP客户端配置
    pub http: HttpSettings,
    /// 抓取器配置
    pub crawler: CrawlerSettings,
    /// 各托管服务的自我限速配置
    pub throttle: ThrottleSettings,
}

/// 数据库配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite数据库文件路径
    pub path: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 获取连接的繁忙等待时间（秒）
    pub busy_timeout: Option<u64>,
}

/// HTTP客户端配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct HttpSettings {
    /// 单次请求超时时间（秒），把挂起转化为该任务的传输失败
    pub timeout_secs: u64,
    /// User-Agent头
    pub user_agent: String,
}

/// 抓取器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerSettings {
    /// 并发worker数量
    pub workers: usize,
    /// 每批领取的任务数
    pub batch_size: u32,
    /// 传输失败的最大重试次数
    pub max_retries: u32,
}

/// 限速配置设置
///
/// 对各公共API的最小请求间隔，是合作式自我限速而非响应式退避。
/// 默认值对应各服务未认证访问的公开配额。
#[derive(Debug, Clone, Deserialize)]
pub struct ThrottleSettings {
    /// GitHub请求最小间隔（毫秒）
    pub github_delay_ms: u64,
    /// GitLab请求最小间隔（毫秒）
    pub gitlab_delay_ms: u64,
    /// Gitea/Forgejo请求最小间隔（毫秒）
    pub gitea_delay_ms: u64,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从默认值、配置文件和环境变量分层加载
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Default database settings
            .set_default("database.path", "modscout.db")?
            .set_default("database.max_connections", 5)?
            .set_default("database.busy_timeout", 5)?
            // Default HTTP settings
            .set_default("http.timeout_secs", 10)?
            .set_default(
                "http.user_agent",
                "Mozilla/5.0 (compatible; modscout/0.1; +https://github.com/Kirky-X/modscout)",
            )?
            // Default crawler settings
            .set_default("crawler.workers", 4)?
            .set_default("crawler.batch_size", 10)?
            .set_default("crawler.max_retries", 3)?
            // Default throttle settings, matching public unauthenticated quotas
            .set_default("throttle.github_delay_ms", 1200)?
            .set_default("throttle.gitlab_delay_ms", 500)?
            .set_default("throttle.gitea_delay_ms", 300)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("MODSCOUT").separator("__"));

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
