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

use crate::config::settings::HttpSettings;
use crate::hosting::throttle::{Provider, ProviderThrottle};
use crate::hosting::traits::ClientError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;

/// 托管服务HTTP访问层
///
/// 所有适配器共享一个匿名reqwest客户端：统一的单次请求超时、
/// User-Agent和按服务的限速许可。状态码到契约的映射也集中在
/// 这里：404 → None，配额信号 → RateLimited并暂停该服务，
/// 5xx → ServerError。
pub struct ProviderHttp {
    client: reqwest::Client,
    throttle: Arc<ProviderThrottle>,
}

impl ProviderHttp {
    /// 创建HTTP访问层
    ///
    /// # 参数
    ///
    /// * `settings` - HTTP客户端配置
    /// * `throttle` - 共享的服务限速门
    pub fn new(
        settings: &HttpSettings,
        throttle: Arc<ProviderThrottle>,
    ) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self { client, throttle })
    }

    /// 发起GET请求并把状态码映射到统一契约
    ///
    /// # 返回值
    ///
    /// * `Ok(Some(response))` - 2xx成功响应
    /// * `Ok(None)` - 404，路径在该ref下不存在
    /// * `Err(ClientError)` - 传输失败或配额耗尽
    async fn get(
        &self,
        provider: Provider,
        url: &str,
    ) -> Result<Option<reqwest::Response>, ClientError> {
        self.throttle.acquire(provider).await?;

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(Some(response));
        }
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if status == StatusCode::TOO_MANY_REQUESTS || is_quota_exhausted(&response) {
            self.throttle.pause(provider);
            return Err(ClientError::RateLimited);
        }
        if status.is_server_error() {
            return Err(ClientError::ServerError(status.as_u16()));
        }
        Err(ClientError::Malformed(format!(
            "unexpected HTTP {} from {}",
            status.as_u16(),
            url
        )))
    }

    /// GET并解析JSON响应；404返回None
    pub async fn get_json(
        &self,
        provider: Provider,
        url: &str,
    ) -> Result<Option<serde_json::Value>, ClientError> {
        match self.get(provider, url).await? {
            Some(response) => {
                let value = response
                    .json::<serde_json::Value>()
                    .await
                    .map_err(|e| ClientError::Malformed(e.to_string()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// GET并读取文本响应；404返回None
    pub async fn get_text(
        &self,
        provider: Provider,
        url: &str,
    ) -> Result<Option<String>, ClientError> {
        match self.get(provider, url).await? {
            Some(response) => Ok(Some(response.text().await?)),
            None => Ok(None),
        }
    }

    /// GET并读取原始字节；404返回None
    ///
    /// 原始文件端点直接回传字节，是否为文本由调用方判定
    pub async fn get_bytes(
        &self,
        provider: Provider,
        url: &str,
    ) -> Result<Option<Vec<u8>>, ClientError> {
        match self.get(provider, url).await? {
            Some(response) => Ok(Some(response.bytes().await?.to_vec())),
            None => Ok(None),
        }
    }
}

/// 判断响应是否为配额耗尽信号
///
/// GitHub风格：403且x-ratelimit-remaining为0
fn is_quota_exhausted(response: &reqwest::Response) -> bool {
    if response.status() != StatusCode::FORBIDDEN {
        return false;
    }
    response
        .headers()
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim() == "0")
}

/// 解码内容API返回的base64文本
///
/// GitHub/Gitea的contents接口以带换行的base64返回文件内容。
/// 二进制或无法解码为UTF-8的内容按"不存在"处理，不交给分类器。
pub(crate) fn decode_base64_text(content: &str) -> Option<String> {
    let compact: String = content.split_whitespace().collect();
    let bytes = STANDARD.decode(compact).ok()?;
    String::from_utf8(bytes).ok()
}
