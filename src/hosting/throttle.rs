// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::ThrottleSettings;
use crate::hosting::traits::ClientError;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::warn;

/// 托管服务分组
///
/// 限速门按服务分组，而不是按主机：同一服务家族的公开配额相同
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    GitHub,
    GitLab,
    Gitea,
    /// 无已知配额的generic-git主机，不限速
    Generic,
}

/// 单个服务的限速门
struct Gate {
    /// 最小请求间隔限速器；间隔为0时不限速
    limiter: Option<DefaultDirectRateLimiter>,
    /// 配额耗尽标记，置位后本次运行内不再向该服务派发请求
    paused: AtomicBool,
}

impl Gate {
    fn new(delay_ms: u64) -> Self {
        let limiter = Quota::with_period(Duration::from_millis(delay_ms)).map(RateLimiter::direct);
        Self {
            limiter,
            paused: AtomicBool::new(false),
        }
    }
}

/// 各托管服务的合作式自我限速
///
/// 对每个服务维持一个最小请求间隔（合作式限速，非响应式退避）。
/// 当某服务明确返回配额耗尽信号时，该服务的门被暂停，
/// 其余任务留在pending由下次运行处理。
pub struct ProviderThrottle {
    github: Gate,
    gitlab: Gate,
    gitea: Gate,
    generic: Gate,
}

impl ProviderThrottle {
    /// 按配置创建限速门
    pub fn new(settings: &ThrottleSettings) -> Self {
        Self {
            github: Gate::new(settings.github_delay_ms),
            gitlab: Gate::new(settings.gitlab_delay_ms),
            gitea: Gate::new(settings.gitea_delay_ms),
            generic: Gate::new(0),
        }
    }

    fn gate(&self, provider: Provider) -> &Gate {
        match provider {
            Provider::GitHub => &self.github,
            Provider::GitLab => &self.gitlab,
            Provider::Gitea => &self.gitea,
            Provider::Generic => &self.generic,
        }
    }

    /// 在向服务发起请求前获取许可
    ///
    /// 服务已暂停时立即返回RateLimited，否则等到最小间隔许可
    pub async fn acquire(&self, provider: Provider) -> Result<(), ClientError> {
        let gate = self.gate(provider);
        if gate.paused.load(Ordering::Acquire) {
            return Err(ClientError::RateLimited);
        }
        if let Some(limiter) = &gate.limiter {
            limiter.until_ready().await;
        }
        Ok(())
    }

    /// 暂停某服务的后续派发（配额耗尽信号触发）
    pub fn pause(&self, provider: Provider) {
        let gate = self.gate(provider);
        if !gate.paused.swap(true, Ordering::AcqRel) {
            warn!(provider = ?provider, "Provider quota exhausted, pausing dispatch for this run");
        }
    }

    /// 查询某服务是否已暂停
    pub fn is_paused(&self, provider: Provider) -> bool {
        self.gate(provider).paused.load(Ordering::Acquire)
    }
}
