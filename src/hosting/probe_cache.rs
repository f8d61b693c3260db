// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::host::HostType;
use crate::domain::repositories::host_cache_repository::HostCacheRepository;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::warn;

/// 主机探测缓存
///
/// 内存层（DashMap）叠加持久层（git_hosts表）。区分自托管
/// GitLab和Gitea实例需要网络探测，代价高；同一主机上的后续
/// 仓库从这里直接取结果。写入幂等：同一主机总是解析出同一
/// 类型，并发写入收敛到相同值是无害的。
pub struct HostProbeCache {
    memory: DashMap<String, HostType>,
    store: Arc<dyn HostCacheRepository>,
}

impl HostProbeCache {
    /// 创建探测缓存
    ///
    /// # 参数
    ///
    /// * `store` - 持久化主机仓库
    pub fn new(store: Arc<dyn HostCacheRepository>) -> Self {
        Self {
            memory: DashMap::new(),
            store,
        }
    }

    /// 查询主机的已知类型；先查内存再查持久层
    pub async fn get(&self, host_url: &str) -> Option<HostType> {
        if let Some(entry) = self.memory.get(host_url) {
            return Some(*entry);
        }
        match self.store.find(host_url).await {
            Ok(Some(host_type)) => {
                self.memory.insert(host_url.to_string(), host_type);
                Some(host_type)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(host = host_url, error = %e, "Host cache lookup failed");
                None
            }
        }
    }

    /// 记录探测结果；持久层失败只降级为告警，不影响本次解析
    pub async fn insert(&self, host_url: &str, host_type: HostType) {
        self.memory.insert(host_url.to_string(), host_type);
        if let Err(e) = self.store.insert(host_url, host_type).await {
            warn!(host = host_url, error = %e, "Failed to persist discovered host");
        }
    }
}
