// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::host::HostType;
use crate::domain::repositories::task_repository::RepositoryError;
use async_trait::async_trait;

/// 已发现主机仓库特质
///
/// 持久化 scheme+authority → HostType 的映射，避免对同一
/// 自托管实例的兄弟仓库重复网络探测。只追加，写入幂等：
/// 同一主机总是解析出同一类型，并发写入收敛到相同值是无害的。
#[async_trait]
pub trait HostCacheRepository: Send + Sync {
    /// 记录一个已发现的主机；已存在时不做任何修改
    async fn insert(&self, host_url: &str, host_type: HostType) -> Result<(), RepositoryError>;

    /// 查询主机的已知类型
    async fn find(&self, host_url: &str) -> Result<Option<HostType>, RepositoryError>;

    /// 列出所有已发现的主机及类型
    async fn list(&self) -> Result<Vec<(String, HostType)>, RepositoryError>;
}
