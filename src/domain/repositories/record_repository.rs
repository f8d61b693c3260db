// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::package::PackageMetadata;
use crate::domain::repositories::task_repository::RepositoryError;
use async_trait::async_trait;

/// 分类结果落库特质
///
/// CrawlWorker确认一个包后通过此接口持久化分类结果，
/// 下游报表工具消费，本系统不再读取
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// 持久化一条确认的分类结果及其来源
    async fn record(
        &self,
        metadata: &PackageMetadata,
        source: &str,
        url: &str,
    ) -> Result<(), RepositoryError>;
}
