// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task::{EnqueueOutcome, QueueTask};
use async_trait::async_trait;
use thiserror::Error;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
    /// 无效数据
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// 任务仓库特质
///
/// 定义发现队列的数据访问接口。claim操作必须是原子的：
/// 选取与标记占用在一条语句内完成，并发worker不会领到同一任务。
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// 插入新任务；URL已存在时不做任何修改
    async fn insert_if_absent(
        &self,
        url: &str,
        source: &str,
        priority: i64,
        metadata: Option<&serde_json::Value>,
    ) -> Result<EnqueueOutcome, RepositoryError>;

    /// 原子领取一批待处理任务
    ///
    /// 按优先级降序、入队时间升序（同优先级内最旧优先）返回，
    /// 顺序是确定性的
    async fn claim_batch(&self, limit: u32) -> Result<Vec<QueueTask>, RepositoryError>;

    /// 标记任务处理完成，可附带失败原因；幂等
    async fn mark_processed(&self, id: i64, error: Option<&str>) -> Result<(), RepositoryError>;

    /// 将已领取但未完成的任务放回pending
    async fn release(&self, id: i64) -> Result<(), RepositoryError>;

    /// 清除上次运行遗留的占用标记
    async fn reset_claims(&self) -> Result<u64, RepositoryError>;

    /// 待处理任务数
    async fn pending_count(&self) -> Result<u64, RepositoryError>;

    /// 已处理任务数
    async fn processed_count(&self) -> Result<u64, RepositoryError>;
}
