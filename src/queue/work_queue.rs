// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task::{EnqueueOutcome, QueueTask};
use crate::domain::repositories::task_repository::TaskRepository;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// 队列错误类型
#[derive(Error, Debug)]
pub enum QueueError {
    /// 仓库错误
    #[error("Repository error: {0}")]
    Repository(#[from] crate::domain::repositories::task_repository::RepositoryError),

    /// 无效任务
    #[error("Invalid task: {0}")]
    InvalidTask(String),
}

/// 工作队列特质
///
/// 持久化的发现队列：去重入队、按优先级认领、终态标记。
/// 认领是至多一次语义，同一任务不会同时被两个工作者持有。
#[async_trait]
pub trait WorkQueue: Send + Sync {
    /// 入队任务（按URL幂等）
    async fn enqueue(
        &self,
        url: &str,
        source: &str,
        priority: i64,
        metadata: Option<&serde_json::Value>,
    ) -> Result<EnqueueOutcome, QueueError>;

    /// 认领一批待处理任务
    async fn claim_batch(&self, limit: u32) -> Result<Vec<QueueTask>, QueueError>;

    /// 标记任务为已处理（error为None表示成功）
    async fn mark_processed(&self, task_id: i64, error: Option<&str>) -> Result<(), QueueError>;

    /// 将已认领但未完成的任务释放回待处理状态
    async fn release(&self, task_id: i64) -> Result<(), QueueError>;

    /// 待处理任务数
    async fn pending_count(&self) -> Result<u64, QueueError>;
    /// 已处理任务数
    async fn processed_count(&self) -> Result<u64, QueueError>;
}

/// SQLite工作队列实现
pub struct SqliteWorkQueue<R: TaskRepository> {
    /// 任务仓库
    repository: Arc<R>,
}

impl<R: TaskRepository> SqliteWorkQueue<R> {
    /// 创建新的SQLite工作队列实例
    ///
    /// # 参数
    ///
    /// * `repository` - 任务仓库
    ///
    /// # 返回值
    ///
    /// 返回新的SQLite工作队列实例
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R: TaskRepository> WorkQueue for SqliteWorkQueue<R> {
    /// 入队任务
    ///
    /// # 参数
    ///
    /// * `url` - 仓库URL（去重键，入队前归一化）
    /// * `source` - 发现来源标签
    /// * `priority` - 优先级，大者先认领
    /// * `metadata` - 随任务携带的JSON负载
    ///
    /// # 返回值
    ///
    /// * `Ok(EnqueueOutcome)` - 新插入或已存在
    /// * `Err(QueueError)` - 入队失败
    async fn enqueue(
        &self,
        url: &str,
        source: &str,
        priority: i64,
        metadata: Option<&serde_json::Value>,
    ) -> Result<EnqueueOutcome, QueueError> {
        let url = crate::utils::url_utils::normalize_repo_url(url);
        if url.is_empty() {
            return Err(QueueError::InvalidTask("empty url".to_string()));
        }
        let outcome = self
            .repository
            .insert_if_absent(&url, source, priority, metadata)
            .await?;
        Ok(outcome)
    }

    /// 认领一批任务
    ///
    /// # 参数
    ///
    /// * `limit` - 单批最大任务数
    ///
    /// # 返回值
    ///
    /// * `Ok(Vec<QueueTask>)` - 认领到的任务，优先级降序、同优先级先入先出
    /// * `Err(QueueError)` - 认领失败
    async fn claim_batch(&self, limit: u32) -> Result<Vec<QueueTask>, QueueError> {
        let tasks = self.repository.claim_batch(limit).await?;
        Ok(tasks)
    }

    /// 标记任务终态
    ///
    /// # 参数
    ///
    /// * `task_id` - 任务ID
    /// * `error` - 失败原因；None表示成功
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 成功
    /// * `Err(QueueError)` - 失败
    async fn mark_processed(&self, task_id: i64, error: Option<&str>) -> Result<(), QueueError> {
        self.repository.mark_processed(task_id, error).await?;
        Ok(())
    }

    /// 释放任务回待处理状态
    ///
    /// # 参数
    ///
    /// * `task_id` - 任务ID
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 成功
    /// * `Err(QueueError)` - 失败
    async fn release(&self, task_id: i64) -> Result<(), QueueError> {
        self.repository.release(task_id).await?;
        Ok(())
    }

    async fn pending_count(&self) -> Result<u64, QueueError> {
        let count = self.repository.pending_count().await?;
        Ok(count)
    }

    async fn processed_count(&self) -> Result<u64, QueueError> {
        let count = self.repository.processed_count().await?;
        Ok(count)
    }
}

#[async_trait]
impl<T: WorkQueue + ?Sized> WorkQueue for Arc<T> {
    async fn enqueue(
        &self,
        url: &str,
        source: &str,
        priority: i64,
        metadata: Option<&serde_json::Value>,
    ) -> Result<EnqueueOutcome, QueueError> {
        (**self).enqueue(url, source, priority, metadata).await
    }

    async fn claim_batch(&self, limit: u32) -> Result<Vec<QueueTask>, QueueError> {
        (**self).claim_batch(limit).await
    }

    async fn mark_processed(&self, task_id: i64, error: Option<&str>) -> Result<(), QueueError> {
        (**self).mark_processed(task_id, error).await
    }

    async fn release(&self, task_id: i64) -> Result<(), QueueError> {
        (**self).release(task_id).await
    }

    async fn pending_count(&self) -> Result<u64, QueueError> {
        (**self).pending_count().await
    }

    async fn processed_count(&self) -> Result<u64, QueueError> {
        (**self).processed_count().await
    }
}
