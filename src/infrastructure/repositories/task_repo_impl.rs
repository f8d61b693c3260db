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

use crate::domain::models::task::{EnqueueOutcome, QueueTask};
use crate::domain::repositories::task_repository::{RepositoryError, TaskRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// 任务仓库实现
///
/// 基于sqlx/SQLite实现的发现队列数据访问层
#[derive(Clone)]
pub struct TaskRepositoryImpl {
    /// 数据库连接池
    pool: SqlitePool,
}

impl TaskRepositoryImpl {
    /// 创建新的任务仓库实例
    ///
    /// # 参数
    ///
    /// * `pool` - 数据库连接池
    ///
    /// # 返回值
    ///
    /// 返回新的任务仓库实例
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_task(row: &SqliteRow) -> Result<QueueTask, RepositoryError> {
    let metadata: Option<String> = row.try_get("metadata")?;
    let metadata = metadata
        .map(|raw| serde_json::from_str(&raw))
        .transpose()
        .map_err(|e| RepositoryError::InvalidData(format!("metadata is not JSON: {}", e)))?;

    Ok(QueueTask {
        id: row.try_get("id")?,
        url: row.try_get("url")?,
        source: row.try_get("source")?,
        priority: row.try_get("priority")?,
        metadata,
        processed: row.try_get("processed")?,
        error: row.try_get("error")?,
        added_at: row.try_get("added_at")?,
        processed_at: row.try_get("processed_at")?,
    })
}

#[async_trait]
impl TaskRepository for TaskRepositoryImpl {
    /// 插入新任务
    ///
    /// url列上的唯一索引承担去重；INSERT OR IGNORE让重复URL
    /// 成为零行写入而不是约束错误。
    ///
    /// # 参数
    ///
    /// * `url` - 仓库URL
    /// * `source` - 发现来源标签
    /// * `priority` - 优先级
    /// * `metadata` - 附加JSON负载
    ///
    /// # 返回值
    ///
    /// * `Ok(EnqueueOutcome)` - 新插入或已存在
    /// * `Err(RepositoryError)` - 数据库错误
    async fn insert_if_absent(
        &self,
        url: &str,
        source: &str,
        priority: i64,
        metadata: Option<&serde_json::Value>,
    ) -> Result<EnqueueOutcome, RepositoryError> {
        let metadata_text = metadata.map(|value| value.to_string());
        let now: DateTime<Utc> = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO work_queue (url, source, priority, metadata, added_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(url)
        .bind(source)
        .bind(priority)
        .bind(metadata_text)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            Ok(EnqueueOutcome::Inserted)
        } else {
            Ok(EnqueueOutcome::AlreadyPresent)
        }
    }

    /// 原子领取一批待处理任务
    ///
    /// 选取与占用在一条UPDATE内完成：子查询挑出未处理且未占用
    /// 的前N个任务，同一行只可能被一个并发调用者置位。
    /// RETURNING不保证行序，排序在取回后补做。
    ///
    /// # 参数
    ///
    /// * `limit` - 单批最大任务数
    ///
    /// # 返回值
    ///
    /// * `Ok(Vec<QueueTask>)` - 领取到的任务
    /// * `Err(RepositoryError)` - 数据库错误
    async fn claim_batch(&self, limit: u32) -> Result<Vec<QueueTask>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            UPDATE work_queue SET claimed = 1
            WHERE id IN (
                SELECT id FROM work_queue
                WHERE processed = 0 AND claimed = 0
                ORDER BY priority DESC, added_at ASC, id ASC
                LIMIT ?
            )
            RETURNING id, url, source, priority, metadata, processed, error, added_at, processed_at
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut tasks = rows
            .iter()
            .map(row_to_task)
            .collect::<Result<Vec<_>, _>>()?;
        tasks.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.added_at.cmp(&b.added_at))
                .then(a.id.cmp(&b.id))
        });
        Ok(tasks)
    }

    /// 标记任务处理完成
    ///
    /// 首次调用写入终态；对已处理任务的重复标记是空操作，
    /// 不覆盖已记录的error和processed_at。
    ///
    /// # 参数
    ///
    /// * `id` - 任务ID
    /// * `error` - 失败原因；None表示成功
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 成功或重复标记
    /// * `Err(RepositoryError::NotFound)` - 任务不存在
    async fn mark_processed(&self, id: i64, error: Option<&str>) -> Result<(), RepositoryError> {
        let now: DateTime<Utc> = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE work_queue
            SET processed = 1, claimed = 0, error = ?, processed_at = ?
            WHERE id = ? AND processed = 0
            "#,
        )
        .bind(error)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Zero rows is either a repeated mark on a settled task or a bad id
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM work_queue WHERE id = ?)")
                    .bind(id)
                    .fetch_one(&self.pool)
                    .await?;
            if !exists {
                return Err(RepositoryError::NotFound);
            }
        }
        Ok(())
    }

    /// 将已领取但未完成的任务放回pending
    async fn release(&self, id: i64) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE work_queue SET claimed = 0 WHERE id = ? AND processed = 0")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// 清除遗留的占用标记
    ///
    /// 进程崩溃会留下claimed=1但未处理的任务；启动时调用一次
    /// 把它们放回pending。
    async fn reset_claims(&self) -> Result<u64, RepositoryError> {
        let result =
            sqlx::query("UPDATE work_queue SET claimed = 0 WHERE claimed = 1 AND processed = 0")
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    async fn pending_count(&self) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM work_queue WHERE processed = 0")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn processed_count(&self) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM work_queue WHERE processed = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}
