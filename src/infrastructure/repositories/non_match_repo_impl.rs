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

use crate::domain::repositories::non_match_repository::NonMatchRepository;
use crate::domain::repositories::task_repository::RepositoryError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

/// 非包仓库记录实现
///
/// non_matches表的sqlx访问层；首次记录的原因保留不变
#[derive(Clone)]
pub struct NonMatchRepositoryImpl {
    /// 数据库连接池
    pool: SqlitePool,
}

impl NonMatchRepositoryImpl {
    /// 创建新的非包记录仓库实例
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NonMatchRepository for NonMatchRepositoryImpl {
    async fn insert(&self, url: &str, reason: &str) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO non_matches (url, reason, recorded_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(url)
        .bind(reason)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn contains(&self, url: &str) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM non_matches WHERE url = ?)")
                .bind(url)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}
