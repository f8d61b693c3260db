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

use crate::domain::models::host::HostType;
use crate::domain::repositories::host_cache_repository::HostCacheRepository;
use crate::domain::repositories::task_repository::RepositoryError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};

/// 主机缓存仓库实现
///
/// git_hosts表的sqlx访问层；host_url是scheme+authority键
#[derive(Clone)]
pub struct HostCacheRepositoryImpl {
    /// 数据库连接池
    pool: SqlitePool,
}

impl HostCacheRepositoryImpl {
    /// 创建新的主机缓存仓库实例
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HostCacheRepository for HostCacheRepositoryImpl {
    /// 记录已探测的主机类型；同一主机重复写入是空操作
    async fn insert(&self, host_url: &str, host_type: HostType) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO git_hosts (host_url, host_type, discovered_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(host_url)
        .bind(host_type.to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, host_url: &str) -> Result<Option<HostType>, RepositoryError> {
        let host_type: Option<String> =
            sqlx::query_scalar("SELECT host_type FROM git_hosts WHERE host_url = ?")
                .bind(host_url)
                .fetch_optional(&self.pool)
                .await?;
        Ok(host_type.map(|s| s.parse().unwrap_or(HostType::Unknown)))
    }

    async fn list(&self) -> Result<Vec<(String, HostType)>, RepositoryError> {
        let rows = sqlx::query("SELECT host_url, host_type FROM git_hosts ORDER BY host_url")
            .fetch_all(&self.pool)
            .await?;
        let mut hosts = Vec::with_capacity(rows.len());
        for row in &rows {
            let host_url: String = row.try_get("host_url")?;
            let host_type: String = row.try_get("host_type")?;
            hosts.push((host_url, host_type.parse().unwrap_or(HostType::Unknown)));
        }
        Ok(hosts)
    }
}
