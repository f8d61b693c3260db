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

use crate::domain::models::package::PackageMetadata;
use crate::domain::repositories::record_repository::RecordRepository;
use crate::domain::repositories::task_repository::RepositoryError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

/// 分类结果落库实现
///
/// results表的sqlx访问层。依赖列表序列化为JSON数组文本，
/// 下游消费方自行解码。重抓同一URL时覆盖旧结果。
#[derive(Clone)]
pub struct RecordRepositoryImpl {
    /// 数据库连接池
    pool: SqlitePool,
}

impl RecordRepositoryImpl {
    /// 创建新的结果仓库实例
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordRepository for RecordRepositoryImpl {
    async fn record(
        &self,
        metadata: &PackageMetadata,
        source: &str,
        url: &str,
    ) -> Result<(), RepositoryError> {
        let depends = serde_json::to_string(&metadata.depends)
            .map_err(|e| RepositoryError::InvalidData(format!("depends not serializable: {}", e)))?;
        let optional_depends = serde_json::to_string(&metadata.optional_depends).map_err(|e| {
            RepositoryError::InvalidData(format!("optional_depends not serializable: {}", e))
        })?;

        sqlx::query(
            r#"
            INSERT INTO results (
                url, source, name, title, description, author, package_type,
                min_version, max_version, depends, optional_depends, recorded_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(url) DO UPDATE SET
                source = excluded.source,
                name = excluded.name,
                title = excluded.title,
                description = excluded.description,
                author = excluded.author,
                package_type = excluded.package_type,
                min_version = excluded.min_version,
                max_version = excluded.max_version,
                depends = excluded.depends,
                optional_depends = excluded.optional_depends,
                recorded_at = excluded.recorded_at
            "#,
        )
        .bind(url)
        .bind(source)
        .bind(&metadata.name)
        .bind(&metadata.title)
        .bind(&metadata.description)
        .bind(&metadata.author)
        .bind(metadata.package_type.to_string())
        .bind(&metadata.min_version)
        .bind(&metadata.max_version)
        .bind(depends)
        .bind(optional_depends)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
