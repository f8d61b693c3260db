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

use crate::config::settings::DatabaseSettings;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

/// 创建SQLite连接池
///
/// WAL模式允许工作者读取与入队写入并发进行；busy_timeout
/// 让争用写入排队等待而不是立即报SQLITE_BUSY。
///
/// # 参数
///
/// * `settings` - 数据库配置
///
/// # 返回值
///
/// * `Ok(SqlitePool)` - 数据库连接池
/// * `Err(sqlx::Error)` - 连接过程中出现的错误
pub async fn create_pool(settings: &DatabaseSettings) -> Result<SqlitePool, sqlx::Error> {
    let mut options = SqliteConnectOptions::from_str(&format!("sqlite://{}", settings.path))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    if let Some(timeout) = settings.busy_timeout {
        options = options.busy_timeout(Duration::from_secs(timeout));
    }

    SqlitePoolOptions::new()
        .max_connections(settings.max_connections.unwrap_or(5))
        .connect_with(options)
        .await
}

/// 初始化数据库结构
///
/// 所有建表语句幂等，重复启动无副作用。work_queue.url上的
/// 唯一索引是队列去重的依据。
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS work_queue (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            url TEXT NOT NULL UNIQUE,
            source TEXT NOT NULL,
            priority INTEGER NOT NULL DEFAULT 0,
            metadata TEXT,
            claimed INTEGER NOT NULL DEFAULT 0,
            processed INTEGER NOT NULL DEFAULT 0,
            error TEXT,
            added_at TEXT NOT NULL,
            processed_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_work_queue_pending
        ON work_queue (processed, claimed, priority DESC, added_at ASC)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS git_hosts (
            host_url TEXT PRIMARY KEY,
            host_type TEXT NOT NULL,
            discovered_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS non_matches (
            url TEXT PRIMARY KEY,
            reason TEXT NOT NULL,
            recorded_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS results (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            url TEXT NOT NULL UNIQUE,
            source TEXT NOT NULL,
            name TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            author TEXT,
            package_type TEXT NOT NULL,
            min_version TEXT,
            max_version TEXT,
            depends TEXT NOT NULL,
            optional_depends TEXT NOT NULL,
            recorded_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
