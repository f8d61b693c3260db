// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use modscout::config::settings::{DatabaseSettings, HttpSettings, ThrottleSettings};
use modscout::hosting::http::ProviderHttp;
use modscout::hosting::throttle::ProviderThrottle;
use modscout::infrastructure::database::connection;
use modscout::infrastructure::repositories::task_repo_impl::TaskRepositoryImpl;
use sqlx::SqlitePool;
use std::sync::Arc;
use tempfile::TempDir;

/// 基于临时文件SQLite的测试夹具
///
/// TempDir在夹具存活期间持有数据库文件，drop时一并清理
pub struct TestDb {
    pub pool: SqlitePool,
    pub task_repo: Arc<TaskRepositoryImpl>,
    _dir: TempDir,
}

pub async fn create_test_db() -> TestDb {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir
        .path()
        .join("modscout-test.db")
        .to_string_lossy()
        .into_owned();
    let settings = DatabaseSettings {
        path,
        max_connections: Some(5),
        busy_timeout: Some(5),
    };
    let pool = connection::create_pool(&settings).await.expect("pool");
    connection::init_schema(&pool).await.expect("schema");
    let task_repo = Arc::new(TaskRepositoryImpl::new(pool.clone()));
    TestDb {
        pool,
        task_repo,
        _dir: dir,
    }
}

/// 无延迟限速门之上的HTTP客户端，用于wiremock端到端测试
pub fn create_test_http() -> Arc<ProviderHttp> {
    let throttle = Arc::new(ProviderThrottle::new(&ThrottleSettings {
        github_delay_ms: 0,
        gitlab_delay_ms: 0,
        gitea_delay_ms: 0,
    }));
    Arc::new(
        ProviderHttp::new(
            &HttpSettings {
                timeout_secs: 5,
                user_agent: "modscout-test".to_string(),
            },
            throttle,
        )
        .expect("http client"),
    )
}
