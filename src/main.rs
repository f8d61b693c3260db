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

use modscout::config::settings::Settings;
use modscout::domain::repositories::host_cache_repository::HostCacheRepository;
use modscout::domain::repositories::task_repository::TaskRepository;
use modscout::hosting::http::ProviderHttp;
use modscout::hosting::probe_cache::HostProbeCache;
use modscout::hosting::resolver::HostResolver;
use modscout::hosting::throttle::ProviderThrottle;
use modscout::infrastructure::database::connection;
use modscout::infrastructure::repositories::host_cache_repo_impl::HostCacheRepositoryImpl;
use modscout::infrastructure::repositories::non_match_repo_impl::NonMatchRepositoryImpl;
use modscout::infrastructure::repositories::record_repo_impl::RecordRepositoryImpl;
use modscout::infrastructure::repositories::task_repo_impl::TaskRepositoryImpl;
use modscout::queue::seeder;
use modscout::queue::work_queue::SqliteWorkQueue;
use modscout::utils::retry_policy::RetryPolicy;
use modscout::utils::telemetry;
use modscout::workers::manager::WorkerManager;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// 主函数
///
/// 应用程序入口点。支持三个动作：
/// `modscout seed <file>` 导入种子URL，`modscout status` 打印
/// 队列与主机缓存概况，`modscout process`（默认）运行工作者池
/// 直至队列耗尽或收到Ctrl-C。
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting modscout...");

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    // 3. Connect to database and prepare schema
    let pool = connection::create_pool(&settings.database).await?;
    connection::init_schema(&pool).await?;
    info!("Database ready");

    let task_repo = Arc::new(TaskRepositoryImpl::new(pool.clone()));
    let queue = Arc::new(SqliteWorkQueue::new(task_repo.clone()));

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("seed") => {
            let Some(path) = args.get(1) else {
                anyhow::bail!("usage: modscout seed <file>");
            };
            let report = seeder::seed_from_file(queue.as_ref(), Path::new(path), 1).await?;
            println!(
                "seeded: {} inserted, {} already present, {} skipped",
                report.inserted, report.already_present, report.skipped
            );
        }
        Some("status") => {
            let host_cache = HostCacheRepositoryImpl::new(pool.clone());
            println!("pending:   {}", task_repo.pending_count().await?);
            println!("processed: {}", task_repo.processed_count().await?);
            for (host, host_type) in host_cache.list().await? {
                println!("host: {} -> {}", host, host_type);
            }
        }
        Some("process") | None => {
            process(&settings, pool, task_repo, queue).await?;
        }
        Some(other) => {
            anyhow::bail!("unknown action '{}'; expected seed, status or process", other);
        }
    }

    Ok(())
}

/// 运行工作者池直到队列耗尽或收到停机信号
async fn process(
    settings: &Settings,
    pool: sqlx::SqlitePool,
    task_repo: Arc<TaskRepositoryImpl>,
    queue: Arc<SqliteWorkQueue<TaskRepositoryImpl>>,
) -> anyhow::Result<()> {
    // 4. Recover claims left behind by a previous run
    let recovered = task_repo.reset_claims().await?;
    if recovered > 0 {
        info!(recovered, "Released stale claims from previous run");
    }

    // 5. Initialize hosting components
    let throttle = Arc::new(ProviderThrottle::new(&settings.throttle));
    let http = Arc::new(ProviderHttp::new(&settings.http, throttle)?);
    let host_cache = Arc::new(HostProbeCache::new(Arc::new(HostCacheRepositoryImpl::new(
        pool.clone(),
    ))));
    let resolver = Arc::new(HostResolver::new(http.clone(), host_cache));

    let non_matches = Arc::new(NonMatchRepositoryImpl::new(pool.clone()));
    let records = Arc::new(RecordRepositoryImpl::new(pool));

    // 6. Start workers
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let manager = WorkerManager::start(
        queue,
        resolver,
        http,
        non_matches,
        records,
        RetryPolicy::bounded(settings.crawler.max_retries),
        settings.crawler.workers,
        settings.crawler.batch_size,
        shutdown_rx,
    );

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });

    // 7. Wait for workers to drain the queue or stop on signal
    manager.join().await;
    info!("modscout finished");
    Ok(())
}
