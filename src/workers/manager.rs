// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::non_match_repository::NonMatchRepository;
use crate::domain::repositories::record_repository::RecordRepository;
use crate::hosting::http::ProviderHttp;
use crate::hosting::resolver::HostResolver;
use crate::queue::work_queue::WorkQueue;
use crate::utils::retry_policy::RetryPolicy;
use crate::workers::crawl_worker::CrawlWorker;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// 工作者管理器
///
/// 启动固定数量的抓取工作者并协调优雅停机：停机信号通过
/// 调用方持有的watch通道广播，各工作者在批边界退出，
/// 已领取的任务不丢弃。
pub struct WorkerManager {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerManager {
    /// 启动工作者池
    ///
    /// # 参数
    ///
    /// * `workers` - 并发工作者数量
    /// * `batch_size` - 每个工作者的单批任务数
    /// * `shutdown_rx` - 停机信号接收端
    #[allow(clippy::too_many_arguments)]
    pub fn start<Q>(
        queue: Arc<Q>,
        resolver: Arc<HostResolver>,
        http: Arc<ProviderHttp>,
        non_matches: Arc<dyn NonMatchRepository>,
        records: Arc<dyn RecordRepository>,
        retry_policy: RetryPolicy,
        workers: usize,
        batch_size: u32,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self
    where
        Q: WorkQueue + 'static,
    {
        let mut handles = Vec::with_capacity(workers);

        for worker_id in 0..workers {
            let worker = CrawlWorker::new(
                queue.clone(),
                resolver.clone(),
                http.clone(),
                non_matches.clone(),
                records.clone(),
                retry_policy.clone(),
                batch_size,
                worker_id,
            );
            let shutdown_rx = shutdown_rx.clone();
            handles.push(tokio::spawn(async move {
                worker.run(shutdown_rx).await;
            }));
        }

        info!(workers, "Worker pool started");
        Self { handles }
    }

    /// 等待所有工作者退出
    pub async fn join(self) {
        for result in futures::future::join_all(self.handles).await {
            if let Err(e) = result {
                warn!(error = %e, "Worker task panicked");
            }
        }
        info!("All workers stopped");
    }
}
