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

use crate::classifier;
use crate::domain::models::host::HostType;
use crate::domain::models::package::PackageType;
use crate::domain::models::task::QueueTask;
use crate::domain::repositories::non_match_repository::NonMatchRepository;
use crate::domain::repositories::record_repository::RecordRepository;
use crate::hosting::http::ProviderHttp;
use crate::hosting::resolver::HostResolver;
use crate::hosting::traits::ClientError;
use crate::queue::work_queue::WorkQueue;
use crate::utils::errors::WorkerError;
use crate::utils::retry_policy::RetryPolicy;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

/// 负分类的标记原因
const NO_MANIFEST_REASON: &str = "no recognized package manifest";

/// 批处理报告
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// 本批领取的任务数
    pub claimed: u64,
    /// 确认为包并落库的任务数
    pub classified: u64,
    /// 确认非包的任务数
    pub unmatched: u64,
    /// 处理失败的任务数
    pub failed: u64,
    /// 因配额耗尽而放回pending的任务数
    pub released: u64,
}

/// 单个任务的处理结局
enum TaskOutcome {
    Classified,
    NonMatch,
    Failed,
    Released,
}

/// 抓取分类工作者
///
/// 从队列领取仓库URL，解析托管服务、探测配置文件并分类，
/// 结果写入results或non_matches。任务之间相互隔离：单个任务
/// 的失败记录在该任务的error列上，不会中断整批。
pub struct CrawlWorker<Q: WorkQueue> {
    queue: Arc<Q>,
    resolver: Arc<HostResolver>,
    http: Arc<ProviderHttp>,
    non_matches: Arc<dyn NonMatchRepository>,
    records: Arc<dyn RecordRepository>,
    retry_policy: RetryPolicy,
    batch_size: u32,
    worker_id: usize,
}

impl<Q: WorkQueue> CrawlWorker<Q> {
    /// 创建新的抓取分类工作者实例
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        queue: Arc<Q>,
        resolver: Arc<HostResolver>,
        http: Arc<ProviderHttp>,
        non_matches: Arc<dyn NonMatchRepository>,
        records: Arc<dyn RecordRepository>,
        retry_policy: RetryPolicy,
        batch_size: u32,
        worker_id: usize,
    ) -> Self {
        Self {
            queue,
            resolver,
            http,
            non_matches,
            records,
            retry_policy,
            batch_size,
            worker_id,
        }
    }

    /// 运行工作者直到队列耗尽、剩余任务全被暂停的服务挡住，
    /// 或收到停机信号
    ///
    /// 停机信号只在批间检查：当前批内已领取的任务会处理完，
    /// 不会丢下claimed状态的任务。
    pub async fn run(&self, shutdown: watch::Receiver<bool>) {
        info!(worker_id = self.worker_id, "Crawl worker started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            let report = match self.process_batch().await {
                Ok(report) => report,
                Err(e) => {
                    error!(worker_id = self.worker_id, error = %e, "Batch processing failed");
                    sleep(Duration::from_secs(1)).await;
                    continue;
                }
            };

            if report.claimed == 0 {
                info!(worker_id = self.worker_id, "Queue drained, worker exiting");
                break;
            }

            // Every claimed task came back released: the provider is
            // paused and the remainder stays pending for the next run
            if report.released == report.claimed {
                info!(
                    worker_id = self.worker_id,
                    released = report.released,
                    "No claimable progress left, worker exiting"
                );
                break;
            }
        }

        info!(worker_id = self.worker_id, "Crawl worker stopped");
    }

    /// 领取并处理一批任务
    pub async fn process_batch(&self) -> Result<BatchReport, WorkerError> {
        let tasks = self.queue.claim_batch(self.batch_size).await?;
        let mut report = BatchReport {
            claimed: tasks.len() as u64,
            ..BatchReport::default()
        };

        for task in tasks {
            match self.process_task(&task).await? {
                TaskOutcome::Classified => report.classified += 1,
                TaskOutcome::NonMatch => report.unmatched += 1,
                TaskOutcome::Failed => report.failed += 1,
                TaskOutcome::Released => report.released += 1,
            }
        }

        if report.claimed > 0 {
            info!(
                worker_id = self.worker_id,
                claimed = report.claimed,
                classified = report.classified,
                unmatched = report.unmatched,
                failed = report.failed,
                released = report.released,
                "Batch finished"
            );
        }
        Ok(report)
    }

    /// 处理单个任务
    ///
    /// 返回的Err只包含队列自身的失败；仓库访问与分类的失败
    /// 都转化为该任务的终态。
    #[instrument(skip(self, task), fields(task_id = task.id, url = %task.url))]
    async fn process_task(&self, task: &QueueTask) -> Result<TaskOutcome, WorkerError> {
        // Known non-matches are settled without any network traffic
        match self.non_matches.contains(&task.url).await {
            Ok(true) => {
                self.queue
                    .mark_processed(task.id, Some(NO_MANIFEST_REASON))
                    .await?;
                return Ok(TaskOutcome::NonMatch);
            }
            Ok(false) => {}
            Err(e) => {
                warn!(error = %e, "Non-match lookup failed, proceeding with fetch");
            }
        }

        let host_type = self.resolver.resolve(&task.url).await;

        // An unresolvable URL is a task failure, not a confirmed non-match
        if host_type == HostType::Unknown {
            self.queue
                .mark_processed(task.id, Some("unrecognized host"))
                .await?;
            return Ok(TaskOutcome::Failed);
        }

        let client = match crate::hosting::client_for(host_type, &task.url, &self.http) {
            Ok(Some(client)) => client,
            Ok(None) => {
                let reason = format!("unsupported host type: {}", host_type);
                self.record_non_match(task, &reason).await?;
                return Ok(TaskOutcome::NonMatch);
            }
            Err(e) => {
                self.queue
                    .mark_processed(task.id, Some(&e.to_string()))
                    .await?;
                return Ok(TaskOutcome::Failed);
            }
        };

        let branch = task
            .metadata
            .as_ref()
            .and_then(|m| m.get("branch"))
            .and_then(|b| b.as_str())
            .map(str::to_string);

        match self.classify_with_retry(client.as_ref(), branch.as_deref()).await {
            Ok((PackageType::Unknown, _)) => {
                self.record_non_match(task, NO_MANIFEST_REASON).await?;
                Ok(TaskOutcome::NonMatch)
            }
            Ok((package_type, metadata)) => {
                info!(package_type = %package_type, name = %metadata.name, "Package classified");
                if let Err(e) = self.records.record(&metadata, &task.source, &task.url).await {
                    self.queue
                        .mark_processed(task.id, Some(&e.to_string()))
                        .await?;
                    return Ok(TaskOutcome::Failed);
                }
                self.queue.mark_processed(task.id, None).await?;
                Ok(TaskOutcome::Classified)
            }
            Err(ClientError::RateLimited) => {
                // Leave the task pending for the next run
                self.queue.release(task.id).await?;
                Ok(TaskOutcome::Released)
            }
            Err(e) => {
                warn!(error = %e, "Task failed after retries");
                self.queue
                    .mark_processed(task.id, Some(&e.to_string()))
                    .await?;
                Ok(TaskOutcome::Failed)
            }
        }
    }

    /// 对瞬时传输错误做有界退避重试
    async fn classify_with_retry(
        &self,
        client: &dyn crate::hosting::traits::RepositoryClient,
        branch: Option<&str>,
    ) -> Result<(PackageType, crate::domain::models::package::PackageMetadata), ClientError> {
        let mut attempt: u32 = 0;
        loop {
            match classifier::classify(client, branch).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    attempt += 1;
                    if !e.is_retryable() || !self.retry_policy.should_retry(attempt) {
                        return Err(e);
                    }
                    let backoff = self.retry_policy.calculate_backoff(attempt);
                    warn!(attempt, backoff_ms = backoff.as_millis() as u64, error = %e, "Transient fetch error, retrying");
                    sleep(backoff).await;
                }
            }
        }
    }

    /// 记录确认的负分类并终结任务
    async fn record_non_match(
        &self,
        task: &QueueTask,
        reason: &str,
    ) -> Result<(), WorkerError> {
        if let Err(e) = self.non_matches.insert(&task.url, reason).await {
            warn!(error = %e, "Failed to persist non-match record");
        }
        self.queue.mark_processed(task.id, Some(reason)).await?;
        Ok(())
    }
}
