// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task::EnqueueOutcome;
use crate::queue::work_queue::{QueueError, WorkQueue};
use crate::utils::url_utils;
use std::path::Path;
use tracing::{info, warn};

/// 种子导入报告
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// 新入队数量
    pub inserted: u64,
    /// 已存在而跳过的数量
    pub already_present: u64,
    /// 不是仓库URL形状而跳过的行数
    pub skipped: u64,
}

/// 从文本文件导入种子URL
///
/// 每行一个URL；空行和`#`开头的行忽略。不合形状的行记录
/// 告警后跳过，不中断整个导入。重复导入同一文件是幂等的。
pub async fn seed_from_file<Q: WorkQueue>(
    queue: &Q,
    path: &Path,
    priority: i64,
) -> Result<SeedReport, QueueError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| QueueError::InvalidTask(format!("cannot read seed file: {}", e)))?;
    let source = format!(
        "seed:{}",
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    );

    let mut report = SeedReport::default();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let url = url_utils::normalize_repo_url(line);
        if !url_utils::looks_like_repo_url(&url) {
            warn!(line, "Seed line does not look like a repository URL, skipping");
            report.skipped += 1;
            continue;
        }
        match queue.enqueue(&url, &source, priority, None).await? {
            EnqueueOutcome::Inserted => report.inserted += 1,
            EnqueueOutcome::AlreadyPresent => report.already_present += 1,
        }
    }

    info!(
        source,
        inserted = report.inserted,
        already_present = report.already_present,
        skipped = report.skipped,
        "Seed file imported"
    );
    Ok(report)
}

#[cfg(test)]
#[path = "seeder_test.rs"]
mod tests;
