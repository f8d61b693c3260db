// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

/// Worker错误类型
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("仓库错误: {0}")]
    RepositoryError(#[from] crate::domain::repositories::task_repository::RepositoryError),

    #[error("队列错误: {0}")]
    QueueError(#[from] crate::queue::work_queue::QueueError),

    #[error("内部错误: {0}")]
    InternalError(String),
}
