// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 队列任务实体
///
/// 表示发现队列中一个待分类的仓库URL。
/// url在队列生命周期内全局唯一，重复入队是空操作而非错误。
/// 状态机：pending → processed，由WorkQueue独占管理。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueTask {
    /// 任务ID（数据库自增主键）
    pub id: i64,
    /// 仓库URL，去重的唯一键
    pub url: String,
    /// 来源标记，例如 "forum:<thread_url>" 或 "contentdb"
    pub source: String,
    /// 优先级，数值越大越先被处理
    pub priority: i64,
    /// 入队方提供的附加元数据
    pub metadata: Option<serde_json::Value>,
    /// 是否已处理完成
    pub processed: bool,
    /// 处理失败原因（成功时为None）
    pub error: Option<String>,
    /// 入队时间
    pub added_at: DateTime<Utc>,
    /// 处理完成时间
    pub processed_at: Option<DateTime<Utc>>,
}

/// 入队结果
///
/// 区分首次插入与重复URL的空操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// 新任务已插入
    Inserted,
    /// URL已存在（pending或processed），未做任何修改
    AlreadyPresent,
}
