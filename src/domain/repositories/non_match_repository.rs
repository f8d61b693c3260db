// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::task_repository::RepositoryError;
use async_trait::async_trait;

/// 非包仓库记录特质
///
/// 记住已检查且确认不是包的URL，后续抓取轮次不再重新拉取。
/// 每个确认的负分类只创建一次，之后不更新。
#[async_trait]
pub trait NonMatchRepository: Send + Sync {
    /// 记录一个确认的非包URL及原因；已存在时不做任何修改
    async fn insert(&self, url: &str, reason: &str) -> Result<(), RepositoryError>;

    /// 检查URL是否已知为非包
    async fn contains(&self, url: &str) -> Result<bool, RepositoryError>;
}
