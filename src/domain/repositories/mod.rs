// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 定义持久化层的数据访问特质，实现位于infrastructure
pub mod host_cache_repository;
pub mod non_match_repository;
pub mod record_repository;
pub mod task_repository;
