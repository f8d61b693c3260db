// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库实现模块
pub mod host_cache_repo_impl;
pub mod non_match_repo_impl;
pub mod record_repo_impl;
pub mod task_repo_impl;
