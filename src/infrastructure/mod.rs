// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施模块
///
/// SQLite连接管理与领域仓库特质的具体实现
pub mod database;
pub mod repositories;
