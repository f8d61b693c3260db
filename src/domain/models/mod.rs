// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 包含托管服务类型、包元数据和队列任务等核心实体
pub mod host;
pub mod package;
pub mod task;
