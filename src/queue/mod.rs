// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 队列模块
///
/// 持久化工作队列及种子导入
pub mod seeder;
pub mod work_queue;
