// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作者模块
///
/// 抓取分类工作者及其生命周期管理
pub mod crawl_worker;
pub mod manager;
