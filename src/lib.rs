// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 分类器模块
///
/// 按约定配置文件判定仓库的包类型并解析元数据
pub mod classifier;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含核心业务实体和仓库接口
pub mod domain;

/// 托管服务模块
///
/// 主机类型解析与各托管服务的仓库访问适配器
pub mod hosting;

/// 基础设施模块
///
/// 提供外部服务集成，如数据库和仓库实现
pub mod infrastructure;

/// 队列模块
///
/// 实现持久化工作队列与种子导入
pub mod queue;

/// 工具模块
///
/// 提供通用工具函数和辅助类型
pub mod utils;

/// 工作者模块
///
/// 抓取分类工作者及其生命周期管理
pub mod workers;
