// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含核心业务实体、归一化与提取服务以及仓库接口
pub mod domain;

/// 引擎模块
///
/// 实现静态与渲染两种页面抓取引擎及其调度
pub mod engines;

/// 基础设施模块
///
/// 提供指标导出和仓库实现
pub mod infrastructure;

/// 工具模块
///
/// 提供重试策略、日志初始化和进度事件
pub mod utils;

/// 工作器模块
///
/// 实现数据源的并发编排
pub mod workers;
