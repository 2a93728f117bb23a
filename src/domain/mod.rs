// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：利率报价、数据源配置和运行报告
/// - 仓库接口（repositories）：报价持久化抽象接口
/// - 服务（services）：期限与利率归一化、表格评分和行提取
///
/// 领域层不依赖网络或浏览器，只处理已经抓取到的HTML。
pub mod models;
pub mod repositories;
pub mod services;
