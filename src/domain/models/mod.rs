// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 利率报价（rate_quote）：归一化后的定期存款利率记录及期限区间
/// - 数据源配置（source_profile）：单个银行的候选页面与抓取策略
/// - 抓取页面（retrieved_page）：一次成功抓取得到的原始HTML
/// - 报价集合（quote_set）：按自然键去重的报价容器
/// - 运行报告（run_report）：每个数据源的结果与合并后的报价集合
pub mod rate_quote;
pub mod retrieved_page;
pub mod quote_set;
pub mod run_report;
pub mod source_profile;
