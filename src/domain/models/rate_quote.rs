// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 默认存款类别
pub const DEFAULT_CATEGORY: &str = "General";

/// 存款期限区间（天）
///
/// 不变量：`min_days >= 1` 且 `max_days >= min_days`。
/// 只能通过 [`TenureRange::new`] 构造，无法满足不变量时视为无法解析。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenureRange {
    min_days: u32,
    max_days: u32,
}

impl TenureRange {
    /// 创建期限区间，不满足不变量时返回 `None`
    pub fn new(min_days: u32, max_days: u32) -> Option<Self> {
        if min_days >= 1 && max_days >= min_days {
            Some(Self { min_days, max_days })
        } else {
            None
        }
    }

    /// 单点期限，例如 "7 days"
    pub fn single(days: u32) -> Option<Self> {
        Self::new(days, days)
    }

    pub fn min_days(&self) -> u32 {
        self.min_days
    }

    pub fn max_days(&self) -> u32 {
        self.max_days
    }
}

/// 定期存款利率报价
///
/// 自然键为 `(bank, tenure_description)`，持久化协作方按此键执行插入或更新。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateQuote {
    /// 银行名称
    pub bank: String,
    /// 页面上的原始期限描述
    pub tenure_description: String,
    /// 最短期限（天）
    pub min_days: Option<u32>,
    /// 最长期限（天）
    pub max_days: Option<u32>,
    /// 普通储户利率（%）
    pub regular_rate: Option<f64>,
    /// 老年储户利率（%）
    pub senior_rate: Option<f64>,
    /// 存款类别
    pub category: String,
    /// 抓取日期
    pub scraped_date: NaiveDate,
}

impl RateQuote {
    /// 由已解析的期限和利率创建报价
    pub fn new(
        bank: impl Into<String>,
        tenure_description: impl Into<String>,
        tenure: TenureRange,
        regular_rate: f64,
        senior_rate: Option<f64>,
        scraped_date: NaiveDate,
    ) -> Self {
        Self {
            bank: bank.into(),
            tenure_description: tenure_description.into(),
            min_days: Some(tenure.min_days()),
            max_days: Some(tenure.max_days()),
            regular_rate: Some(regular_rate),
            senior_rate,
            category: DEFAULT_CATEGORY.to_string(),
            scraped_date,
        }
    }

    /// 设置存款类别
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// 自然键
    pub fn natural_key(&self) -> (&str, &str) {
        (&self.bank, &self.tenure_description)
    }

    /// 导出用的“干净”记录：期限上下限与普通利率都存在
    pub fn is_clean(&self) -> bool {
        self.min_days.is_some() && self.max_days.is_some() && self.regular_rate.is_some()
    }
}
