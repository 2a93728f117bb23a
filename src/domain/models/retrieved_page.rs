// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::source_profile::RetrievalMethod;
use chrono::{DateTime, Utc};

/// 抓取到的页面
///
/// 由产生它的抓取步骤独占，被提取步骤消费一次后丢弃。
#[derive(Debug, Clone)]
pub struct RetrievedPage {
    /// 数据源（银行）标识
    pub bank: String,
    /// 实际命中的URL
    pub url: String,
    /// 原始HTML
    pub html: String,
    /// 使用的抓取方式
    pub method: RetrievalMethod,
    /// 抓取时间
    pub fetched_at: DateTime<Utc>,
}

impl RetrievedPage {
    pub fn new(
        bank: impl Into<String>,
        url: impl Into<String>,
        html: String,
        method: RetrievalMethod,
    ) -> Self {
        Self {
            bank: bank.into(),
            url: url.into(),
            html,
            method,
            fetched_at: Utc::now(),
        }
    }
}
