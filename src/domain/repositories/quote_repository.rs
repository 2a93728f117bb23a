// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::rate_quote::RateQuote;
use async_trait::async_trait;
use thiserror::Error;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 报价缺少自然键字段
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

/// 报价仓库特质
///
/// 以 `(bank, tenure_description)` 为自然键做插入或更新。
#[async_trait]
pub trait QuoteRepository: Send + Sync {
    /// 批量插入或更新，返回新插入的条数
    async fn upsert_many(&self, quotes: &[RateQuote]) -> Result<usize, RepositoryError>;
    /// 获取全部报价
    async fn all(&self) -> Result<Vec<RateQuote>, RepositoryError>;
}
