// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::quote_set::QuoteSet;
use crate::domain::models::rate_quote::RateQuote;
use crate::domain::repositories::quote_repository::{QuoteRepository, RepositoryError};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

/// 内存报价仓库
///
/// 按自然键插入或更新，后写入的记录覆盖先前的记录。
#[derive(Debug, Default)]
pub struct InMemoryQuoteRepository {
    quotes: Mutex<QuoteSet>,
}

impl InMemoryQuoteRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuoteRepository for InMemoryQuoteRepository {
    async fn upsert_many(&self, quotes: &[RateQuote]) -> Result<usize, RepositoryError> {
        if let Some(bad) = quotes
            .iter()
            .find(|q| q.bank.trim().is_empty() || q.tenure_description.trim().is_empty())
        {
            return Err(RepositoryError::InvalidRecord(format!(
                "missing natural key for quote from '{}'",
                bad.bank
            )));
        }

        let mut store = self.quotes.lock().await;
        let inserted = store.extend(quotes.iter().cloned());
        debug!(
            received = quotes.len(),
            inserted,
            total = store.len(),
            "Upserted quotes"
        );
        Ok(inserted)
    }

    async fn all(&self) -> Result<Vec<RateQuote>, RepositoryError> {
        Ok(self.quotes.lock().await.iter().cloned().collect())
    }
}
