// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::rate_quote::RateQuote;
use std::collections::HashMap;

/// 按自然键 `(bank, tenure_description)` 去重的报价集合
///
/// 相同自然键的记录只保留最后写入的一条（插入或更新语义），
/// 首次出现的位置保持不变。
#[derive(Debug, Default, Clone)]
pub struct QuoteSet {
    quotes: Vec<RateQuote>,
    index: HashMap<(String, String), usize>,
}

impl QuoteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入或替换一条报价，返回是否为新记录
    pub fn upsert(&mut self, quote: RateQuote) -> bool {
        let key = (quote.bank.clone(), quote.tenure_description.clone());
        match self.index.get(&key) {
            Some(&pos) => {
                self.quotes[pos] = quote;
                false
            }
            None => {
                self.index.insert(key, self.quotes.len());
                self.quotes.push(quote);
                true
            }
        }
    }

    /// 批量合并，返回新增记录数
    pub fn extend<I>(&mut self, quotes: I) -> usize
    where
        I: IntoIterator<Item = RateQuote>,
    {
        let mut added = 0;
        for quote in quotes {
            if self.upsert(quote) {
                added += 1;
            }
        }
        added
    }

    pub fn get(&self, bank: &str, tenure_description: &str) -> Option<&RateQuote> {
        self.index
            .get(&(bank.to_string(), tenure_description.to_string()))
            .map(|&pos| &self.quotes[pos])
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RateQuote> {
        self.quotes.iter()
    }

    pub fn into_vec(self) -> Vec<RateQuote> {
        self.quotes
    }
}
