// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::rate_quote::RateQuote;
use crate::domain::models::retrieved_page::RetrievedPage;
use crate::domain::models::source_profile::SourceProfile;
use crate::domain::services::column_roles::infer_column_roles;
use crate::domain::services::relevance_scorer::{KeywordProfile, RelevanceScorer};
use crate::domain::services::row_extractor::{extract_rows, RowContext};
use chrono::NaiveDate;
use scraper::Html;
use tracing::debug;

/// 找到这么多条报价后不再处理排名更低的表格
pub const DEFAULT_SUFFICIENT_RECORDS: usize = 3;

/// 一次页面提取的结果
#[derive(Debug, Clone, Default)]
pub struct ExtractionOutcome {
    /// 候选报价，未去重
    pub quotes: Vec<RateQuote>,
    /// 页面中的表格总数
    pub tables_found: usize,
    /// 超过阈值的候选表格数
    pub candidates: usize,
    /// 实际处理过的表格数
    pub tables_used: usize,
}

/// 提取服务
///
/// 负责从页面HTML中定位利率表格并提取报价。整个过程是同步的纯计算，
/// 解析后的文档不会跨越任何 await 点。
#[derive(Debug, Clone)]
pub struct ExtractionService {
    sufficient_records: usize,
}

impl Default for ExtractionService {
    fn default() -> Self {
        Self::new(DEFAULT_SUFFICIENT_RECORDS)
    }
}

impl ExtractionService {
    pub fn new(sufficient_records: usize) -> Self {
        Self { sufficient_records }
    }

    /// 报价条数是否已达到阈值
    pub fn is_sufficient(&self, records: usize) -> bool {
        records >= self.sufficient_records
    }

    /// 从抓取到的页面中提取报价
    pub fn extract(
        &self,
        page: &RetrievedPage,
        profile: &SourceProfile,
        scraped_date: NaiveDate,
    ) -> ExtractionOutcome {
        self.extract_html(&page.html, profile, scraped_date)
    }

    /// 按相关性顺序逐个处理候选表格
    ///
    /// 每处理完一个表格检查累计条数，达到阈值后跳过剩余表格。
    pub fn extract_html(
        &self,
        html: &str,
        profile: &SourceProfile,
        scraped_date: NaiveDate,
    ) -> ExtractionOutcome {
        let document = Html::parse_document(html);
        let scorer = RelevanceScorer::new(KeywordProfile::for_source(profile));
        let ranked = scorer.rank(&document);
        let tables_found = ranked.len();

        let candidates: Vec<_> = ranked
            .into_iter()
            .filter(|c| c.score >= profile.min_score)
            .collect();

        let mut outcome = ExtractionOutcome {
            tables_found,
            candidates: candidates.len(),
            ..Default::default()
        };

        for candidate in &candidates {
            let roles = infer_column_roles(&candidate.grid);
            let ctx = RowContext {
                bank: &profile.bank,
                scraped_date,
                table_context: &candidate.context,
            };
            let rows = extract_rows(&candidate.grid, &roles, &ctx);
            debug!(
                bank = %profile.bank,
                position = candidate.position,
                score = candidate.score,
                records = rows.len(),
                "Extracted table"
            );

            outcome.tables_used += 1;
            outcome.quotes.extend(rows);
            if self.is_sufficient(outcome.quotes.len()) {
                break;
            }
        }

        outcome
    }
}
