// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::Settings;
use crate::domain::models::quote_set::QuoteSet;
use crate::domain::models::rate_quote::RateQuote;
use crate::domain::models::retrieved_page::RetrievedPage;
use crate::domain::models::run_report::{FailureReason, RunReport, SourceOutcome};
use crate::domain::models::source_profile::SourceProfile;
use crate::domain::services::extraction_service::ExtractionService;
use crate::engines::dispatcher::{PageVerdict, RetrievalDispatcher, RetrievalError};
use crate::engines::traits::ScraperEngine;
use crate::infrastructure::observability::metrics;
use crate::utils::progress::{PipelineEvent, PipelineObserver, TracingObserver};
use chrono::{Local, NaiveDate, Utc};
use futures::stream::{self, StreamExt};
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinError;
use tokio::time::Instant;
use tracing::{error, info};

pub const DEFAULT_POOL_SIZE: usize = 5;
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(180);

/// 单个数据源流水线共享的组件
struct SourcePipeline {
    dispatcher: Arc<RetrievalDispatcher>,
    extraction: ExtractionService,
    observer: Arc<dyn PipelineObserver>,
}

impl SourcePipeline {
    /// 获取 → 评分 → 列角色推断 → 行提取
    ///
    /// 每个抓到的页面立即提取；条数不足时继续尝试下一种方式或下一个URL。
    async fn process(&self, profile: &SourceProfile, scraped_date: NaiveDate) -> Result<Vec<RateQuote>, FailureReason> {
        self.observer.on_event(&PipelineEvent::SourceStarted {
            bank: profile.bank.clone(),
        });

        let quotes = self
            .dispatcher
            .retrieve_with(profile, self.observer.as_ref(), |page| {
                self.evaluate(&page, profile, scraped_date)
            })
            .await
            .map_err(|e| match e {
                RetrievalError::NoData { .. } => FailureReason::NoDataFound,
                other => FailureReason::Retrieval(other.to_string()),
            })?;

        metrics::record_quotes_extracted(quotes.len());
        Ok(quotes)
    }

    fn evaluate(
        &self,
        page: &RetrievedPage,
        profile: &SourceProfile,
        scraped_date: NaiveDate,
    ) -> PageVerdict<Vec<RateQuote>> {
        let outcome = self.extraction.extract(page, profile, scraped_date);
        self.observer.on_event(&PipelineEvent::TablesRanked {
            bank: profile.bank.clone(),
            tables: outcome.tables_found,
            candidates: outcome.candidates,
        });

        let records = outcome.quotes.len();
        if records == 0 {
            PageVerdict::Empty
        } else if self.extraction.is_sufficient(records) {
            PageVerdict::Sufficient(outcome.quotes)
        } else {
            PageVerdict::Partial {
                value: outcome.quotes,
                records,
            }
        }
    }
}

/// 数据源编排器
///
/// 以固定大小的并发池对所有数据源运行流水线。每个数据源在独立任务中执行，
/// 超时或异常只影响它自己的结果。任务结束后按完成顺序合并报价，
/// 同一自然键保留最后合并的记录。
pub struct SourceOrchestrator {
    sources: Vec<SourceProfile>,
    dispatcher: Arc<RetrievalDispatcher>,
    extraction: ExtractionService,
    observer: Arc<dyn PipelineObserver>,
    pool_size: usize,
    source_timeout: Duration,
}

impl SourceOrchestrator {
    pub fn new(sources: Vec<SourceProfile>, dispatcher: Arc<RetrievalDispatcher>) -> Self {
        Self {
            sources,
            dispatcher,
            extraction: ExtractionService::default(),
            observer: Arc::new(TracingObserver),
            pool_size: DEFAULT_POOL_SIZE,
            source_timeout: DEFAULT_SOURCE_TIMEOUT,
        }
    }

    /// 按配置组装调度器、提取服务和并发参数
    pub fn from_settings(
        settings: &Settings,
        static_engine: Arc<dyn ScraperEngine>,
        rendered_engine: Arc<dyn ScraperEngine>,
    ) -> Self {
        let dispatcher = RetrievalDispatcher::new(static_engine, rendered_engine, settings.retry.policy())
            .with_timeouts(settings.http.timeout(), settings.browser.timeout())
            .with_min_body_bytes(settings.pipeline.min_body_bytes);

        Self::new(settings.sources.clone(), Arc::new(dispatcher))
            .with_pool_size(settings.pipeline.worker_pool_size)
            .with_source_timeout(settings.pipeline.source_timeout())
            .with_extraction(ExtractionService::new(settings.pipeline.sufficient_records))
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size.max(1);
        self
    }

    pub fn with_source_timeout(mut self, source_timeout: Duration) -> Self {
        self.source_timeout = source_timeout;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_extraction(mut self, extraction: ExtractionService) -> Self {
        self.extraction = extraction;
        self
    }

    /// 运行一次完整批处理
    ///
    /// 总会返回报告；全部数据源失败时报价为空。
    pub async fn run(&self) -> RunReport {
        let started_at = Utc::now();
        let scraped_date = Local::now().date_naive();
        info!(
            sources = self.sources.len(),
            pool_size = self.pool_size,
            "Starting rate collection run"
        );

        let pipeline = Arc::new(SourcePipeline {
            dispatcher: self.dispatcher.clone(),
            extraction: self.extraction.clone(),
            observer: self.observer.clone(),
        });
        let mut merged = QuoteSet::new();
        let mut outcomes = BTreeMap::new();

        let mut completions = stream::iter(self.sources.iter().cloned())
            .map(|profile| self.run_source(&pipeline, profile, scraped_date))
            .buffer_unordered(self.pool_size);

        while let Some((bank, result, elapsed)) = completions.next().await {
            let outcome = match result {
                Ok(quotes) => {
                    let records = quotes.len();
                    merged.extend(quotes);
                    SourceOutcome::Success { records }
                }
                Err(reason) => SourceOutcome::failed(reason),
            };

            metrics::record_source_outcome(&outcome, elapsed);
            self.observer.on_event(&PipelineEvent::SourceFinished {
                bank: bank.clone(),
                outcome: outcome.clone(),
                elapsed,
            });
            outcomes.insert(bank, outcome);
        }

        let quotes = merged.into_vec();
        let report = RunReport {
            total_records: quotes.len(),
            quotes,
            outcomes,
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            total_records = report.total_records,
            succeeded = report.succeeded().len(),
            failed = report.failed().len(),
            "Rate collection run finished"
        );
        report
    }

    /// 在独立任务中运行单个数据源，超时则中止任务
    async fn run_source(
        &self,
        pipeline: &Arc<SourcePipeline>,
        profile: SourceProfile,
        scraped_date: NaiveDate,
    ) -> (String, Result<Vec<RateQuote>, FailureReason>, Duration) {
        let bank = profile.bank.clone();
        let pipeline = pipeline.clone();
        let start = Instant::now();

        let mut handle =
            tokio::spawn(async move { pipeline.process(&profile, scraped_date).await });

        let result = match tokio::time::timeout(self.source_timeout, &mut handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(task_failure(&bank, join_error)),
            Err(_) => {
                handle.abort();
                Err(FailureReason::TimedOut(self.source_timeout.as_secs()))
            }
        };

        (bank, result, start.elapsed())
    }
}

fn task_failure(bank: &str, join_error: JoinError) -> FailureReason {
    if join_error.is_panic() {
        let message = panic_message(join_error.into_panic());
        error!(bank = %bank, "Source task panicked: {}", message);
        FailureReason::Panicked(message)
    } else {
        FailureReason::Panicked("task cancelled".to_string())
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
