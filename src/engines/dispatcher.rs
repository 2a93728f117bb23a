// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::retrieved_page::RetrievedPage;
use crate::domain::models::source_profile::{RetrievalMethod, SourceProfile};
use crate::engines::traits::{EngineError, ScrapeRequest, ScraperEngine};
use crate::infrastructure::observability::metrics;
use crate::utils::progress::{AttemptState, PipelineEvent, PipelineObserver};
use crate::utils::retry_policy::RetryPolicy;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// 低于该字节数的页面视为无效
pub const DEFAULT_MIN_BODY_BYTES: usize = 100;

/// 引擎自身超时之外额外留给单次尝试的时间
const HARD_TIMEOUT_GRACE: Duration = Duration::from_secs(15);

/// 获取错误类型
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// 数据源没有配置任何URL
    #[error("No candidate URLs configured")]
    NoCandidates,
    /// 所有URL和抓取方式都已尝试
    #[error("All {attempts} attempts failed, last error: {last}")]
    Exhausted { attempts: u32, last: String },
    /// 抓到了页面，但没有一个页面包含可用数据
    #[error("{pages} page(s) retrieved but none contained usable data")]
    NoData { pages: usize },
}

/// 调用方对单个页面的评估结果
#[derive(Debug, Clone, PartialEq)]
pub enum PageVerdict<T> {
    /// 结果已足够，停止抓取
    Sufficient(T),
    /// 有结果但不够，保留并继续尝试后续方式和URL
    Partial { value: T, records: usize },
    /// 页面没有可用数据
    Empty,
}

/// 获取调度器
///
/// 按配置顺序依次尝试每个候选URL，对每个URL按数据源的策略依次使用
/// 静态或渲染抓取，每种方式在重试策略范围内重试。每个抓到的页面立即交给
/// 调用方评估：结果足够则返回，不够或为空则转入下一种方式或下一个URL，
/// 最终返回记录数最多的部分结果。
/// 不可重试的错误直接转入下一种方式或下一个URL。
pub struct RetrievalDispatcher {
    static_engine: Arc<dyn ScraperEngine>,
    rendered_engine: Arc<dyn ScraperEngine>,
    retry: RetryPolicy,
    static_timeout: Duration,
    rendered_timeout: Duration,
    min_body_bytes: usize,
}

impl RetrievalDispatcher {
    pub fn new(
        static_engine: Arc<dyn ScraperEngine>,
        rendered_engine: Arc<dyn ScraperEngine>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            static_engine,
            rendered_engine,
            retry,
            static_timeout: Duration::from_secs(20),
            rendered_timeout: Duration::from_secs(30),
            min_body_bytes: DEFAULT_MIN_BODY_BYTES,
        }
    }

    /// 设置两种抓取方式的默认单次超时，数据源配置可以覆盖
    pub fn with_timeouts(mut self, static_timeout: Duration, rendered_timeout: Duration) -> Self {
        self.static_timeout = static_timeout;
        self.rendered_timeout = rendered_timeout;
        self
    }

    pub fn with_min_body_bytes(mut self, min_body_bytes: usize) -> Self {
        self.min_body_bytes = min_body_bytes;
        self
    }

    fn engine(&self, method: RetrievalMethod) -> &Arc<dyn ScraperEngine> {
        match method {
            RetrievalMethod::Static => &self.static_engine,
            RetrievalMethod::Rendered => &self.rendered_engine,
        }
    }

    fn request_for(&self, profile: &SourceProfile, url: &str, method: RetrievalMethod) -> ScrapeRequest {
        match method {
            RetrievalMethod::Static => ScrapeRequest::new(url, profile.attempt_timeout(self.static_timeout)),
            RetrievalMethod::Rendered => {
                ScrapeRequest::new(url, profile.attempt_timeout(self.rendered_timeout))
                    .with_wait_for(profile.wait_for.as_str())
            }
        }
    }

    /// 为数据源获取页面并逐页评估
    ///
    /// `evaluate` 在每次成功抓取后同步调用，页面在评估后即被丢弃。
    pub async fn retrieve_with<T, F>(
        &self,
        profile: &SourceProfile,
        observer: &dyn PipelineObserver,
        mut evaluate: F,
    ) -> Result<T, RetrievalError>
    where
        F: FnMut(RetrievedPage) -> PageVerdict<T>,
    {
        if profile.urls.is_empty() {
            return Err(RetrievalError::NoCandidates);
        }

        let mut attempts = 0;
        let mut pages = 0;
        let mut last_error = None;
        let mut best: Option<(T, usize)> = None;

        for url in &profile.urls {
            for &method in profile.strategy.methods() {
                let request = self.request_for(profile, url, method);

                for attempt in 1..=self.retry.max_attempts.max(1) {
                    attempts += 1;
                    observer.on_event(&PipelineEvent::Attempt {
                        bank: profile.bank.clone(),
                        url: url.clone(),
                        method,
                        attempt,
                        state: AttemptState::Fetching,
                    });

                    match self.attempt(&request, method).await {
                        Ok(html) => {
                            metrics::record_fetch_attempt(method, true);
                            observer.on_event(&PipelineEvent::Attempt {
                                bank: profile.bank.clone(),
                                url: url.clone(),
                                method,
                                attempt,
                                state: AttemptState::Succeeded { bytes: html.len() },
                            });
                            pages += 1;

                            match evaluate(RetrievedPage::new(&profile.bank, url, html, method)) {
                                PageVerdict::Sufficient(value) => return Ok(value),
                                PageVerdict::Partial { value, records } => {
                                    debug!(bank = %profile.bank, url = %url, ?method, records, "Partial result, trying next candidate");
                                    if best.as_ref().map_or(true, |(_, kept)| records > *kept) {
                                        best = Some((value, records));
                                    }
                                }
                                PageVerdict::Empty => {
                                    debug!(bank = %profile.bank, url = %url, ?method, "Page had no usable data, trying next candidate");
                                }
                            }
                            break;
                        }
                        Err(e) => {
                            metrics::record_fetch_attempt(method, false);
                            observer.on_event(&PipelineEvent::Attempt {
                                bank: profile.bank.clone(),
                                url: url.clone(),
                                method,
                                attempt,
                                state: AttemptState::Failed {
                                    reason: e.to_string(),
                                },
                            });

                            let retryable = e.is_retryable();
                            last_error = Some(e);
                            if !retryable || !self.retry.should_retry(attempt) {
                                break;
                            }

                            let backoff = self.retry.backoff_for(attempt);
                            debug!(bank = %profile.bank, url = %url, attempt, backoff_ms = backoff.as_millis() as u64, "Backing off");
                            tokio::time::sleep(backoff).await;
                        }
                    }
                }
            }
        }

        if let Some((value, records)) = best {
            debug!(bank = %profile.bank, records, "Using best partial result");
            return Ok(value);
        }
        if pages > 0 {
            warn!(bank = %profile.bank, pages, attempts, "No retrieved page contained usable data");
            return Err(RetrievalError::NoData { pages });
        }

        let last = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no retrieval method configured".to_string());
        warn!(bank = %profile.bank, attempts, last = %last, "All retrieval attempts failed");
        Err(RetrievalError::Exhausted { attempts, last })
    }

    async fn attempt(&self, request: &ScrapeRequest, method: RetrievalMethod) -> Result<String, EngineError> {
        let engine = self.engine(method);
        let response = tokio::time::timeout(
            request.timeout + HARD_TIMEOUT_GRACE,
            engine.scrape(request),
        )
        .await
        .map_err(|_| EngineError::Timeout)??;

        let len = response.content.trim().len();
        if len < self.min_body_bytes {
            return Err(EngineError::BodyTooSmall(len));
        }
        Ok(response.content)
    }
}
