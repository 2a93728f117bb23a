// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::{EngineError, ScrapeRequest, ScrapeResponse, ScraperEngine};
use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL,
    UPGRADE_INSECURE_REQUESTS,
};
use std::time::Instant;
use tracing::debug;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const DEFAULT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// 模拟浏览器的请求头
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserHeaders {
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
}

impl Default for BrowserHeaders {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
        }
    }
}

impl BrowserHeaders {
    fn header_map(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(v) = HeaderValue::from_str(&self.accept) {
            headers.insert(ACCEPT, v);
        }
        if let Ok(v) = HeaderValue::from_str(&self.accept_language) {
            headers.insert(ACCEPT_LANGUAGE, v);
        }
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
        headers
    }
}

/// 静态抓取引擎
///
/// 基于reqwest的单次HTTP GET，带浏览器风格的请求头
#[derive(Debug, Clone, Default)]
pub struct ReqwestEngine {
    headers: BrowserHeaders,
}

impl ReqwestEngine {
    pub fn new(headers: BrowserHeaders) -> Self {
        Self { headers }
    }
}

#[async_trait]
impl ScraperEngine for ReqwestEngine {
    /// 执行HTTP抓取
    ///
    /// 非2xx响应视为失败。
    async fn scrape(&self, request: &ScrapeRequest) -> Result<ScrapeResponse, EngineError> {
        let headers = self.headers.header_map();

        // Each request gets a fresh client for cookie isolation
        let client = reqwest::Client::builder()
            .user_agent(self.headers.user_agent.as_str())
            .timeout(request.timeout)
            .cookie_store(true)
            .build()?;

        let start = Instant::now();
        let response = client.get(&request.url).headers(headers).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::HttpStatus(status.as_u16()));
        }

        let content = response.text().await?;
        let response_time_ms = start.elapsed().as_millis() as u64;
        debug!(url = %request.url, bytes = content.len(), response_time_ms, "Static fetch complete");

        Ok(ScrapeResponse {
            status_code: status.as_u16(),
            content,
            response_time_ms,
        })
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
