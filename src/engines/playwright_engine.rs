// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::{EngineError, ScrapeRequest, ScrapeResponse, ScraperEngine};
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep, sleep_until, timeout, timeout_at, Instant};
use tracing::{debug, info, warn};

/// 读取渲染后DOM的时间上限
const CONTENT_CAPTURE_TIMEOUT: Duration = Duration::from_secs(10);

/// 浏览器会话配置
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// 远程调试地址，设置时连接已有浏览器而不是启动新进程
    pub remote_debugging_url: Option<String>,
    /// Chrome可执行文件路径
    pub executable: Option<PathBuf>,
    /// 选择器出现后、读取DOM前的等待时间
    pub settle_delay: Duration,
    /// 选择器轮询间隔
    pub selector_poll: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            remote_debugging_url: None,
            executable: None,
            settle_delay: Duration::from_millis(1000),
            selector_poll: Duration::from_millis(250),
        }
    }
}

/// 一次尝试独占的浏览器会话
struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    /// 由本次尝试启动的进程需要在结束时关闭
    launched: bool,
}

impl BrowserSession {
    async fn open(options: &BrowserOptions) -> Result<Self, EngineError> {
        let (browser, mut handler, launched) = match &options.remote_debugging_url {
            Some(url) => {
                info!("Connecting to remote Chrome instance at: {}", url);
                let (browser, handler) = Browser::connect(url).await.map_err(|e| {
                    EngineError::BrowserLaunch(format!("Failed to connect to remote Chrome: {}", e))
                })?;
                (browser, handler, false)
            }
            None => {
                let mut builder = BrowserConfig::builder()
                    .no_sandbox()
                    .arg("--disable-gpu")
                    .arg("--disable-dev-shm-usage");
                if let Some(path) = &options.executable {
                    builder = builder.chrome_executable(path);
                }
                let config = builder.build().map_err(EngineError::BrowserLaunch)?;
                let (browser, handler) = Browser::launch(config)
                    .await
                    .map_err(|e| EngineError::BrowserLaunch(e.to_string()))?;
                (browser, handler, true)
            }
        };

        // Spawn a handler to process browser events
        let handler = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            browser,
            handler,
            launched,
        })
    }

    async fn close(mut self) {
        if self.launched {
            if let Err(e) = self.browser.close().await {
                debug!(error = %e, "Browser close failed");
            }
            if let Err(e) = self.browser.wait().await {
                debug!(error = %e, "Browser process wait failed");
            }
        }
        self.handler.abort();
    }
}

/// 渲染抓取引擎
///
/// 基于chromiumoxide的无头浏览器抓取。每次尝试使用独立会话，
/// 无论成功、失败还是超时都会关闭页面和会话。
#[derive(Debug, Clone, Default)]
pub struct PlaywrightEngine {
    options: BrowserOptions,
}

impl PlaywrightEngine {
    pub fn new(options: BrowserOptions) -> Self {
        Self { options }
    }

    async fn render(
        &self,
        browser: &Browser,
        request: &ScrapeRequest,
        deadline: Instant,
    ) -> Result<String, EngineError> {
        let page = timeout_at(deadline, browser.new_page("about:blank"))
            .await
            .map_err(|_| EngineError::Timeout)?
            .map_err(|e| EngineError::Browser(e.to_string()))?;

        let result = self.load(&page, request, deadline).await;

        if let Err(e) = page.close().await {
            debug!(error = %e, "Page close failed");
        }
        result
    }

    async fn load(
        &self,
        page: &Page,
        request: &ScrapeRequest,
        deadline: Instant,
    ) -> Result<String, EngineError> {
        // goto waits for the load event
        timeout_at(deadline, page.goto(&request.url))
            .await
            .map_err(|_| EngineError::Timeout)?
            .map_err(|e| EngineError::Browser(e.to_string()))?;

        if let Some(selector) = request.wait_for.as_deref() {
            if !self.wait_for_selector(page, selector, deadline).await {
                // The caller decides from the body size whether the page is usable.
                warn!(url = %request.url, selector, "Selector did not appear before the deadline");
            }
        }

        if !self.options.settle_delay.is_zero() {
            sleep(self.options.settle_delay).await;
        }

        timeout(CONTENT_CAPTURE_TIMEOUT, page.content())
            .await
            .map_err(|_| EngineError::Timeout)?
            .map_err(|e| EngineError::Browser(e.to_string()))
    }

    /// 轮询直到选择器出现或到达截止时间
    async fn wait_for_selector(&self, page: &Page, selector: &str, deadline: Instant) -> bool {
        loop {
            if let Ok(Ok(_)) = timeout_at(deadline, page.find_element(selector)).await {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            sleep_until((now + self.options.selector_poll).min(deadline)).await;
        }
    }
}

#[async_trait]
impl ScraperEngine for PlaywrightEngine {
    async fn scrape(&self, request: &ScrapeRequest) -> Result<ScrapeResponse, EngineError> {
        let start = Instant::now();
        let deadline = start + request.timeout;

        let session = timeout_at(deadline, BrowserSession::open(&self.options))
            .await
            .map_err(|_| EngineError::Timeout)??;

        let result = self.render(&session.browser, request, deadline).await;
        session.close().await;

        let content = result?;
        let response_time_ms = start.elapsed().as_millis() as u64;
        debug!(url = %request.url, bytes = content.len(), response_time_ms, "Rendered fetch complete");

        Ok(ScrapeResponse {
            // goto does not surface the document response
            status_code: 200,
            content,
            response_time_ms,
        })
    }

    fn name(&self) -> &'static str {
        "playwright"
    }
}
