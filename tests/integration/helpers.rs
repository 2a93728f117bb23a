// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use ratewatch::config::settings::Settings;
use ratewatch::engines::traits::{EngineError, ScrapeRequest, ScrapeResponse, ScraperEngine};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::NamedTempFile;

pub const RATE_PAGE: &str = r#"
<html><body>
    <nav><table><tr><td>Home</td><td>Loans</td><td>Cards</td></tr></table></nav>
    <h2>Fixed Deposit Interest Rates</h2>
    <div class="fd-rates">
        <table>
            <tr><th>Tenure</th><th>General Public (%)</th><th>Senior Citizens (%)</th></tr>
            <tr><td>7 days to 45 days</td><td>3.00%</td><td>3.50%</td></tr>
            <tr><td>46 days to 179 days</td><td>4.50%</td><td>5.00%</td></tr>
            <tr><td>1 year</td><td>6.80%</td><td>7.30%</td></tr>
            <tr><td>5 years to 10 years</td><td>6.50%</td><td>7.50%</td></tr>
        </table>
    </div>
</body></html>
"#;

pub const PLACEHOLDER_PAGE: &str = r#"
<html><body>
    <h1>Interest Rates</h1>
    <p>Rates are loaded dynamically. Please enable JavaScript to continue.</p>
</body></html>
"#;

/// 记录调用次数、始终无法启动浏览器的渲染引擎
#[derive(Default)]
pub struct NoBrowserEngine {
    pub calls: AtomicUsize,
}

#[async_trait]
impl ScraperEngine for NoBrowserEngine {
    async fn scrape(&self, _request: &ScrapeRequest) -> Result<ScrapeResponse, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(EngineError::BrowserLaunch("no browser in test environment".to_string()))
    }

    fn name(&self) -> &'static str {
        "no_browser"
    }
}

/// 模拟浏览器渲染结果，总是返回固定页面
pub struct RenderedPageEngine {
    pub html: &'static str,
    pub calls: AtomicUsize,
}

impl RenderedPageEngine {
    pub fn new(html: &'static str) -> Self {
        Self {
            html,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ScraperEngine for RenderedPageEngine {
    async fn scrape(&self, _request: &ScrapeRequest) -> Result<ScrapeResponse, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ScrapeResponse {
            status_code: 200,
            content: self.html.to_string(),
            response_time_ms: 1,
        })
    }

    fn name(&self) -> &'static str {
        "rendered_fixture"
    }
}

/// 把YAML写入临时文件并加载配置
pub fn settings_from_yaml(yaml: &str) -> (Settings, NamedTempFile) {
    let mut file = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .expect("Failed to create temp config");
    file.write_all(yaml.as_bytes())
        .expect("Failed to write temp config");
    let settings = Settings::from_file(file.path()).expect("Failed to load temp config");
    (settings, file)
}
