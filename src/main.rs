// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use ratewatch::config::settings::Settings;
use ratewatch::domain::models::rate_quote::RateQuote;
use ratewatch::domain::models::run_report::RunReport;
use ratewatch::domain::repositories::quote_repository::QuoteRepository;
use ratewatch::engines::playwright_engine::PlaywrightEngine;
use ratewatch::engines::reqwest_engine::ReqwestEngine;
use ratewatch::engines::traits::ScraperEngine;
use ratewatch::infrastructure::observability::metrics;
use ratewatch::infrastructure::repositories::quote_repo_impl::InMemoryQuoteRepository;
use ratewatch::utils::telemetry;
use ratewatch::workers::source_orchestrator::SourceOrchestrator;
use std::sync::Arc;
use tracing::{info, warn};

/// 主函数
///
/// 加载配置，对所有数据源运行一次批处理，并把JSON报告写到标准输出
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting ratewatch...");

    let clean_only = std::env::args().skip(1).any(|arg| arg == "--clean");

    // 2. Load configuration
    let settings = Settings::new()?;
    info!(sources = settings.sources.len(), "Configuration loaded");

    // Initialize Prometheus Metrics
    if let Some(addr) = settings.metrics.listen_addr()? {
        metrics::install_prometheus(addr);
    }

    // 3. Initialize Engines
    let static_engine: Arc<dyn ScraperEngine> =
        Arc::new(ReqwestEngine::new(settings.http.headers()));
    let rendered_engine: Arc<dyn ScraperEngine> =
        Arc::new(PlaywrightEngine::new(settings.browser.options()));

    // 4. Run one batch
    let orchestrator = SourceOrchestrator::from_settings(&settings, static_engine, rendered_engine);
    let mut report = orchestrator.run().await;

    for (bank, outcome) in &report.outcomes {
        info!(bank = %bank, "{}", outcome);
    }
    if report.succeeded().is_empty() {
        warn!("No source produced any rate quotes");
    }

    // 5. Hand quotes to the repository
    let repository = InMemoryQuoteRepository::new();
    let stored = repository.upsert_many(&report.quotes).await?;
    info!(
        stored,
        total_records = report.total_records,
        "Rate quotes stored"
    );

    if clean_only {
        report = clean_report(report);
    }
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

fn clean_report(report: RunReport) -> RunReport {
    let quotes: Vec<RateQuote> = report.clean_quotes().cloned().collect();
    RunReport {
        total_records: quotes.len(),
        quotes,
        ..report
    }
}
