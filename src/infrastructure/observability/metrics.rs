// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::run_report::SourceOutcome;
use crate::domain::models::source_profile::RetrievalMethod;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{info, warn};

pub const FETCH_ATTEMPTS: &str = "ratewatch_fetch_attempts_total";
pub const SOURCE_OUTCOMES: &str = "ratewatch_source_outcomes_total";
pub const QUOTES_EXTRACTED: &str = "ratewatch_quotes_extracted_total";
pub const SOURCE_DURATION: &str = "ratewatch_source_duration_seconds";

/// 注册指标描述
///
/// 没有安装记录器时指标宏不产生任何效果。
pub fn describe_metrics() {
    describe_counter!(FETCH_ATTEMPTS, "Fetch attempts by retrieval method and result");
    describe_counter!(SOURCE_OUTCOMES, "Source pipeline outcomes by status");
    describe_counter!(QUOTES_EXTRACTED, "Rate quotes extracted before merging");
    describe_histogram!(SOURCE_DURATION, "Duration of a single source pipeline in seconds");
}

/// 安装Prometheus记录器并在指定地址上提供抓取端点
pub fn install_prometheus(addr: SocketAddr) {
    // Ignore error if address is already in use (for development/testing)
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!("Failed to install Prometheus recorder: {}", e);
        return;
    }
    describe_metrics();
    info!("Metrics exporter listening on {}", addr);
}

pub fn record_fetch_attempt(method: RetrievalMethod, success: bool) {
    let result = if success { "success" } else { "failure" };
    counter!(FETCH_ATTEMPTS, "method" => method.as_str(), "result" => result).increment(1);
}

pub fn record_source_outcome(outcome: &SourceOutcome, elapsed: Duration) {
    let status = if outcome.is_success() { "success" } else { "failed" };
    counter!(SOURCE_OUTCOMES, "status" => status).increment(1);
    histogram!(SOURCE_DURATION).record(elapsed.as_secs_f64());
}

pub fn record_quotes_extracted(count: usize) {
    counter!(QUOTES_EXTRACTED).increment(count as u64);
}
