// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::rate_quote::RateQuote;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 数据源失败原因
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    /// 页面抓取成功但没有找到可用的利率数据
    NoDataFound,
    /// 所有候选URL和抓取方式都失败
    Retrieval(String),
    /// 超出单个数据源的时间预算（秒）
    TimedOut(u64),
    /// 数据源任务内部异常
    Panicked(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::NoDataFound => write!(f, "no data found"),
            FailureReason::Retrieval(msg) => write!(f, "retrieval failed: {}", msg),
            FailureReason::TimedOut(secs) => write!(f, "timed out after {}s", secs),
            FailureReason::Panicked(msg) => write!(f, "internal fault: {}", msg),
        }
    }
}

/// 单个数据源的运行结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceOutcome {
    Success { records: usize },
    Failed { reason: FailureReason },
}

impl SourceOutcome {
    pub fn failed(reason: FailureReason) -> Self {
        SourceOutcome::Failed { reason }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SourceOutcome::Success { .. })
    }
}

impl fmt::Display for SourceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceOutcome::Success { records } => write!(f, "success ({} records)", records),
            SourceOutcome::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}

/// 一次批处理运行的报告
///
/// 包含合并去重后的报价以及 `{数据源 → 结果}` 映射，
/// 可直接记录日志或交给状态接口展示。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub quotes: Vec<RateQuote>,
    pub outcomes: BTreeMap<String, SourceOutcome>,
    pub total_records: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    /// 成功的数据源
    pub fn succeeded(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|(_, o)| o.is_success())
            .map(|(bank, _)| bank.as_str())
            .collect()
    }

    /// 失败的数据源
    pub fn failed(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|(_, o)| !o.is_success())
            .map(|(bank, _)| bank.as_str())
            .collect()
    }

    /// 交给导出协作方的“干净”子集
    pub fn clean_quotes(&self) -> impl Iterator<Item = &RateQuote> {
        self.quotes.iter().filter(|q| q.is_clean())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_display() {
        assert_eq!(
            SourceOutcome::Success { records: 12 }.to_string(),
            "success (12 records)"
        );
        assert_eq!(
            SourceOutcome::failed(FailureReason::TimedOut(30)).to_string(),
            "failed: timed out after 30s"
        );
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(SourceOutcome::failed(FailureReason::NoDataFound)).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"]["kind"], "no_data_found");
    }

    #[test]
    fn test_report_partitions_sources() {
        let mut outcomes = BTreeMap::new();
        outcomes.insert("SBI".to_string(), SourceOutcome::Success { records: 3 });
        outcomes.insert(
            "Axis Bank".to_string(),
            SourceOutcome::failed(FailureReason::NoDataFound),
        );
        let now = Utc::now();
        let report = RunReport {
            quotes: vec![],
            outcomes,
            total_records: 0,
            started_at: now,
            finished_at: now,
        };
        assert_eq!(report.succeeded(), vec!["SBI"]);
        assert_eq!(report.failed(), vec!["Axis Bank"]);
    }
}
