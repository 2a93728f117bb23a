// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use validator::{Validate, ValidationError};

/// 抓取方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalMethod {
    /// 单次HTTP GET
    Static,
    /// 无头浏览器渲染
    Rendered,
}

impl RetrievalMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetrievalMethod::Static => "static",
            RetrievalMethod::Rendered => "rendered",
        }
    }
}

impl fmt::Display for RetrievalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 每个URL上尝试抓取方式的顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalStrategy {
    /// 纯静态站点，不启动浏览器
    #[default]
    StaticOnly,
    /// 依赖JS渲染的站点
    RenderedOnly,
    StaticThenRendered,
    RenderedThenStatic,
}

impl RetrievalStrategy {
    /// 按顺序返回需要尝试的抓取方式
    pub fn methods(&self) -> &'static [RetrievalMethod] {
        match self {
            RetrievalStrategy::StaticOnly => &[RetrievalMethod::Static],
            RetrievalStrategy::RenderedOnly => &[RetrievalMethod::Rendered],
            RetrievalStrategy::StaticThenRendered => {
                &[RetrievalMethod::Static, RetrievalMethod::Rendered]
            }
            RetrievalStrategy::RenderedThenStatic => {
                &[RetrievalMethod::Rendered, RetrievalMethod::Static]
            }
        }
    }
}

fn default_wait_for() -> String {
    "table".to_string()
}

fn default_min_score() -> u32 {
    2
}

/// 数据源配置
///
/// 描述一家银行的候选页面（按优先级排列）、抓取策略以及
/// 表格评分所用的站点特定关键字。启动时创建，运行期间不可变。
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SourceProfile {
    /// 银行标识
    #[validate(length(min = 1))]
    pub bank: String,
    /// 候选URL，按优先级排列
    #[validate(length(min = 1), custom(function = "validate_urls"))]
    pub urls: Vec<String>,
    /// 抓取策略
    #[serde(default)]
    pub strategy: RetrievalStrategy,
    /// 渲染抓取时等待出现的CSS选择器
    #[serde(default = "default_wait_for")]
    pub wait_for: String,
    /// 单次尝试超时（秒），未设置时使用全局配置
    #[serde(default)]
    pub attempt_timeout_secs: Option<u64>,
    /// 站点特定的表格容器CSS类，评分权重最高
    #[serde(default)]
    pub container_classes: Vec<String>,
    /// 额外的领域关键字
    #[serde(default)]
    pub keywords: Vec<String>,
    /// 表格最低相关性分数
    #[serde(default = "default_min_score")]
    pub min_score: u32,
}

impl SourceProfile {
    /// 使用默认提示创建配置
    pub fn new(bank: impl Into<String>, urls: Vec<String>) -> Self {
        Self {
            bank: bank.into(),
            urls,
            strategy: RetrievalStrategy::default(),
            wait_for: default_wait_for(),
            attempt_timeout_secs: None,
            container_classes: Vec::new(),
            keywords: Vec::new(),
            min_score: default_min_score(),
        }
    }

    pub fn with_strategy(mut self, strategy: RetrievalStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_container_classes(mut self, classes: Vec<String>) -> Self {
        self.container_classes = classes;
        self
    }

    /// 单次尝试超时，优先使用配置自身的覆盖值
    pub fn attempt_timeout(&self, fallback: Duration) -> Duration {
        self.attempt_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(fallback)
    }
}

#[allow(clippy::ptr_arg)]
fn validate_urls(urls: &Vec<String>) -> Result<(), ValidationError> {
    for raw in urls {
        let parsed = url::Url::parse(raw).map_err(|_| ValidationError::new("invalid_url"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ValidationError::new("unsupported_scheme"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_methods_order() {
        assert_eq!(
            RetrievalStrategy::RenderedThenStatic.methods(),
            &[RetrievalMethod::Rendered, RetrievalMethod::Static]
        );
        assert_eq!(
            RetrievalStrategy::StaticOnly.methods(),
            &[RetrievalMethod::Static]
        );
    }

    #[test]
    fn test_profile_validation() {
        let ok = SourceProfile::new("SBI", vec!["https://sbi.co.in/rates".to_string()]);
        assert!(ok.validate().is_ok());

        let no_urls = SourceProfile::new("SBI", vec![]);
        assert!(no_urls.validate().is_err());

        let bad_scheme = SourceProfile::new("SBI", vec!["ftp://sbi.co.in".to_string()]);
        assert!(bad_scheme.validate().is_err());
    }

    #[test]
    fn test_profile_deserialize_defaults() {
        let profile: SourceProfile = serde_json::from_value(serde_json::json!({
            "bank": "Canara Bank",
            "urls": ["https://canarabank.com/rates"],
            "strategy": "rendered_then_static"
        }))
        .unwrap();

        assert_eq!(profile.strategy, RetrievalStrategy::RenderedThenStatic);
        assert_eq!(profile.wait_for, "table");
        assert_eq!(profile.min_score, 2);
        assert_eq!(
            profile.attempt_timeout(Duration::from_secs(20)),
            Duration::from_secs(20)
        );
    }
}
