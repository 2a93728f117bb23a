// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::source_profile::SourceProfile;
use crate::engines::playwright_engine::BrowserOptions;
use crate::engines::reqwest_engine::{
    BrowserHeaders, DEFAULT_ACCEPT, DEFAULT_ACCEPT_LANGUAGE, DEFAULT_USER_AGENT,
};
use crate::utils::retry_policy::RetryPolicy;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use validator::Validate;

/// 应用程序配置设置
///
/// 包含流水线、重试、静态抓取、浏览器、指标和数据源等所有配置项
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Settings {
    /// 流水线配置
    #[validate(nested)]
    pub pipeline: PipelineSettings,
    /// 重试配置
    #[validate(nested)]
    pub retry: RetrySettings,
    /// 静态抓取配置
    pub http: HttpSettings,
    /// 浏览器配置
    pub browser: BrowserSettings,
    /// 指标配置
    #[serde(default)]
    pub metrics: MetricsSettings,
    /// 数据源配置
    #[serde(default)]
    #[validate(nested)]
    pub sources: Vec<SourceProfile>,
}

/// 流水线配置设置
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PipelineSettings {
    /// 同时处理的数据源数量
    #[validate(range(min = 1))]
    pub worker_pool_size: usize,
    /// 单个数据源的总时间预算（秒）
    #[validate(range(min = 1))]
    pub source_timeout_secs: u64,
    /// 页面最小字节数
    pub min_body_bytes: usize,
    /// 提取到这么多条报价后跳过剩余表格
    #[validate(range(min = 1))]
    pub sufficient_records: usize,
}

impl PipelineSettings {
    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_secs)
    }
}

/// 重试配置设置
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RetrySettings {
    /// 每种抓取方式的最大尝试次数
    #[validate(range(min = 1))]
    pub max_attempts: u32,
    /// 退避单位（毫秒）
    pub backoff_unit_ms: u64,
    /// 最大退避时间（毫秒）
    pub max_backoff_ms: u64,
    /// 是否启用指数退避
    pub exponential: bool,
    /// 是否启用抖动
    pub jitter: bool,
}

impl RetrySettings {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            backoff_unit: Duration::from_millis(self.backoff_unit_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            exponential: self.exponential,
            jitter: self.jitter,
            ..RetryPolicy::default()
        }
    }
}

/// 静态抓取配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct HttpSettings {
    /// 单次请求超时（秒）
    pub timeout_secs: u64,
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn headers(&self) -> BrowserHeaders {
        BrowserHeaders {
            user_agent: self.user_agent.clone(),
            accept: self.accept.clone(),
            accept_language: self.accept_language.clone(),
        }
    }
}

/// 浏览器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserSettings {
    /// 远程调试地址
    pub remote_debugging_url: Option<String>,
    /// Chrome可执行文件路径
    pub executable: Option<String>,
    /// 单次渲染抓取超时（秒）
    pub timeout_secs: u64,
    /// 读取DOM前的等待时间（毫秒）
    pub settle_delay_ms: u64,
    /// 选择器轮询间隔（毫秒）
    pub selector_poll_ms: u64,
}

impl BrowserSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn options(&self) -> BrowserOptions {
        BrowserOptions {
            remote_debugging_url: self.remote_debugging_url.clone(),
            executable: self.executable.as_ref().map(PathBuf::from),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            selector_poll: Duration::from_millis(self.selector_poll_ms),
        }
    }
}

/// 指标配置设置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsSettings {
    /// Prometheus抓取端点监听地址，未设置时不导出
    pub prometheus_listen: Option<String>,
}

impl MetricsSettings {
    pub fn listen_addr(&self) -> Result<Option<SocketAddr>, ConfigError> {
        self.prometheus_listen
            .as_deref()
            .map(|addr| {
                addr.parse().map_err(|e| {
                    ConfigError::Message(format!("Invalid metrics.prometheus_listen '{}': {}", addr, e))
                })
            })
            .transpose()
    }
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次叠加内置默认值、`config/default`、`config/{APP_ENVIRONMENT}`
    /// 和 `RATEWATCH__` 前缀的环境变量
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());

        let builder = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("RATEWATCH").separator("__"));

        Self::finish(builder)
    }

    /// 从指定文件加载配置，未提供的字段使用内置默认值
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = Self::defaults()?.add_source(File::from(path.as_ref()).required(true));
        Self::finish(builder)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            // Pipeline
            .set_default("pipeline.worker_pool_size", 5)?
            .set_default("pipeline.source_timeout_secs", 180)?
            .set_default("pipeline.min_body_bytes", 100)?
            .set_default("pipeline.sufficient_records", 3)?
            // Retry
            .set_default("retry.max_attempts", 2)?
            .set_default("retry.backoff_unit_ms", 1000)?
            .set_default("retry.max_backoff_ms", 10000)?
            .set_default("retry.exponential", false)?
            .set_default("retry.jitter", false)?
            // Static fetch
            .set_default("http.timeout_secs", 20)?
            .set_default("http.user_agent", DEFAULT_USER_AGENT)?
            .set_default("http.accept", DEFAULT_ACCEPT)?
            .set_default("http.accept_language", DEFAULT_ACCEPT_LANGUAGE)?
            // Rendered fetch
            .set_default("browser.timeout_secs", 30)?
            .set_default("browser.settle_delay_ms", 1000)?
            .set_default("browser.selector_poll_ms", 250)
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings
            .validate()
            .map_err(|e| ConfigError::Message(format!("Invalid configuration: {}", e)))?;
        settings.metrics.listen_addr()?;
        settings.check_unique_banks()?;
        Ok(settings)
    }

    /// 银行名称是报告与自然键的主键，不允许重复
    fn check_unique_banks(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for source in &self.sources {
            if !seen.insert(source.bank.trim()) {
                return Err(ConfigError::Message(format!(
                    "Invalid configuration: duplicate source bank '{}'",
                    source.bank
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
