// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

/// 重试策略配置
///
/// 第 `attempt` 次失败后的等待时间默认线性增长（`backoff_unit × attempt`），
/// 可切换为指数增长，始终不超过 `max_backoff`。
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// 每个URL、每种抓取方式的最大尝试次数
    pub max_attempts: u32,
    /// 退避单位
    pub backoff_unit: Duration,
    /// 最大退避时间
    pub max_backoff: Duration,
    /// 是否启用指数退避
    pub exponential: bool,
    /// 是否启用抖动
    pub jitter: bool,
    /// 抖动因子 (0.0-1.0)
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff_unit: Duration::from_secs(1),
            max_backoff: Duration::from_secs(10),
            exponential: false,
            jitter: false,
            jitter_factor: 0.1,
        }
    }
}

impl RetryPolicy {
    /// 只尝试一次，不重试
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// 第 `attempt` 次（从1开始）尝试失败后应等待的时间
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let attempt = attempt.max(1);
        let unit = self.backoff_unit.as_secs_f64();
        let backoff_secs = if self.exponential {
            unit * 2f64.powi(attempt as i32 - 1)
        } else {
            unit * attempt as f64
        };

        let capped = backoff_secs.min(self.max_backoff.as_secs_f64());

        let final_backoff = if self.jitter && capped > 0.0 {
            let jitter_range = capped * self.jitter_factor;
            if jitter_range > 0.0 {
                (capped + rand::random_range(-jitter_range..jitter_range)).max(0.0)
            } else {
                capped
            }
        } else {
            capped
        };

        Duration::from_secs_f64(final_backoff)
    }

    /// 已经尝试了 `attempt` 次后是否还能再试
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}
