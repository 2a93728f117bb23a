// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 流水线进度事件
//!
//! 进度通过注入的观察者上报，流水线本身不依赖全局输出。

use crate::domain::models::run_report::SourceOutcome;
use crate::domain::models::source_profile::RetrievalMethod;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// 单次抓取尝试的状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AttemptState {
    Fetching,
    Succeeded { bytes: usize },
    Failed { reason: String },
}

/// 流水线事件
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    SourceStarted {
        bank: String,
    },
    Attempt {
        bank: String,
        url: String,
        method: RetrievalMethod,
        attempt: u32,
        state: AttemptState,
    },
    TablesRanked {
        bank: String,
        tables: usize,
        candidates: usize,
    },
    SourceFinished {
        bank: String,
        outcome: SourceOutcome,
        elapsed: Duration,
    },
}

impl PipelineEvent {
    pub fn bank(&self) -> &str {
        match self {
            PipelineEvent::SourceStarted { bank }
            | PipelineEvent::Attempt { bank, .. }
            | PipelineEvent::TablesRanked { bank, .. }
            | PipelineEvent::SourceFinished { bank, .. } => bank,
        }
    }
}

/// 进度观察者
pub trait PipelineObserver: Send + Sync {
    fn on_event(&self, event: &PipelineEvent);
}

impl<F> PipelineObserver for F
where
    F: Fn(&PipelineEvent) + Send + Sync,
{
    fn on_event(&self, event: &PipelineEvent) {
        self(event)
    }
}

/// 把事件写入 tracing 日志的默认观察者
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_event(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::SourceStarted { bank } => info!(bank = %bank, "Source started"),
            PipelineEvent::Attempt {
                bank,
                url,
                method,
                attempt,
                state,
            } => match state {
                AttemptState::Fetching => {
                    debug!(bank = %bank, url = %url, method = %method, attempt, "Fetching")
                }
                AttemptState::Succeeded { bytes } => {
                    debug!(bank = %bank, url = %url, method = %method, attempt, bytes, "Fetched")
                }
                AttemptState::Failed { reason } => {
                    warn!(bank = %bank, url = %url, method = %method, attempt, reason = %reason, "Fetch failed")
                }
            },
            PipelineEvent::TablesRanked {
                bank,
                tables,
                candidates,
            } => debug!(bank = %bank, tables, candidates, "Tables ranked"),
            PipelineEvent::SourceFinished {
                bank,
                outcome,
                elapsed,
            } => {
                if outcome.is_success() {
                    info!(bank = %bank, elapsed_ms = elapsed.as_millis() as u64, "{}", outcome)
                } else {
                    warn!(bank = %bank, elapsed_ms = elapsed.as_millis() as u64, "{}", outcome)
                }
            }
        }
    }
}

/// 通过无界通道转发事件的观察者
///
/// 接收端被丢弃后事件被静默丢弃。
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    sender: mpsc::UnboundedSender<PipelineEvent>,
}

impl ChannelObserver {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PipelineEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl PipelineObserver for ChannelObserver {
    fn on_event(&self, event: &PipelineEvent) {
        let _ = self.sender.send(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_closure_observer() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let observer = move |event: &PipelineEvent| {
            sink.lock().unwrap().push(event.bank().to_string());
        };

        observer.on_event(&PipelineEvent::SourceStarted {
            bank: "SBI".to_string(),
        });
        assert_eq!(*seen.lock().unwrap(), vec!["SBI".to_string()]);
    }

    #[tokio::test]
    async fn test_channel_observer_forwards_events() {
        let (observer, mut receiver) = ChannelObserver::new();
        observer.on_event(&PipelineEvent::TablesRanked {
            bank: "Axis Bank".to_string(),
            tables: 4,
            candidates: 1,
        });

        let event = receiver.recv().await.unwrap();
        assert_eq!(
            event,
            PipelineEvent::TablesRanked {
                bank: "Axis Bank".to_string(),
                tables: 4,
                candidates: 1,
            }
        );
    }

    #[test]
    fn test_channel_observer_tolerates_dropped_receiver() {
        let (observer, receiver) = ChannelObserver::new();
        drop(receiver);
        observer.on_event(&PipelineEvent::SourceStarted {
            bank: "SBI".to_string(),
        });
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let json = serde_json::to_value(PipelineEvent::Attempt {
            bank: "SBI".to_string(),
            url: "https://sbi.co.in".to_string(),
            method: RetrievalMethod::Rendered,
            attempt: 2,
            state: AttemptState::Failed {
                reason: "Timeout".to_string(),
            },
        })
        .unwrap();
        assert_eq!(json["event"], "attempt");
        assert_eq!(json["method"], "rendered");
        assert_eq!(json["state"]["state"], "failed");
    }
}
