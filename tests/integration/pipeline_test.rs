// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 流水线集成测试模块
///
/// 用wiremock模拟银行站点，经由真实的静态抓取引擎跑完整条流水线：
/// 配置加载、候选URL回退、逐页提取、重试、表格提取、合并以及仓库写入

#[cfg(test)]
mod tests {
    use super::super::helpers::{
        settings_from_yaml, NoBrowserEngine, RenderedPageEngine, PLACEHOLDER_PAGE, RATE_PAGE,
    };
    use ratewatch::domain::models::run_report::{FailureReason, SourceOutcome};
    use ratewatch::domain::repositories::quote_repository::QuoteRepository;
    use ratewatch::engines::reqwest_engine::ReqwestEngine;
    use ratewatch::engines::traits::ScraperEngine;
    use ratewatch::infrastructure::repositories::quote_repo_impl::InMemoryQuoteRepository;
    use ratewatch::utils::progress::{AttemptState, ChannelObserver, PipelineEvent};
    use ratewatch::workers::source_orchestrator::SourceOrchestrator;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn bank_site() -> MockServer {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rates/old"))
            .respond_with(ResponseTemplate::new(404))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rates/current"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RATE_PAGE))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/placeholder"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PLACEHOLDER_PAGE))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/tiny"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        server
    }

    fn pipeline_yaml(uri: &str) -> String {
        format!(
            r#"
pipeline:
  worker_pool_size: 2
  source_timeout_secs: 30
retry:
  max_attempts: 2
  backoff_unit_ms: 0
http:
  timeout_secs: 5
sources:
  - bank: "Fallback Bank"
    urls: ["{uri}/rates/old", "{uri}/rates/current"]
  - bank: "Moved Bank"
    urls: ["{uri}/placeholder", "{uri}/rates/current"]
  - bank: "Placeholder Bank"
    urls: ["{uri}/placeholder"]
  - bank: "Tiny Bank"
    urls: ["{uri}/tiny"]
    strategy: static_then_rendered
"#
        )
    }

    #[tokio::test]
    async fn test_pipeline_end_to_end() {
        let server = bank_site().await;
        let (settings, _file) = settings_from_yaml(&pipeline_yaml(&server.uri()));
        assert_eq!(settings.sources.len(), 4);

        let rendered = Arc::new(NoBrowserEngine::default());
        let orchestrator = SourceOrchestrator::from_settings(
            &settings,
            Arc::new(ReqwestEngine::new(settings.http.headers())),
            rendered.clone() as Arc<dyn ScraperEngine>,
        );
        let report = orchestrator.run().await;

        assert_eq!(report.outcomes.len(), 4);
        assert_eq!(
            report.outcomes["Fallback Bank"],
            SourceOutcome::Success { records: 4 }
        );
        // The first URL serves a script shell, the second one the rates.
        assert_eq!(
            report.outcomes["Moved Bank"],
            SourceOutcome::Success { records: 4 }
        );
        assert_eq!(
            report.outcomes["Placeholder Bank"],
            SourceOutcome::failed(FailureReason::NoDataFound)
        );
        match &report.outcomes["Tiny Bank"] {
            SourceOutcome::Failed {
                reason: FailureReason::Retrieval(message),
            } => assert!(message.contains("3 attempts"), "unexpected message: {}", message),
            other => panic!("unexpected outcome: {:?}", other),
        }

        // Browser launch failures are not retried.
        assert_eq!(rendered.calls.load(Ordering::SeqCst), 1);

        assert_eq!(report.total_records, 8);
        assert_eq!(report.clean_quotes().count(), 8);
        let long_term = report
            .quotes
            .iter()
            .find(|q| q.tenure_description == "5 years to 10 years")
            .unwrap();
        assert_eq!((long_term.min_days, long_term.max_days), (Some(1825), Some(3650)));
        assert_eq!(long_term.senior_rate, Some(7.5));

        let repository = InMemoryQuoteRepository::new();
        assert_eq!(repository.upsert_many(&report.quotes).await.unwrap(), 8);
        assert_eq!(repository.upsert_many(&report.quotes).await.unwrap(), 0);
        assert_eq!(repository.all().await.unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_script_shell_is_rendered_before_giving_up() {
        let server = MockServer::start().await;
        // The shell page is fetched once and not retried.
        Mock::given(method("GET"))
            .and(path("/placeholder"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PLACEHOLDER_PAGE))
            .expect(1)
            .mount(&server)
            .await;
        let (settings, _file) = settings_from_yaml(&format!(
            r#"
retry:
  max_attempts: 2
  backoff_unit_ms: 0
sources:
  - bank: "Script Bank"
    urls: ["{}/placeholder"]
    strategy: static_then_rendered
"#,
            server.uri()
        ));

        let rendered = Arc::new(RenderedPageEngine::new(RATE_PAGE));
        let report = SourceOrchestrator::from_settings(
            &settings,
            Arc::new(ReqwestEngine::new(settings.http.headers())),
            rendered.clone() as Arc<dyn ScraperEngine>,
        )
        .run()
        .await;

        assert_eq!(
            report.outcomes["Script Bank"],
            SourceOutcome::Success { records: 4 }
        );
        assert_eq!(rendered.calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.total_records, 4);
    }

    #[tokio::test]
    async fn test_observer_sees_failed_attempts_before_fallback() {
        let server = bank_site().await;
        let (mut settings, _file) = settings_from_yaml(&pipeline_yaml(&server.uri()));
        settings.sources.retain(|s| s.bank == "Fallback Bank");

        let (observer, mut events) = ChannelObserver::new();
        let report = SourceOrchestrator::from_settings(
            &settings,
            Arc::new(ReqwestEngine::new(settings.http.headers())),
            Arc::new(NoBrowserEngine::default()),
        )
        .with_observer(Arc::new(observer))
        .run()
        .await;
        assert_eq!(report.total_records, 4);

        let mut failed_urls = Vec::new();
        let mut succeeded_urls = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let PipelineEvent::Attempt { url, state, .. } = event {
                match state {
                    AttemptState::Failed { .. } => failed_urls.push(url),
                    AttemptState::Succeeded { .. } => succeeded_urls.push(url),
                    AttemptState::Fetching => {}
                }
            }
        }

        let old = format!("{}/rates/old", server.uri());
        let current = format!("{}/rates/current", server.uri());
        assert_eq!(failed_urls, vec![old.clone(), old]);
        assert_eq!(succeeded_urls, vec![current]);
    }
}
