//! Analysis Engine Integration Tests
//!
//! Covers:
//! - One-shot mode selection at initialization
//! - Per-request fallback on backend failure, malformed output and timeout
//! - Idempotent initialize and shutdown

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::AiConfig;
use crate::core::analysis::heuristic;
use crate::core::analysis::{AnalysisEngine, CommunicationPattern, NeuralTelemetry, ReportSource};
use crate::core::llm::BackendMode;
use crate::tests::common::{live_config, sample_conversation, Failure, MockProvider, LIVE_ANALYSIS};

fn engine_with(provider: &Arc<MockProvider>, config: AiConfig) -> Arc<AnalysisEngine> {
    Arc::new(AnalysisEngine::with_provider(config, provider.clone()))
}

// =============================================================================
// Mode Selection
// =============================================================================

#[tokio::test]
async fn test_probe_failure_selects_heuristic_without_further_calls() {
    let provider = MockProvider::failing(Failure::Server).shared();
    let engine = engine_with(&provider, live_config());

    assert_eq!(engine.initialize().await, BackendMode::Heuristic);
    assert_eq!(provider.chat_calls(), 1, "probe makes exactly one attempt");
    assert_eq!(provider.close_calls(), 1, "failed probe client is released");

    let history = sample_conversation();
    for _ in 0..3 {
        let outcome = engine.analyze_detailed(&history, None).await;
        assert_eq!(outcome.source, ReportSource::Heuristic);
        assert_eq!(outcome.report, heuristic::analyze(&history, None));
    }
    assert_eq!(provider.chat_calls(), 1);
}

#[tokio::test]
async fn test_disabled_config_never_contacts_backend() {
    let provider = MockProvider::new(LIVE_ANALYSIS).shared();
    let config = AiConfig {
        use_live_backend: false,
        ..live_config()
    };
    let engine = engine_with(&provider, config);

    assert_eq!(engine.initialize().await, BackendMode::Heuristic);
    engine.analyze(&sample_conversation(), None).await;
    assert_eq!(provider.chat_calls(), 0);
}

#[tokio::test]
async fn test_demo_key_never_contacts_backend() {
    let provider = MockProvider::new(LIVE_ANALYSIS).shared();
    let config = AiConfig {
        api_key: crate::config::DEMO_API_KEY.to_string(),
        ..live_config()
    };
    let engine = engine_with(&provider, config);

    assert_eq!(engine.initialize().await, BackendMode::Heuristic);
    assert_eq!(provider.chat_calls(), 0);
}

#[tokio::test]
async fn test_initialize_is_idempotent() {
    let provider = MockProvider::new(LIVE_ANALYSIS).shared();
    let engine = engine_with(&provider, live_config());

    assert_eq!(engine.initialize().await, BackendMode::Live);
    assert_eq!(engine.initialize().await, BackendMode::Live);
    assert_eq!(provider.chat_calls(), 1);
    assert!(engine.backend().await.is_some());
}

#[tokio::test]
async fn test_concurrent_first_use_probes_once() {
    let provider = MockProvider::new(LIVE_ANALYSIS).shared();
    provider.set_delay(Duration::from_millis(50));
    let engine = engine_with(&provider, live_config());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.initialize().await })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.await.unwrap(), BackendMode::Live);
    }
    assert_eq!(provider.chat_calls(), 1);
}

// =============================================================================
// Live Analysis
// =============================================================================

#[tokio::test]
async fn test_live_report_is_normalized() {
    let provider = MockProvider::new(LIVE_ANALYSIS).shared();
    let engine = engine_with(&provider, live_config());

    let outcome = engine.analyze_detailed(&sample_conversation(), None).await;
    assert_eq!(outcome.source, ReportSource::Live);

    let report = outcome.report;
    assert_eq!(report.conversation_summary.total_exchanges, 3);
    assert_eq!(report.conversation_summary.empathetic_responses, 2);
    assert_eq!(
        report.conversation_summary.communication_pattern,
        CommunicationPattern::Improving
    );
    assert_eq!(report.metrics.empathy_score, 71.2);
    assert_eq!(report.neural_improvements.new_pathways_formed, 3 * 3 + 2 * 2);
    assert_eq!(report.neural_improvements.empathy_network_strengthening, "71%");
    assert_eq!(report.metrics.stress_reduction, 64.0);
    assert_eq!(
        report.insights,
        vec!["Acknowledged the partner's frustration before responding".to_string()]
    );

    let request = provider.last_request().unwrap();
    assert!(request.messages[0].content.contains("I understand why you're upset"));
    assert_eq!(request.max_tokens, Some(AiConfig::default().analysis_max_tokens));
}

#[tokio::test]
async fn test_live_failure_falls_back_per_request() {
    let provider = MockProvider::new(LIVE_ANALYSIS).shared();
    let engine = engine_with(&provider, live_config());
    assert_eq!(engine.initialize().await, BackendMode::Live);

    let history = sample_conversation();
    provider.set_failure(Some(Failure::Auth));
    let outcome = engine.analyze_detailed(&history, None).await;
    assert_eq!(outcome.source, ReportSource::Fallback);
    assert_eq!(outcome.report, heuristic::analyze(&history, None));
    // Auth errors are not retried
    assert_eq!(provider.chat_calls(), 2);

    // Mode is unchanged; the next request goes live again
    assert_eq!(engine.mode().await, BackendMode::Live);
    provider.set_failure(None);
    let outcome = engine.analyze_detailed(&history, None).await;
    assert_eq!(outcome.source, ReportSource::Live);
}

#[tokio::test]
async fn test_transient_failure_is_retried_once() {
    let provider = MockProvider::new(LIVE_ANALYSIS).shared();
    let engine = engine_with(&provider, live_config());
    engine.initialize().await;

    provider.fail_next(1);
    let outcome = engine.analyze_detailed(&sample_conversation(), None).await;
    assert_eq!(outcome.source, ReportSource::Live);
    assert_eq!(provider.chat_calls(), 3);

    let stats = engine.backend().await.unwrap().stats().await;
    assert_eq!(stats.retries, 1);
}

#[tokio::test]
async fn test_malformed_completion_falls_back() {
    let provider = MockProvider::new(LIVE_ANALYSIS).shared();
    let engine = engine_with(&provider, live_config());
    engine.initialize().await;

    provider.set_response("I'd rather not score this conversation.");
    let history = sample_conversation();
    let outcome = engine.analyze_detailed(&history, None).await;
    assert_eq!(outcome.source, ReportSource::Fallback);
    assert_eq!(outcome.report, heuristic::analyze(&history, None));
}

#[tokio::test]
async fn test_timeout_falls_back() {
    let provider = MockProvider::new(LIVE_ANALYSIS).shared();
    let config = AiConfig {
        max_retries: 0,
        ..live_config()
    };
    let engine = engine_with(&provider, config);
    engine.initialize().await;

    provider.set_delay(Duration::from_millis(1500));
    let outcome = engine.analyze_detailed(&sample_conversation(), None).await;
    assert_eq!(outcome.source, ReportSource::Fallback);

    let stats = engine.backend().await.unwrap().stats().await;
    assert_eq!(stats.timeouts, 1);
}

#[tokio::test]
async fn test_live_report_echoes_telemetry() {
    let provider = MockProvider::new(LIVE_ANALYSIS).shared();
    let engine = engine_with(&provider, live_config());

    let telemetry: NeuralTelemetry = serde_json::from_str(r#"{"regulation": 91.5}"#).unwrap();
    let report = engine.analyze(&sample_conversation(), Some(&telemetry)).await;
    let correlation = report.neural_correlation.unwrap();
    assert_eq!(correlation.regulation, 91.5);
    assert_eq!(correlation.avg_stress, 35.0);
    assert_eq!(correlation.peak_empathy, 82.0);
}

#[tokio::test]
async fn test_empty_telemetry_object_yields_defaults() {
    let engine = AnalysisEngine::new(AiConfig::default());
    let telemetry: NeuralTelemetry = serde_json::from_str("{}").unwrap();

    let report = engine.analyze(&[], Some(&telemetry)).await;
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["neural_correlation"]["avg_stress_during_training"], 35.0);
    assert_eq!(json["neural_correlation"]["peak_empathy_activation"], 82.0);
    assert_eq!(json["neural_correlation"]["emotional_regulation_consistency"], 78.0);
}

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn test_shutdown_releases_client_once() {
    let provider = MockProvider::new(LIVE_ANALYSIS).shared();
    let engine = engine_with(&provider, live_config());
    assert_eq!(engine.initialize().await, BackendMode::Live);

    engine.shutdown().await;
    engine.shutdown().await;
    assert_eq!(provider.close_calls(), 1);
    assert_eq!(engine.mode().await, BackendMode::Heuristic);
    assert!(engine.backend().await.is_none());

    let calls = provider.chat_calls();
    let outcome = engine.analyze_detailed(&sample_conversation(), None).await;
    assert_eq!(outcome.source, ReportSource::Heuristic);
    assert_eq!(provider.chat_calls(), calls);
}

#[tokio::test]
async fn test_shutdown_of_heuristic_engine_is_noop() {
    let engine = AnalysisEngine::new(AiConfig::default());
    engine.initialize().await;
    engine.shutdown().await;
    engine.shutdown().await;
    assert_eq!(engine.mode().await, BackendMode::Heuristic);
}

#[tokio::test]
async fn test_reprobe_recovers_live_mode() {
    let provider = MockProvider::failing(Failure::RateLimited).shared();
    let engine = engine_with(&provider, live_config());
    assert_eq!(engine.initialize().await, BackendMode::Heuristic);

    provider.set_failure(None);
    provider.set_response(LIVE_ANALYSIS);
    // Still heuristic until asked
    engine.analyze(&sample_conversation(), None).await;
    assert_eq!(engine.mode().await, BackendMode::Heuristic);

    assert_eq!(engine.reprobe().await, BackendMode::Live);
    let outcome = engine.analyze_detailed(&sample_conversation(), None).await;
    assert_eq!(outcome.source, ReportSource::Live);
}

#[tokio::test]
async fn test_reprobe_releases_previous_client() {
    let provider = MockProvider::new(LIVE_ANALYSIS).shared();
    let engine = engine_with(&provider, live_config());
    engine.initialize().await;

    provider.set_failure(Some(Failure::Auth));
    assert_eq!(engine.reprobe().await, BackendMode::Heuristic);
    // Old live client plus the failed probe client
    assert_eq!(provider.close_calls(), 2);
}

#[tokio::test]
async fn test_requests_are_served_while_mode_is_reselected() {
    let provider = MockProvider::new(LIVE_ANALYSIS).shared();
    let engine = engine_with(&provider, live_config());
    assert_eq!(engine.initialize().await, BackendMode::Live);

    provider.set_delay(Duration::from_millis(600));
    let pending = tokio::spawn({
        let engine = engine.clone();
        async move { engine.reprobe().await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let calls = provider.chat_calls();
    let started = Instant::now();
    let outcome = engine.analyze_detailed(&sample_conversation(), None).await;
    assert!(
        started.elapsed() < Duration::from_millis(300),
        "analyze waited {:?}",
        started.elapsed()
    );
    assert_eq!(outcome.source, ReportSource::Heuristic);
    assert_eq!(provider.chat_calls(), calls);

    assert_eq!(pending.await.unwrap(), BackendMode::Live);
    assert_eq!(engine.mode().await, BackendMode::Live);
}

#[tokio::test]
async fn test_reselecting_after_shutdown_keeps_engine_released() {
    let provider = MockProvider::new(LIVE_ANALYSIS).shared();
    let engine = engine_with(&provider, live_config());
    assert_eq!(engine.initialize().await, BackendMode::Live);
    engine.shutdown().await;

    let calls = provider.chat_calls();
    assert_eq!(engine.reprobe().await, BackendMode::Heuristic);
    assert_eq!(provider.chat_calls(), calls);
    assert_eq!(provider.close_calls(), 1);
    assert!(engine.backend().await.is_none());
}

#[tokio::test]
async fn test_shutdown_during_reselection_releases_new_client() {
    let provider = MockProvider::new(LIVE_ANALYSIS).shared();
    let engine = engine_with(&provider, live_config());
    engine.initialize().await;

    provider.set_delay(Duration::from_millis(300));
    let pending = tokio::spawn({
        let engine = engine.clone();
        async move { engine.reprobe().await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    engine.shutdown().await;

    assert_eq!(pending.await.unwrap(), BackendMode::Heuristic);
    // Previous client plus the one built while shutting down
    assert_eq!(provider.close_calls(), 2);
    assert!(engine.backend().await.is_none());
}

#[tokio::test]
async fn test_heuristic_reports_are_byte_identical() {
    let engine = AnalysisEngine::new(AiConfig::default());
    let history = sample_conversation();

    let a = serde_json::to_string(&engine.analyze(&history, None).await).unwrap();
    let b = serde_json::to_string(&engine.analyze(&history, None).await).unwrap();
    assert_eq!(a, b);
}
