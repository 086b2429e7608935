//! Analysis Engine
//!
//! Owns the backend mode for the life of the process. The probe runs once on
//! first use; afterwards every request is served by the live backend or the
//! heuristic scorer, and a failing live request falls back to the heuristic
//! for that request only.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{OnceCell, RwLock};
use tracing::instrument;

use super::heuristic;
use super::live;
use super::types::{AnalysisReport, Exchange, NeuralTelemetry};
use crate::config::AiConfig;
use crate::core::llm::{self, create_provider, probe, BackendClient, BackendMode, LLMProvider};

type ProviderFactory = Box<dyn Fn(&AiConfig) -> llm::Result<Arc<dyn LLMProvider>> + Send + Sync>;

/// Which path produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportSource {
    Live,
    Heuristic,
    /// Live mode was active but the request failed.
    Fallback,
}

#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub report: AnalysisReport,
    pub source: ReportSource,
}

struct EngineState {
    mode: BackendMode,
    client: Option<BackendClient>,
}

impl Default for EngineState {
    fn default() -> Self {
        Self {
            mode: BackendMode::Heuristic,
            client: None,
        }
    }
}

/// Conversation analysis service.
///
/// Shared explicitly as `Arc<AnalysisEngine>`. `analyze` never fails.
pub struct AnalysisEngine {
    config: AiConfig,
    factory: ProviderFactory,
    initialized: OnceCell<()>,
    state: RwLock<EngineState>,
    shut_down: AtomicBool,
}

impl std::fmt::Debug for AnalysisEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisEngine")
            .field("model", &self.config.model)
            .field("initialized", &self.initialized.initialized())
            .field("shut_down", &self.shut_down.load(Ordering::SeqCst))
            .finish()
    }
}

impl AnalysisEngine {
    /// Engine backed by the OpenAI-compatible provider built from `config`.
    pub fn new(config: AiConfig) -> Self {
        Self::with_factory(config, create_provider)
    }

    /// Engine that probes a caller-supplied provider.
    pub fn with_provider(config: AiConfig, provider: Arc<dyn LLMProvider>) -> Self {
        Self::with_factory(config, move |_| Ok(provider.clone()))
    }

    pub fn with_factory<F>(config: AiConfig, factory: F) -> Self
    where
        F: Fn(&AiConfig) -> llm::Result<Arc<dyn LLMProvider>> + Send + Sync + 'static,
    {
        Self {
            config,
            factory: Box::new(factory),
            initialized: OnceCell::new(),
            state: RwLock::new(EngineState::default()),
            shut_down: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// Probe the backend once. Later calls return the mode chosen by the
    /// first call without touching the network.
    pub async fn initialize(&self) -> BackendMode {
        self.initialized
            .get_or_init(|| async {
                if self.shut_down.load(Ordering::SeqCst) {
                    return;
                }
                let outcome = probe(&self.config, |config| (self.factory)(config)).await;
                if self.shut_down.load(Ordering::SeqCst) {
                    // Shut down while probing; release instead of retaining.
                    if let Some(client) = outcome.client {
                        if let Err(e) = client.close().await {
                            log::error!("Failed to release backend client: {}", e);
                        }
                    }
                    return;
                }
                let mut state = self.state.write().await;
                state.mode = outcome.mode;
                state.client = outcome.client;
            })
            .await;
        self.mode().await
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.initialized()
    }

    pub async fn mode(&self) -> BackendMode {
        self.state.read().await.mode
    }

    /// The retained live handle, if the engine is in live mode.
    pub async fn backend(&self) -> Option<BackendClient> {
        let state = self.state.read().await;
        match state.mode {
            BackendMode::Live => state.client.clone(),
            BackendMode::Heuristic => None,
        }
    }

    /// Analyze a conversation. Always returns a complete report.
    pub async fn analyze(
        &self,
        history: &[Exchange],
        telemetry: Option<&NeuralTelemetry>,
    ) -> AnalysisReport {
        self.analyze_detailed(history, telemetry).await.report
    }

    /// Like `analyze`, also reporting which path produced the report.
    #[instrument(skip_all, fields(exchanges = history.len()))]
    pub async fn analyze_detailed(
        &self,
        history: &[Exchange],
        telemetry: Option<&NeuralTelemetry>,
    ) -> AnalysisOutcome {
        self.initialize().await;

        let Some(client) = self.backend().await else {
            return AnalysisOutcome {
                report: heuristic::analyze(history, telemetry),
                source: ReportSource::Heuristic,
            };
        };

        match live::analyze(&client, history, telemetry, self.config.analysis_max_tokens).await {
            Ok(report) => AnalysisOutcome {
                report,
                source: ReportSource::Live,
            },
            Err(e) => {
                log::warn!("Live analysis failed, using heuristic report: {}", e);
                AnalysisOutcome {
                    report: heuristic::analyze(history, telemetry),
                    source: ReportSource::Fallback,
                }
            }
        }
    }

    /// Release the live handle. Safe to call any number of times; close
    /// failures are logged and swallowed.
    pub async fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        // An engine shut down before first use must not probe afterwards.
        let _ = self.initialized.set(());

        let client = {
            let mut state = self.state.write().await;
            state.mode = BackendMode::Heuristic;
            state.client.take()
        };
        if let Some(client) = client {
            if let Err(e) = client.close().await {
                log::error!("Failed to release backend client: {}", e);
            }
        }
        log::info!("Analysis engine shut down");
    }

    /// Re-run the connectivity probe on explicit request, replacing the
    /// current mode. Nothing calls this automatically. A shut-down engine
    /// stays shut down and reports heuristic mode.
    ///
    /// The state lock is only held to swap handles; requests issued while the
    /// round trip is in flight are served by the heuristic scorer.
    pub async fn reprobe(&self) -> BackendMode {
        if self.shut_down.load(Ordering::SeqCst) {
            return BackendMode::Heuristic;
        }
        let _ = self.initialized.set(());

        let old = {
            let mut state = self.state.write().await;
            state.mode = BackendMode::Heuristic;
            state.client.take()
        };
        if let Some(old) = old {
            if let Err(e) = old.close().await {
                log::error!("Failed to release backend client: {}", e);
            }
        }

        let outcome = probe(&self.config, |config| (self.factory)(config)).await;
        log::info!("Re-probe selected {} mode", outcome.mode);

        let mut state = self.state.write().await;
        if self.shut_down.load(Ordering::SeqCst) {
            drop(state);
            if let Some(client) = outcome.client {
                if let Err(e) = client.close().await {
                    log::error!("Failed to release backend client: {}", e);
                }
            }
            return BackendMode::Heuristic;
        }
        let displaced = std::mem::replace(&mut state.client, outcome.client);
        state.mode = outcome.mode;
        let mode = state.mode;
        drop(state);

        // A concurrent call may have installed a handle in the meantime.
        if let Some(client) = displaced {
            if let Err(e) = client.close().await {
                log::error!("Failed to release backend client: {}", e);
            }
        }
        mode
    }
}
