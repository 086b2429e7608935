//! Backend Connectivity Probe
//!
//! Decides once, at startup, whether analysis runs against the live backend
//! or the local heuristic engine.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::client::BackendClient;
use super::error::Result;
use super::provider::LLMProvider;
use super::types::{ChatMessage, ChatRequest};
use crate::config::AiConfig;

/// Prompt used for the connectivity round trip.
pub const PROBE_PROMPT: &str = "Hello";

/// Which engine serves analysis requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    Live,
    Heuristic,
}

impl std::fmt::Display for BackendMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendMode::Live => write!(f, "live"),
            BackendMode::Heuristic => write!(f, "heuristic"),
        }
    }
}

/// Result of a probe: the mode and, when live, the retained handle.
#[derive(Debug)]
pub struct ProbeOutcome {
    pub mode: BackendMode,
    pub client: Option<BackendClient>,
}

impl ProbeOutcome {
    pub fn heuristic() -> Self {
        Self {
            mode: BackendMode::Heuristic,
            client: None,
        }
    }

    fn live(client: BackendClient) -> Self {
        Self {
            mode: BackendMode::Live,
            client: Some(client),
        }
    }
}

/// Probe the backend.
///
/// `factory` is only invoked when the configuration enables live mode. The
/// probe makes exactly one attempt; any failure yields `Heuristic`.
pub async fn probe<F>(config: &AiConfig, factory: F) -> ProbeOutcome
where
    F: FnOnce(&AiConfig) -> Result<Arc<dyn LLMProvider>>,
{
    if !config.live_enabled() {
        log::info!("Live backend disabled by configuration, using heuristic analysis");
        return ProbeOutcome::heuristic();
    }

    let provider = match factory(config) {
        Ok(provider) => provider,
        Err(e) => {
            log::warn!("Could not construct model backend, using heuristic analysis: {}", e);
            return ProbeOutcome::heuristic();
        }
    };

    let client = BackendClient::from_config(provider, config);
    let request = ChatRequest::new(vec![ChatMessage::user(PROBE_PROMPT)])
        .with_max_tokens(config.probe_max_tokens);

    match client.chat_once(request).await {
        Ok(_) => {
            log::info!(
                "Model backend verified ({} / {}), using live analysis",
                client.provider_id(),
                client.model()
            );
            ProbeOutcome::live(client)
        }
        Err(e) => {
            log::warn!("Model backend not available, using heuristic analysis: {}", e);
            if let Err(close_err) = client.close().await {
                log::error!("Failed to release probe client: {}", close_err);
            }
            ProbeOutcome::heuristic()
        }
    }
}
