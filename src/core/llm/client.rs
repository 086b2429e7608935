//! Backend Client Handle
//!
//! The long-lived handle retained after a successful probe. Every call goes
//! through a fixed per-attempt timeout and at most `max_retries` extra
//! attempts for retryable errors. There is no other retry anywhere.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use super::error::{LLMError, Result};
use super::provider::LLMProvider;
use super::stats::BackendStats;
use super::types::{ChatMessage, ChatRequest, ChatResponse};
use crate::config::AiConfig;

/// Pause before the retry attempt.
const RETRY_DELAY: Duration = Duration::from_millis(250);

struct Inner {
    provider: Arc<dyn LLMProvider>,
    timeout: Duration,
    max_retries: u32,
    stats: RwLock<BackendStats>,
    closed: AtomicBool,
}

/// Shared handle to the live model backend. Cheap to clone.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("provider", &self.inner.provider.id())
            .field("model", &self.inner.provider.model())
            .field("timeout", &self.inner.timeout)
            .field("max_retries", &self.inner.max_retries)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl BackendClient {
    pub fn new(provider: Arc<dyn LLMProvider>, timeout: Duration, max_retries: u32) -> Self {
        Self {
            inner: Arc::new(Inner {
                provider,
                timeout,
                max_retries,
                stats: RwLock::new(BackendStats::default()),
                closed: AtomicBool::new(false),
            }),
        }
    }

    pub fn from_config(provider: Arc<dyn LLMProvider>, config: &AiConfig) -> Self {
        Self::new(provider, config.request_timeout(), config.max_retries)
    }

    pub fn provider_id(&self) -> &str {
        self.inner.provider.id()
    }

    pub fn model(&self) -> &str {
        self.inner.provider.model()
    }

    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    pub async fn stats(&self) -> BackendStats {
        self.inner.stats.read().await.clone()
    }

    /// One attempt under the timeout, no retry.
    pub async fn chat_once(&self, request: ChatRequest) -> Result<ChatResponse> {
        if self.is_closed() {
            return Err(LLMError::NotConfigured("backend client is closed".to_string()));
        }

        let outcome = match tokio::time::timeout(self.inner.timeout, self.inner.provider.chat(request)).await {
            Ok(result) => result,
            Err(_) => Err(LLMError::Timeout),
        };

        let mut stats = self.inner.stats.write().await;
        match &outcome {
            Ok(response) => stats.record_success(response.latency_ms, response.usage.as_ref()),
            Err(e) => stats.record_failure(matches!(e, LLMError::Timeout)),
        }

        outcome
    }

    /// Send a request, retrying retryable failures up to `max_retries` times.
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let mut attempt = 0;
        loop {
            match self.chat_once(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt < self.inner.max_retries => {
                    attempt += 1;
                    log::debug!(
                        "Backend {} attempt {} failed ({}), retrying",
                        self.provider_id(),
                        attempt,
                        e
                    );
                    self.inner.stats.write().await.record_retry();
                    tokio::time::sleep(self.retry_delay(&e)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Pause before the next attempt. A rate-limited backend's hint is
    /// honored, but never for longer than one attempt's timeout.
    fn retry_delay(&self, error: &LLMError) -> Duration {
        match error {
            LLMError::RateLimited { retry_after_secs } => Duration::from_secs(*retry_after_secs)
                .max(RETRY_DELAY)
                .min(self.inner.timeout),
            _ => RETRY_DELAY,
        }
    }

    /// Single-prompt completion with the retry policy applied.
    pub async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let request = ChatRequest::new(vec![ChatMessage::user(prompt)]).with_max_tokens(max_tokens);
        Ok(self.chat(request).await?.content)
    }

    /// Release the provider. Only the first call reaches the provider.
    pub async fn close(&self) -> Result<()> {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.inner.provider.close().await
    }
}
