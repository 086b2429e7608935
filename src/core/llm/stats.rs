//! Backend Statistics
//!
//! Tracks request outcomes for a retained backend handle.

use serde::{Deserialize, Serialize};

use super::types::TokenUsage;

/// Counters for a single backend handle
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendStats {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    /// Extra attempts made after a retryable failure.
    pub retries: u64,
    pub timeouts: u64,
    pub total_latency_ms: u64,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
}

impl BackendStats {
    pub fn avg_latency_ms(&self) -> u64 {
        if self.successful_requests == 0 {
            0
        } else {
            self.total_latency_ms / self.successful_requests
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            1.0
        } else {
            self.successful_requests as f64 / self.total_requests as f64
        }
    }

    pub fn record_success(&mut self, latency_ms: u64, usage: Option<&TokenUsage>) {
        self.total_requests += 1;
        self.successful_requests += 1;
        self.total_latency_ms += latency_ms;

        if let Some(u) = usage {
            self.total_input_tokens += u.input_tokens as u64;
            self.total_output_tokens += u.output_tokens as u64;
        }
    }

    pub fn record_failure(&mut self, timed_out: bool) {
        self.total_requests += 1;
        self.failed_requests += 1;
        if timed_out {
            self.timeouts += 1;
        }
    }

    pub fn record_retry(&mut self) {
        self.retries += 1;
    }
}
