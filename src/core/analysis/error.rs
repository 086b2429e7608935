//! Live Analysis Errors
//!
//! These never leave the engine: every variant triggers the heuristic
//! fallback for the request that produced it.

use thiserror::Error;

use crate::core::llm::LLMError;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("backend request failed: {0}")]
    Backend(#[from] LLMError),

    #[error("malformed analysis response: {0}")]
    MalformedResponse(String),
}

impl AnalysisError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }
}
