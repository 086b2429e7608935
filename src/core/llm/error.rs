//! Backend Error Types

use thiserror::Error;

/// Result type for backend operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors returned by the model backend.
#[derive(Error, Debug)]
pub enum LLMError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Request timed out")]
    Timeout,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl LLMError {
    /// Map a non-success HTTP status and body onto the error taxonomy.
    pub fn from_status(status: u16, body: String, retry_after_secs: Option<u64>) -> Self {
        match status {
            401 | 403 => LLMError::AuthError(body),
            429 => LLMError::RateLimited {
                retry_after_secs: retry_after_secs.unwrap_or(1),
            },
            408 | 504 => LLMError::Timeout,
            _ => LLMError::ApiError {
                status,
                message: body,
            },
        }
    }

    /// Whether a second attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            LLMError::Timeout | LLMError::RateLimited { .. } | LLMError::HttpError(_) => true,
            LLMError::ApiError { status, .. } => *status >= 500,
            LLMError::AuthError(_) | LLMError::InvalidResponse(_) | LLMError::NotConfigured(_) => {
                false
            }
        }
    }
}
