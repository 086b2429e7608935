//! Personality Error Types

use thiserror::Error;

/// Errors related to personality catalog lookups.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersonalityError {
    /// No personality is registered under the given key.
    #[error("personality not found: {key}")]
    NotFound {
        /// The key that was looked up.
        key: String,
    },
}

impl PersonalityError {
    /// Create a new NotFound error.
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }
}
