//! LLM Provider Implementations

mod openai;

pub use openai::{OpenAIProvider, OPENAI_BASE_URL};

use std::sync::Arc;

use super::error::Result;
use super::provider::LLMProvider;
use crate::config::AiConfig;

/// Build the configured backend provider.
pub fn create_provider(config: &AiConfig) -> Result<Arc<dyn LLMProvider>> {
    Ok(Arc::new(OpenAIProvider::from_config(config)?))
}
