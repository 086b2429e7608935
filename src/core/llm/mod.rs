//! LLM Client Module
//!
//! Model backend plumbing for the coaching service:
//! - `provider`: the `LLMProvider` trait (send a prompt, receive a completion, or fail)
//! - `providers`: the OpenAI-compatible HTTP implementation
//! - `client`: the retained handle with explicit timeout and single-retry policy
//! - `probe`: the one-shot startup connectivity check that picks the engine mode

pub mod client;
pub mod error;
pub mod probe;
pub mod provider;
pub mod providers;
pub mod stats;
pub mod types;

pub use client::BackendClient;
pub use error::{LLMError, Result};
pub use probe::{probe, BackendMode, ProbeOutcome, PROBE_PROMPT};
pub use provider::LLMProvider;
pub use providers::{create_provider, OpenAIProvider};
pub use stats::BackendStats;
pub use types::{ChatMessage, ChatRequest, ChatResponse, MessageRole, TokenUsage};
