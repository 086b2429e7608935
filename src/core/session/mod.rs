//! Session Module
//!
//! Per-session conversation storage for rehearsal dialogue.

pub mod cache;

pub use cache::{CacheError, CacheResult, CacheStats, ConversationCache, InMemoryConversationCache};

#[cfg(test)]
pub use cache::MockConversationCache;
