//! Mock implementations for testing
//!
//! mockall doubles for the collaborator traits, plus canned setups.

#![allow(dead_code)]

use crate::core::session::CacheError;

pub use crate::core::session::MockConversationCache;

/// A cache whose every operation fails.
pub fn unavailable_cache() -> MockConversationCache {
    let mut cache = MockConversationCache::new();
    cache
        .expect_get()
        .returning(|_| Err(CacheError::Unavailable("connection refused".into())));
    cache
        .expect_set()
        .returning(|_, _| Err(CacheError::Unavailable("connection refused".into())));
    cache
        .expect_remove()
        .returning(|_| Err(CacheError::Unavailable("connection refused".into())));
    cache
}
