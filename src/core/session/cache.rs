//! Conversation Cache
//!
//! Session id -> dialogue history store used by rehearsal dialogue. The
//! cache is a convenience: analysis never depends on it, and callers treat
//! any cache failure as an empty history.
//!
//! The in-memory implementation is an LRU with an optional TTL. Expired
//! entries read as absent and are evicted on access.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::config::CacheConfig;
use crate::core::analysis::ConversationHistory;

pub type CacheResult<T> = Result<T, CacheError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("cache serialization failed: {0}")]
    Serialization(String),

    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

/// Key-value store for per-session dialogue history.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConversationCache: Send + Sync {
    async fn get(&self, session_id: &str) -> CacheResult<Option<ConversationHistory>>;

    async fn set(&self, session_id: &str, history: ConversationHistory) -> CacheResult<()>;

    /// Remove a session. Returns whether anything was stored.
    async fn remove(&self, session_id: &str) -> CacheResult<bool>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries dropped because their TTL elapsed.
    pub expirations: u64,
    /// Entries dropped to make room.
    pub evictions: u64,
    pub entries: usize,
    pub capacity: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct CacheEntry {
    history: ConversationHistory,
    stored_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, ttl: Duration) -> bool {
        !ttl.is_zero() && self.stored_at.elapsed() > ttl
    }
}

struct Inner {
    entries: LruCache<String, CacheEntry>,
    stats: CacheStats,
}

/// Process-local LRU conversation cache.
pub struct InMemoryConversationCache {
    inner: RwLock<Inner>,
    ttl: Duration,
}

impl InMemoryConversationCache {
    /// A capacity of 0 is treated as 1.
    pub fn new(config: &CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: RwLock::new(Inner {
                entries: LruCache::new(capacity),
                stats: CacheStats {
                    capacity: capacity.get(),
                    ..CacheStats::default()
                },
            }),
            ttl: Duration::from_secs(config.ttl_seconds),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(&CacheConfig::default())
    }

    pub async fn stats(&self) -> CacheStats {
        let inner = self.inner.read().await;
        CacheStats {
            entries: inner.entries.len(),
            ..inner.stats
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn clear(&self) {
        self.inner.write().await.entries.clear();
    }
}

#[async_trait]
impl ConversationCache for InMemoryConversationCache {
    async fn get(&self, session_id: &str) -> CacheResult<Option<ConversationHistory>> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        match inner.entries.get(session_id) {
            None => {
                inner.stats.misses += 1;
                return Ok(None);
            }
            Some(entry) if !entry.is_expired(self.ttl) => {
                let history = entry.history.clone();
                inner.stats.hits += 1;
                return Ok(Some(history));
            }
            Some(_) => {}
        }

        inner.entries.pop(session_id);
        inner.stats.expirations += 1;
        inner.stats.misses += 1;
        Ok(None)
    }

    async fn set(&self, session_id: &str, history: ConversationHistory) -> CacheResult<()> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        let entry = CacheEntry {
            history,
            stored_at: Instant::now(),
        };
        if let Some((evicted, _)) = inner.entries.push(session_id.to_string(), entry) {
            if evicted != session_id {
                log::debug!("Evicted conversation {} from cache", evicted);
                inner.stats.evictions += 1;
            }
        }
        Ok(())
    }

    async fn remove(&self, session_id: &str) -> CacheResult<bool> {
        Ok(self.inner.write().await.entries.pop(session_id).is_some())
    }
}
