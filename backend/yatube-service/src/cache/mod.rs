//! Global feed cache
//!
//! A single entry under a fixed key holds the rendered body of the global
//! feed. The entry is written by the first global-feed request after it
//! expires and served to every global-feed request until the TTL runs out,
//! whatever page or viewer asks. Post mutations never touch it; only expiry
//! or an explicit `clear` removes it.
//!
//! Store failures never fail a request: reads degrade to a miss and writes
//! are dropped, both with a warning.

mod memory_store;
mod redis_store;

pub use memory_store::MemoryFeedCacheStore;
pub use redis_store::RedisFeedCacheStore;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::FeedConfig;
use crate::error::Result;
use crate::metrics::feed::record_cache_event;

/// Key -> blob store with per-entry TTL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedCacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Returns true if an entry was removed
    async fn clear(&self, key: &str) -> Result<bool>;

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

/// The global feed entry on top of a `FeedCacheStore`.
#[derive(Clone)]
pub struct FeedCache {
    store: Arc<dyn FeedCacheStore>,
    key: String,
    ttl: Duration,
    enabled: bool,
}

impl FeedCache {
    pub fn new(store: Arc<dyn FeedCacheStore>, config: &FeedConfig) -> Self {
        Self {
            store,
            key: format!("{}:global", config.cache_key_prefix),
            ttl: Duration::from_secs(config.cache_ttl_secs),
            enabled: config.cache_enabled && config.cache_ttl_secs > 0,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Cached rendering, or `None` on a miss, when disabled, or when the
    /// store is unavailable.
    pub async fn read(&self) -> Option<String> {
        if !self.enabled {
            return None;
        }

        match self.store.get(&self.key).await {
            Ok(Some(body)) => {
                debug!(key = %self.key, "feed cache hit");
                record_cache_event("hit");
                Some(body)
            }
            Ok(None) => {
                debug!(key = %self.key, "feed cache miss");
                record_cache_event("miss");
                None
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "feed cache read failed; recomputing");
                record_cache_event("error");
                None
            }
        }
    }

    /// Store a fresh rendering for the next `ttl`.
    pub async fn write(&self, body: &str) {
        if !self.enabled {
            return;
        }

        match self.store.set(&self.key, body, self.ttl).await {
            Ok(()) => {
                debug!(key = %self.key, ttl_secs = self.ttl.as_secs(), "feed cached");
                record_cache_event("write");
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "feed cache write failed");
                record_cache_event("error");
            }
        }
    }

    /// Drop the entry now. Unlike reads and writes, failures are reported
    /// to the caller.
    pub async fn clear(&self) -> Result<bool> {
        let removed = self.store.clear(&self.key).await?;
        record_cache_event("clear");
        Ok(removed)
    }

    pub async fn health_check(&self) -> Result<()> {
        self.store.health_check().await
    }
}
