use async_trait::async_trait;
use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;

use super::FeedCacheStore;
use crate::error::Result;

/// Process-local cache store. Expired entries are dropped on read.
#[derive(Debug, Default)]
pub struct MemoryFeedCacheStore {
    entries: DashMap<String, (String, Instant)>,
}

impl MemoryFeedCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FeedCacheStore for MemoryFeedCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        let expired = match self.entries.get(key) {
            Some(entry) if entry.1 > now => return Ok(Some(entry.0.clone())),
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove_if(key, |_, (_, expires_at)| *expires_at <= now);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.entries
            .insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<bool> {
        Ok(self.entries.remove(key).is_some())
    }
}
