//! In-process [`KeyValueStore`] for tests and the Redis-less quote tool.
//!
//! Expired entries are dropped when they are next touched, and every
//! [`SWEEP_INTERVAL`] writes the whole map is swept.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::error::{CacheError, CacheResult};
use crate::store::KeyValueStore;

/// Writes between two full sweeps of expired entries.
pub const SWEEP_INTERVAL: u64 = 64;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

#[derive(Debug, Default)]
struct Entries {
    map: HashMap<String, Entry>,
    writes: u64,
}

impl Entries {
    fn insert(&mut self, key: &str, value: &str, ttl: Duration, now: Instant) {
        let entry = Entry {
            value: value.to_string(),
            expires_at: now + ttl,
        };
        self.map.insert(key.to_string(), entry);

        self.writes += 1;
        if self.writes % SWEEP_INTERVAL == 0 {
            self.map.retain(|_, e| e.is_live(now));
        }
    }
}

/// Shared map of key → (value, deadline).
///
/// Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<RwLock<Entries>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries.map.values().filter(|e| e.is_live(now)).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> CacheResult<String> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.map.get(key) {
                Some(entry) if entry.is_live(now) => return Ok(entry.value.clone()),
                Some(_) => {}
                None => return Err(CacheError::not_found(key)),
            }
        }

        // Expired: drop it so the map does not grow with dead keys
        let mut entries = self.entries.write().await;
        if entries.map.get(key).is_some_and(|e| !e.is_live(now)) {
            entries.map.remove(key);
        }
        Err(CacheError::not_found(key))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        self.entries.write().await.insert(key, value, ttl, Instant::now());
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<bool> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        if entries.map.get(key).is_some_and(|e| e.is_live(now)) {
            return Ok(false);
        }
        entries.insert(key, value, ttl, now);
        Ok(true)
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        let now = Instant::now();
        let removed = self.entries.write().await.map.remove(key);
        Ok(removed.is_some_and(|e| e.is_live(now)))
    }
}
