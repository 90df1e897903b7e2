//! # Redis Adapter
//!
//! [`KeyValueStore`] over a Redis connection manager.
//!
//! ## Connection Handling
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  RedisStore::connect(url)                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  redis::Client::open ──► ConnectionManager::new ──► PING                │
//! │                                   │                                     │
//! │                                   │ clone per command (cheap, shares   │
//! │                                   │ one multiplexed connection)         │
//! │                                   ▼                                     │
//! │   GET key    SET key value EX ttl [NX]    DEL key                       │
//! │                                                                         │
//! │  The manager reconnects on its own after a dropped connection.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{debug, info};

use crate::error::{CacheError, CacheResult};
use crate::store::KeyValueStore;

/// Redis-backed key-value store.
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
}

impl RedisStore {
    /// Connects and verifies the server answers.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let store = RedisStore::connect("redis://127.0.0.1:6379").await?;
    /// ```
    pub async fn connect(url: &str) -> CacheResult<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| CacheError::ConnectionFailed(format!("invalid redis url: {}", e)))?;
        let manager = ConnectionManager::new(client).await?;

        let store = RedisStore { manager };
        store.ping().await?;
        info!("Connected to Redis");

        Ok(store)
    }

    /// Round-trips a PING.
    pub async fn ping(&self) -> CacheResult<()> {
        let mut conn = self.manager.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

/// Seconds for `SET .. EX`, which rejects zero.
fn expiry_seconds(ttl: Duration) -> u64 {
    let secs = ttl.as_secs();
    if ttl.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs.max(1)
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> CacheResult<String> {
        let mut conn = self.manager.clone();
        let value: Option<String> = conn.get(key).await?;
        value.ok_or_else(|| CacheError::not_found(key))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.manager.clone();
        let seconds = expiry_seconds(ttl);
        let _: () = conn.set_ex(key, value, seconds).await?;
        debug!(key, seconds, "Stored key");
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<bool> {
        let mut conn = self.manager.clone();
        let seconds = expiry_seconds(ttl);
        // Nil reply when the key already exists
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(seconds)
            .query_async(&mut conn)
            .await?;
        debug!(key, seconds, written = reply.is_some(), "Conditional store");
        Ok(reply.is_some())
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.manager.clone();
        let removed: i64 = conn.del(key).await?;
        Ok(removed > 0)
    }
}
