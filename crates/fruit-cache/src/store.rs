//! The key-value contract the billing layer depends on.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::CacheResult;

/// A string key-value store with per-key expiry.
///
/// ## Semantics
/// ```text
/// get(key)             → value, or CacheError::NotFound
/// set(key, value, ttl) → overwrites, expires after ttl
/// set_if_absent(..)    → writes only when no live value exists, atomically;
///                        true if written
/// delete(key)          → true if a live value was removed
/// ```
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> CacheResult<String>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<bool>;

    async fn delete(&self, key: &str) -> CacheResult<bool>;
}
