//! # fruit-cache: Key-Value Store Layer
//!
//! Storage for short-lived per-user state, today the personal discount.
//!
//! ## Module Organization
//!
//! - [`store`] - The [`KeyValueStore`] contract
//! - [`redis_store`] - Redis adapter
//! - [`memory`] - In-process adapter with the same expiry semantics
//! - [`error`] - Cache error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use fruit_cache::{KeyValueStore, RedisStore};
//!
//! let store = RedisStore::connect("redis://127.0.0.1:6379").await?;
//! store.set("42_discount", payload, Duration::from_secs(3600)).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod memory;
pub mod redis_store;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{CacheError, CacheResult};
pub use memory::InMemoryStore;
pub use redis_store::RedisStore;
pub use store::KeyValueStore;
