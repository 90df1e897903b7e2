//! # Cache Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  redis::RedisError                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CacheError (this module) ← NotFound is a normal outcome, the rest     │
//! │       │                     are store failures                          │
//! │       ▼                                                                 │
//! │  BillingError (fruit-billing) ← NotFound / Store                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Key-value store errors.
#[derive(Debug, Error)]
pub enum CacheError {
    /// No value under the key (never set, deleted, or expired).
    #[error("Key not found: {key}")]
    NotFound { key: String },

    /// The store could not be reached.
    ///
    /// ## When This Occurs
    /// - Redis is down or the URL is wrong
    /// - Connection dropped mid-command
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The store answered with an error.
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

impl CacheError {
    /// Creates a NotFound error for a key.
    pub fn not_found(key: impl Into<String>) -> Self {
        CacheError::NotFound { key: key.into() }
    }

    /// Checks if this is a not-found outcome rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::NotFound { .. })
    }
}

/// Convert redis errors to CacheError.
///
/// ## Error Mapping
/// ```text
/// connection refused / dropped / timeout / io  → ConnectionFailed
/// anything else                                → CommandFailed
/// ```
impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_refusal()
            || err.is_connection_dropped()
            || err.is_timeout()
            || err.is_io_error()
        {
            CacheError::ConnectionFailed(err.to_string())
        } else {
            CacheError::CommandFailed(err.to_string())
        }
    }
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
