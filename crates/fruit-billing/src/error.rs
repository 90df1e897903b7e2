//! # Billing Error Types
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ValidationError / CoreError (fruit-core)  ──┐                          │
//! │  CacheError (fruit-cache)                  ──┼──► BillingError          │
//! │  ProviderError (cart / catalog contracts)  ──┘        │                 │
//! │                                                       ▼                 │
//! │                               code() + is_client_error()                │
//! │                               for the HTTP layer to map                 │
//! │                                                                         │
//! │  CLIENT (4xx)                      SERVER (5xx)                         │
//! │  NotFound, Conflict,               Store, Decode, Encode,               │
//! │  Format, Validation, InvalidSale   Pricing, Provider,                   │
//! │                                    CheckoutIncomplete                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use fruit_cache::CacheError;
use fruit_core::{CoreError, ValidationError};
use thiserror::Error;
use uuid::Uuid;

use crate::checkout::CheckoutStep;
use crate::provider::ProviderError;

/// Errors returned by the billing services.
#[derive(Debug, Error)]
pub enum BillingError {
    /// Nothing stored for the request (no personal discount, unknown id).
    #[error("Not found: {0}")]
    NotFound(String),

    /// The key-value store failed.
    #[error("Store error: {0}")]
    Store(#[source] CacheError),

    /// A stored personal discount could not be decoded.
    #[error("Malformed payload under {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A personal discount could not be encoded for storage.
    #[error("Failed to encode payload: {0}")]
    Encode(#[source] serde_json::Error),

    /// Card expiry is not `MM/YY`.
    #[error("Invalid format: {0}")]
    Format(String),

    /// A card field is invalid.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A discount rule is not acceptable.
    #[error("Invalid sale {sale}: {source}")]
    InvalidSale {
        sale: String,
        #[source]
        source: ValidationError,
    },

    /// The request conflicts with current state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The cart could not be priced (inconsistent cart data).
    #[error("Pricing failed: {0}")]
    Pricing(#[source] CoreError),

    /// A cart or catalog collaborator failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Payment was accepted but not every checkout step finished.
    ///
    /// Run `CheckoutService::reconcile` for the user to finish.
    #[error("Checkout for {user_id} incomplete after {completed:?}: {source}")]
    CheckoutIncomplete {
        user_id: Uuid,
        completed: Vec<CheckoutStep>,
        #[source]
        source: Box<BillingError>,
    },
}

impl BillingError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            BillingError::NotFound(_) => "not_found",
            BillingError::Store(_) => "store_unavailable",
            BillingError::Decode { .. } => "decode_failed",
            BillingError::Encode(_) => "encode_failed",
            BillingError::Format(_) => "invalid_format",
            BillingError::Validation(_) => "validation_failed",
            BillingError::InvalidSale { .. } => "invalid_sale",
            BillingError::Conflict(_) => "conflict",
            BillingError::Pricing(_) => "pricing_failed",
            BillingError::Provider(_) => "provider_failed",
            BillingError::CheckoutIncomplete { .. } => "checkout_incomplete",
        }
    }

    /// True when the caller sent something wrong rather than the system
    /// failing.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            BillingError::NotFound(_)
                | BillingError::Format(_)
                | BillingError::Validation(_)
                | BillingError::InvalidSale { .. }
                | BillingError::Conflict(_)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BillingError::NotFound(_))
    }
}

/// Convert cache errors to BillingError.
///
/// ```text
/// CacheError::NotFound → BillingError::NotFound
/// other                → BillingError::Store
/// ```
impl From<CacheError> for BillingError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::NotFound { key } => BillingError::NotFound(key),
            other => BillingError::Store(other),
        }
    }
}

/// Convert engine errors to BillingError.
impl From<CoreError> for BillingError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ExpiryFormat(raw) => BillingError::Format(format!("expiry '{}' is not MM/YY", raw)),
            CoreError::Validation(source) => BillingError::Validation(source),
            CoreError::InvalidSale { sale, source } => BillingError::InvalidSale { sale, source },
            other @ CoreError::ConflictingPrice { .. } => BillingError::Pricing(other),
        }
    }
}

/// Result type for billing operations.
pub type BillingResult<T> = Result<T, BillingError>;
