//! # Error Types
//!
//! Domain-specific error types for fruit-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  fruit-core errors (this file)                                         │
//! │  ├── CoreError        - Cart / rule / expiry problems                  │
//! │  └── ValidationError  - Field level failures                           │
//! │                                                                         │
//! │  fruit-cache errors (separate crate)                                   │
//! │  └── CacheError       - Key-value store failures                       │
//! │                                                                         │
//! │  fruit-billing errors                                                   │
//! │  └── BillingError     - What the storefront layer maps to responses    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → BillingError → HTTP layer         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Pricing and payment errors raised by the pure engine.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The same product appears twice in a cart with different prices.
    ///
    /// ## When This Occurs
    /// The cart provider returned two lines for one product name. Equal
    /// prices are merged; different prices cannot be priced consistently.
    #[error("Product {product} listed with conflicting prices {first} and {second}")]
    ConflictingPrice {
        product: String,
        first: Money,
        second: Money,
    },

    /// A discount rule failed validation.
    #[error("Invalid sale {sale}: {source}")]
    InvalidSale {
        sale: String,
        #[source]
        source: ValidationError,
    },

    /// Card expiry is not `MM/YY`.
    #[error("Invalid expiry date format: {0}")]
    ExpiryFormat(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for discount rules and payment card fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g. non-digit card number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Card number fails the Luhn checksum.
    #[error("card number failed checksum")]
    Checksum,

    /// Card expired before the current month.
    #[error("card expired {month:02}/{year}")]
    Expired { month: u32, year: i32 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
