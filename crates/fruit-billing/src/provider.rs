//! # Collaborator Contracts
//!
//! What the billing services need from the relational side of the store.
//! The SQL implementations live with the web application; this crate only
//! depends on the traits.
//!
//! ```text
//! ┌────────────────────┐        ┌──────────────────────────────────────┐
//! │  CheckoutService   │───────►│ CartProvider                         │
//! │                    │        │   cart_lines(user) → Vec<CartLine>   │
//! │                    │        │   clear_cart(user)   (idempotent)    │
//! │                    │        └──────────────────────────────────────┘
//! │                    │        ┌──────────────────────────────────────┐
//! │                    │───────►│ DiscountCatalog                      │
//! │                    │        │   discount_by_id(id) → GeneralSale?  │
//! └────────────────────┘        └──────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use fruit_core::{CartLine, GeneralSale};
use thiserror::Error;
use uuid::Uuid;

/// A collaborator could not answer.
#[derive(Debug, Error)]
#[error("{operation} failed: {message}")]
pub struct ProviderError {
    /// The contract method that failed, e.g. `cart_lines`.
    pub operation: &'static str,
    pub message: String,
}

impl ProviderError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        ProviderError {
            operation,
            message: message.into(),
        }
    }
}

/// Per-user shopping cart.
#[async_trait]
pub trait CartProvider: Send + Sync {
    /// The user's cart with current catalog prices.
    ///
    /// Products whose price cannot be resolved are left out; the engine
    /// treats them as absent.
    async fn cart_lines(&self, user_id: Uuid) -> Result<Vec<CartLine>, ProviderError>;

    /// Empties the cart. Clearing an empty cart succeeds.
    async fn clear_cart(&self, user_id: Uuid) -> Result<(), ProviderError>;
}

/// Discount rules users can claim by id.
#[async_trait]
pub trait DiscountCatalog: Send + Sync {
    /// `None` when no rule has this id.
    async fn discount_by_id(&self, id: &str) -> Result<Option<GeneralSale>, ProviderError>;
}
