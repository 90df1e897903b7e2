//! # fruit-billing: Discount Lifecycle and Checkout
//!
//! Connects the pure pricing engine (`fruit-core`) to the key-value store
//! (`fruit-cache`) and to the relational collaborators behind
//! [`provider::CartProvider`] and [`provider::DiscountCatalog`].
//!
//! ## Module Organization
//!
//! - [`discount`] - [`DiscountManager`]: personal discount get/set/remove, totals
//! - [`checkout`] - [`CheckoutService`]: cart summary, claim discount, checkout saga
//! - [`provider`] - Collaborator contracts
//! - [`config`] - TOML + environment configuration
//! - [`logging`] - Tracing subscriber bootstrap
//! - [`error`] - Billing error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fruit_billing::{BillingConfig, DiscountManager, SalesCatalog};
//! use fruit_cache::RedisStore;
//!
//! let config = BillingConfig::load(None)?;
//! let store = Arc::new(RedisStore::connect(&config.redis.url).await?);
//! let catalog = SalesCatalog::new(config.sales.clone())?;
//! let discounts = DiscountManager::new(store, catalog, &config.discount);
//!
//! let totals = discounts.compute_total(user_id, &cart_lines).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod config;
pub mod discount;
pub mod error;
pub mod logging;
pub mod provider;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::{checkout_key, CartSummary, CheckoutService, CheckoutStep, PENDING_CHECKOUT_TTL};
pub use config::{BillingConfig, ConfigError, DiscountLookupPolicy};
pub use discount::{discount_key, DiscountManager, SalesCatalog};
pub use error::{BillingError, BillingResult};
pub use provider::{CartProvider, DiscountCatalog, ProviderError};
