//! # fruit-core: Pure Pricing Engine for the Fruit Store
//!
//! This crate is the **heart** of the fruit store backend. It prices a cart
//! against promotional discount rules as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Fruit Store Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │             HTTP layer, SQL, tokens (outside this repo)          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ CartProvider / DiscountCatalog         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │      fruit-billing: DiscountManager, CheckoutService            │   │
//! │  └──────────────┬──────────────────────────────┬───────────────────┘   │
//! │                 │                              │                        │
//! │  ┌──────────────▼──────────────────┐  ┌────────▼──────────────────┐    │
//! │  │    ★ fruit-core (THIS CRATE) ★  │  │  fruit-cache              │    │
//! │  │                                 │  │  Redis / in-memory store  │    │
//! │  │  money · types · pricing        │  │  "<user>_discount" keys   │    │
//! │  │  validation · payment           │  └───────────────────────────┘    │
//! │  │                                 │                                   │
//! │  │  NO I/O • PURE FUNCTIONS        │                                   │
//! │  └─────────────────────────────────┘                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (CartLine, GeneralSale, TotalInfo, ...)
//! - [`money`] - Integer cents and the fixed-point accumulator
//! - [`pricing`] - Rule matcher and total calculator
//! - [`validation`] - Rule and card field checks
//! - [`payment`] - Checkout card validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use fruit_core::{pricing, CartLine, GeneralSale, Money, RuleKind};
//!
//! let cart = vec![
//!     CartLine::new("Pears", Money::from_cents(1000), 4),
//!     CartLine::new("Bananas", Money::from_cents(1000), 2),
//! ];
//! let rules = vec![GeneralSale::new("", [("Pears", 4), ("Bananas", 2)], RuleKind::Eq, 30)];
//!
//! let info = pricing::price_cart(&rules, &cart).unwrap();
//! assert_eq!(info.total_price, "42.00");
//! assert_eq!(info.total_savings, "18.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod payment;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, PreciseMoney};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Highest discount a rule may grant (free).
pub const MAX_DISCOUNT_PERCENT: u8 = 100;
