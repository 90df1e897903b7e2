//! # Discount Lifecycle Manager
//!
//! Owns the personal discount of each user and prices carts with it.
//!
//! ## Personal Discount State Machine (per user)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │            set_personal_discount                                        │
//! │   ┌──────┐ ─────────────────────────►  ┌────────┐                       │
//! │   │ NONE │                             │ ACTIVE │                       │
//! │   └──────┘ ◄─────────────────────────  └────────┘                       │
//! │             remove / TTL expiry / checkout                              │
//! │                                                                         │
//! │  Stored as "<userId>_discount" → JSON GeneralSale, with TTL.            │
//! │  claim_personal_discount only moves NONE → ACTIVE (atomic SET NX).      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Pricing
//! ```text
//! compute_total(user, cart)
//!     │
//!     ├─► get "<user>_discount" ── NotFound ──► no personal rule
//!     │                        └─ failure ───► lookup policy (fail | degrade)
//!     ▼
//! [personal?] ++ store-wide sales ──► fruit_core::pricing ──► TotalInfo
//! ```

use std::sync::Arc;
use std::time::Duration;

use fruit_cache::KeyValueStore;
use fruit_core::payment::{validate_payment_now, CardExpiry};
use fruit_core::validation::validate_sale;
use fruit_core::{pricing, CartLine, CoreError, GeneralSale, PaymentDetails, TotalInfo};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::config::{DiscountLookupPolicy, DiscountSettings};
use crate::error::{BillingError, BillingResult};

/// Store key holding a user's personal discount.
pub fn discount_key(user_id: Uuid) -> String {
    format!("{}_discount", user_id)
}

// =============================================================================
// Sales Catalog
// =============================================================================

/// The store-wide sales, validated once and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct SalesCatalog {
    sales: Arc<[GeneralSale]>,
}

impl SalesCatalog {
    /// Validates every sale, keeping their order.
    pub fn new(sales: Vec<GeneralSale>) -> Result<Self, CoreError> {
        for sale in &sales {
            validate_sale(sale).map_err(|source| CoreError::InvalidSale {
                sale: sale.label().to_string(),
                source,
            })?;
        }
        Ok(SalesCatalog {
            sales: sales.into(),
        })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GeneralSale> {
        self.sales.iter()
    }

    pub fn len(&self) -> usize {
        self.sales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sales.is_empty()
    }
}

// =============================================================================
// Discount Manager
// =============================================================================

/// Personal discount lifecycle plus cart pricing.
///
/// Cheap to clone; clones share the store and the catalog.
#[derive(Clone)]
pub struct DiscountManager {
    store: Arc<dyn KeyValueStore>,
    catalog: SalesCatalog,
    ttl: Duration,
    lookup_policy: DiscountLookupPolicy,
}

impl DiscountManager {
    pub fn new(store: Arc<dyn KeyValueStore>, catalog: SalesCatalog, settings: &DiscountSettings) -> Self {
        DiscountManager {
            store,
            catalog,
            ttl: settings.ttl(),
            lookup_policy: settings.lookup_policy,
        }
    }

    /// The store holding personal discounts.
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    pub fn catalog(&self) -> &SalesCatalog {
        &self.catalog
    }

    pub fn lookup_policy(&self) -> DiscountLookupPolicy {
        self.lookup_policy
    }

    // =========================================================================
    // Pricing
    // =========================================================================

    /// Prices a cart with the user's personal discount (if any) followed by
    /// the store-wide sales. Never mutates state.
    pub async fn compute_total(&self, user_id: Uuid, lines: &[CartLine]) -> BillingResult<TotalInfo> {
        let personal = self.resolve_personal_discount(user_id).await?;
        self.price(personal.as_ref(), lines)
    }

    /// Reads the personal discount for pricing.
    ///
    /// `Ok(None)` when the user has none, or when the read failed under
    /// [`DiscountLookupPolicy::Degrade`].
    pub async fn resolve_personal_discount(&self, user_id: Uuid) -> BillingResult<Option<GeneralSale>> {
        match self.get_personal_discount(user_id).await {
            Ok(sale) => Ok(Some(sale)),
            Err(BillingError::NotFound(_)) => Ok(None),
            Err(e) => match self.lookup_policy {
                DiscountLookupPolicy::Fail => Err(e),
                DiscountLookupPolicy::Degrade => {
                    error!(user_id = %user_id, error = %e, "Personal discount lookup failed, pricing without it");
                    Ok(None)
                }
            },
        }
    }

    /// Pure pricing step: `[personal?] ++ store-wide`.
    pub fn price(&self, personal: Option<&GeneralSale>, lines: &[CartLine]) -> BillingResult<TotalInfo> {
        let rules = personal.into_iter().chain(self.catalog.iter());
        let info = pricing::price_cart(rules, lines)?;
        debug!(
            total_price = %info.total_price,
            total_savings = %info.total_savings,
            total_quantity = %info.total_quantity,
            "Cart priced"
        );
        Ok(info)
    }

    // =========================================================================
    // Personal Discount
    // =========================================================================

    /// The user's active personal discount.
    ///
    /// ## Errors
    /// - `NotFound` when none is set (or it expired)
    /// - `Store` when the store fails
    /// - `Decode` when the stored payload is malformed
    pub async fn get_personal_discount(&self, user_id: Uuid) -> BillingResult<GeneralSale> {
        let key = discount_key(user_id);
        let payload = self.store.get(&key).await?;
        serde_json::from_str(&payload).map_err(|source| BillingError::Decode { key, source })
    }

    /// Stores `sale` as the user's personal discount with the configured TTL.
    ///
    /// Overwrites whatever is stored; callers enforce NONE → ACTIVE.
    pub async fn set_personal_discount(&self, user_id: Uuid, sale: &GeneralSale) -> BillingResult<()> {
        let payload = encode_sale(sale)?;
        self.store.set(&discount_key(user_id), &payload, self.ttl).await?;

        info!(
            user_id = %user_id,
            discount_id = %sale.label(),
            ttl_secs = self.ttl.as_secs(),
            "Personal discount activated"
        );
        Ok(())
    }

    /// Stores `sale` only if the user has no active personal discount.
    ///
    /// Returns `false`, leaving the active one untouched, when one exists.
    pub async fn claim_personal_discount(&self, user_id: Uuid, sale: &GeneralSale) -> BillingResult<bool> {
        let payload = encode_sale(sale)?;
        let claimed = self
            .store
            .set_if_absent(&discount_key(user_id), &payload, self.ttl)
            .await?;

        if claimed {
            info!(
                user_id = %user_id,
                discount_id = %sale.label(),
                ttl_secs = self.ttl.as_secs(),
                "Personal discount claimed"
            );
        } else {
            debug!(user_id = %user_id, discount_id = %sale.label(), "Personal discount already active");
        }
        Ok(claimed)
    }

    /// Removes the personal discount. Succeeds when there is none.
    pub async fn remove_personal_discount(&self, user_id: Uuid) -> BillingResult<()> {
        match self.store.delete(&discount_key(user_id)).await {
            Ok(true) => {
                info!(user_id = %user_id, "Personal discount removed");
                Ok(())
            }
            Ok(false) => {
                debug!(user_id = %user_id, "No personal discount to remove");
                Ok(())
            }
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(BillingError::Store(e)),
        }
    }

    // =========================================================================
    // Payment
    // =========================================================================

    /// Structural card check against today's date.
    ///
    /// ## Errors
    /// - `Format` when the expiry is not `MM/YY`
    /// - `Validation` for a bad number, CVC or an expired card
    pub fn validate_payment(&self, details: &PaymentDetails) -> BillingResult<CardExpiry> {
        Ok(validate_payment_now(details)?)
    }
}

/// Validates a sale and serializes it for the store.
fn encode_sale(sale: &GeneralSale) -> BillingResult<String> {
    validate_sale(sale).map_err(|source| BillingError::InvalidSale {
        sale: sale.label().to_string(),
        source,
    })?;
    serde_json::to_string(sale).map_err(BillingError::Encode)
}
