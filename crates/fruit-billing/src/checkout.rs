//! # Checkout Service
//!
//! Storefront-facing operations over the cart and the personal discount.
//!
//! ## Checkout Saga
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  checkout(user, card)                                                   │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  validate card ── invalid ──► Format / Validation (nothing changed)     │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  write "<userId>_checkout" ── fails ──► Store (nothing changed)         │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  1. ClearCart ─────── fails ──► CheckoutIncomplete { completed: [] }    │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  2. RemoveDiscount ── fails ──► CheckoutIncomplete { [ClearCart] }      │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  delete "<userId>_checkout"                                             │
//! │                                                                         │
//! │  On a failure the marker records the completed steps. reconcile(user)  │
//! │  runs the remaining ones, and does nothing when there is no marker.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! At most one checkout per user is expected to run at a time.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use fruit_core::{CartLine, GeneralSale, PaymentDetails, TotalInfo};
use serde::{Deserialize, Serialize};
use fruit_cache::KeyValueStore;
use tracing::{debug, info, warn};
use ts_rs::TS;
use uuid::Uuid;

use crate::discount::DiscountManager;
use crate::error::{BillingError, BillingResult};
use crate::provider::{CartProvider, DiscountCatalog};

/// How long an interrupted checkout stays reconcilable.
pub const PENDING_CHECKOUT_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Store key marking a checkout whose payment was accepted but whose steps
/// have not all completed.
pub fn checkout_key(user_id: Uuid) -> String {
    format!("{}_checkout", user_id)
}

/// A post-payment checkout step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckoutStep {
    ClearCart,
    RemoveDiscount,
}

impl CheckoutStep {
    /// Steps in execution order.
    pub const ALL: [CheckoutStep; 2] = [CheckoutStep::ClearCart, CheckoutStep::RemoveDiscount];
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckoutStep::ClearCart => write!(f, "clear_cart"),
            CheckoutStep::RemoveDiscount => write!(f, "remove_discount"),
        }
    }
}

/// Payload stored under [`checkout_key`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct PendingCheckout {
    completed: Vec<CheckoutStep>,
}

/// The cart view returned to the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartSummary {
    /// Cart lines sorted by product name.
    pub lines: Vec<CartLine>,
    pub totals: TotalInfo,
    /// Whether a personal discount was applied.
    pub is_discount_added: bool,
}

/// Cart view, discount claiming and checkout.
#[derive(Clone)]
pub struct CheckoutService {
    discounts: DiscountManager,
    carts: Arc<dyn CartProvider>,
    catalog: Arc<dyn DiscountCatalog>,
    store: Arc<dyn KeyValueStore>,
}

impl CheckoutService {
    pub fn new(
        discounts: DiscountManager,
        carts: Arc<dyn CartProvider>,
        catalog: Arc<dyn DiscountCatalog>,
    ) -> Self {
        let store = discounts.store().clone();
        CheckoutService {
            discounts,
            carts,
            catalog,
            store,
        }
    }

    pub fn discounts(&self) -> &DiscountManager {
        &self.discounts
    }

    /// Cart lines and totals for the user.
    ///
    /// The cart and the personal discount are read concurrently.
    pub async fn cart_summary(&self, user_id: Uuid) -> BillingResult<CartSummary> {
        let (lines, personal) = tokio::join!(
            self.carts.cart_lines(user_id),
            self.discounts.resolve_personal_discount(user_id),
        );
        let mut lines = lines?;
        let personal = personal?;

        lines.sort_by(|a, b| a.name.cmp(&b.name));
        let totals = self.discounts.price(personal.as_ref(), &lines)?;

        Ok(CartSummary {
            lines,
            totals,
            is_discount_added: personal.is_some(),
        })
    }

    /// Claims the catalog discount `discount_id` as the user's personal
    /// discount.
    ///
    /// The final write only succeeds if no discount became active in the
    /// meantime, so concurrent claims cannot both win.
    ///
    /// ## Errors
    /// - `Conflict` when a personal discount is already active
    /// - `NotFound` when no discount has this id
    /// - `InvalidSale` when the catalog entry is not a valid rule
    pub async fn apply_discount(&self, user_id: Uuid, discount_id: &str) -> BillingResult<GeneralSale> {
        match self.discounts.get_personal_discount(user_id).await {
            Ok(active) => {
                return Err(BillingError::Conflict(format!(
                    "user {} already has discount {} active",
                    user_id,
                    active.label()
                )))
            }
            Err(BillingError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }

        let mut sale = self
            .catalog
            .discount_by_id(discount_id)
            .await?
            .ok_or_else(|| BillingError::NotFound(format!("discount {}", discount_id)))?;
        if sale.id.is_empty() {
            sale.id = discount_id.to_string();
        }

        if !self.discounts.claim_personal_discount(user_id, &sale).await? {
            return Err(BillingError::Conflict(format!(
                "user {} claimed another discount concurrently",
                user_id
            )));
        }
        Ok(sale)
    }

    /// Validates the card, then clears the cart and removes the personal
    /// discount.
    ///
    /// ## Errors
    /// - `Format` / `Validation` for bad card details (nothing changed)
    /// - `Store` if the pending-checkout marker cannot be written (nothing changed)
    /// - `CheckoutIncomplete` if a step failed after the card was accepted
    pub async fn checkout(&self, user_id: Uuid, payment: &PaymentDetails) -> BillingResult<()> {
        self.discounts.validate_payment(payment)?;

        let pending = PendingCheckout::default();
        self.write_pending(user_id, &pending).await?;
        info!(user_id = %user_id, "Payment details accepted");

        self.run_steps(user_id, pending).await?;
        info!(user_id = %user_id, "Checkout complete");
        Ok(())
    }

    /// Finishes an interrupted checkout.
    ///
    /// Returns `false` without touching anything when the user has no
    /// pending checkout.
    pub async fn reconcile(&self, user_id: Uuid) -> BillingResult<bool> {
        let Some(pending) = self.pending_checkout(user_id).await? else {
            debug!(user_id = %user_id, "No pending checkout to reconcile");
            return Ok(false);
        };

        self.run_steps(user_id, pending).await?;
        info!(user_id = %user_id, "Checkout reconciled");
        Ok(true)
    }

    async fn pending_checkout(&self, user_id: Uuid) -> BillingResult<Option<PendingCheckout>> {
        let key = checkout_key(user_id);
        match self.store.get(&key).await {
            Ok(payload) => serde_json::from_str(&payload)
                .map(Some)
                .map_err(|source| BillingError::Decode { key, source }),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(BillingError::Store(e)),
        }
    }

    async fn write_pending(&self, user_id: Uuid, pending: &PendingCheckout) -> BillingResult<()> {
        let payload = serde_json::to_string(pending).map_err(BillingError::Encode)?;
        self.store
            .set(&checkout_key(user_id), &payload, PENDING_CHECKOUT_TTL)
            .await?;
        Ok(())
    }

    /// Runs the steps not yet in `pending.completed`, then drops the marker.
    async fn run_steps(&self, user_id: Uuid, pending: PendingCheckout) -> BillingResult<()> {
        let mut progress = pending;

        for step in CheckoutStep::ALL {
            if progress.completed.contains(&step) {
                continue;
            }
            if let Err(source) = self.run_step(user_id, step).await {
                warn!(user_id = %user_id, step = %step, error = %source, "Checkout step failed");
                if let Err(e) = self.write_pending(user_id, &progress).await {
                    warn!(user_id = %user_id, error = %e, "Could not record checkout progress");
                }
                return Err(BillingError::CheckoutIncomplete {
                    user_id,
                    completed: progress.completed,
                    source: Box::new(source),
                });
            }
            progress.completed.push(step);
        }

        if let Err(e) = self.store.delete(&checkout_key(user_id)).await {
            warn!(user_id = %user_id, error = %e, "Could not clear pending checkout");
            return Err(BillingError::CheckoutIncomplete {
                user_id,
                completed: progress.completed,
                source: Box::new(BillingError::Store(e)),
            });
        }
        Ok(())
    }

    async fn run_step(&self, user_id: Uuid, step: CheckoutStep) -> BillingResult<()> {
        match step {
            CheckoutStep::ClearCart => Ok(self.carts.clear_cart(user_id).await?),
            CheckoutStep::RemoveDiscount => self.discounts.remove_personal_discount(user_id).await,
        }
    }
}
