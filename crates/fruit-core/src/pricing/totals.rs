//! Total calculator: folds matched and leftover stock into a summary.

use super::Inventory;
use crate::money::{Money, PreciseMoney};
use crate::types::{RuleApplication, TotalInfo};

/// Unrounded cart totals.
///
/// ## Formula
/// ```text
/// discounted = Σ qty × price × (100 - pct) / 100     (applications)
/// full       = Σ qty × price                         (remaining stock)
/// price      = discounted + full
/// savings    = baseline - round(price)
/// quantity   = Σ discounted qty + Σ remaining qty
/// ```
///
/// Savings are taken from the rounded price so the two rendered figures
/// always add up to the baseline. At an exact half-cent price this differs
/// from rounding `baseline - price` on its own: 0.045 renders as price
/// "0.05" with savings "0.00", not "0.01".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub price: PreciseMoney,
    pub baseline: Money,
    pub quantity: u64,
}

impl Totals {
    pub fn calculate(applications: &[RuleApplication], remaining: &Inventory, baseline: PreciseMoney) -> Self {
        let discounted: PreciseMoney = applications
            .iter()
            .map(|app| {
                app.unit_price
                    .discounted_total(app.quantity_at_discount, app.discount_percent)
            })
            .sum();
        let discounted_quantity: u64 = applications
            .iter()
            .map(|app| u64::from(app.quantity_at_discount))
            .sum();

        Totals {
            price: discounted + remaining.full_price(),
            baseline: baseline.round_to_cents(),
            quantity: discounted_quantity + remaining.total_quantity(),
        }
    }

    /// What the user pays, rounded to cents.
    pub fn payable(&self) -> Money {
        self.price.round_to_cents()
    }

    pub fn savings(&self) -> Money {
        self.baseline - self.payable()
    }

    /// Renders the storefront summary.
    pub fn to_info(&self) -> TotalInfo {
        TotalInfo {
            total_price: self.payable().to_string(),
            total_savings: self.savings().to_string(),
            total_quantity: self.quantity.to_string(),
        }
    }
}
