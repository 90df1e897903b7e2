//! # Pricing Engine
//!
//! Turns a cart snapshot and an ordered rule list into a [`TotalInfo`].
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Vec<CartLine> ──► Inventory::from_lines ──► baseline (full price)      │
//! │                          │                                              │
//! │                          ▼                                              │
//! │  [personal?, store-wide...] ──► matcher::apply_rules                    │
//! │                          │                                              │
//! │              ┌───────────┴───────────┐                                  │
//! │              ▼                       ▼                                  │
//! │     Vec<RuleApplication>     remaining Inventory                        │
//! │              └───────────┬───────────┘                                  │
//! │                          ▼                                              │
//! │                 totals::Totals::calculate ──► TotalInfo                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Known Limitation
//! Matching is greedy and single pass. A rule consumes stock as soon as it
//! is evaluated, so an earlier, smaller discount can starve a later, bigger
//! one. There is no search for the cheapest combination.
//!
//! ## Example
//! ```rust
//! use fruit_core::{pricing, CartLine, GeneralSale, Money, RuleKind};
//!
//! let cart = vec![CartLine::new("Apples", Money::from_cents(10000), 1)];
//! let rules = vec![GeneralSale::new("", [("Apples", 1)], RuleKind::More, 10)];
//!
//! let info = pricing::price_cart(&rules, &cart).unwrap();
//! assert_eq!(info.total_price, "90.00");
//! assert_eq!(info.total_savings, "10.00");
//! assert_eq!(info.total_quantity, "1");
//! ```

pub mod matcher;
pub mod totals;

use std::collections::btree_map::{self, BTreeMap, Entry};

use crate::error::{CoreError, CoreResult};
use crate::money::{Money, PreciseMoney};
use crate::types::{CartLine, GeneralSale, RuleApplication, TotalInfo};

pub use matcher::{apply_rules, MatchOutcome};
pub use totals::Totals;

// =============================================================================
// Inventory
// =============================================================================

/// Price and not-yet-discounted units of one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockEntry {
    pub unit_price: Money,
    pub quantity: u32,
}

/// Product name → stock, the pool the matcher consumes from.
///
/// Ordered by name so iteration (and therefore logging and results) is
/// the same on every run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    entries: BTreeMap<String, StockEntry>,
}

impl Inventory {
    /// Builds the pool from cart lines.
    ///
    /// Lines for the same product are merged when their prices agree.
    ///
    /// ## Errors
    /// [`CoreError::ConflictingPrice`] if one product is listed at two prices.
    pub fn from_lines(lines: &[CartLine]) -> CoreResult<Self> {
        let mut entries: BTreeMap<String, StockEntry> = BTreeMap::new();

        for line in lines {
            match entries.entry(line.name.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(StockEntry {
                        unit_price: line.unit_price,
                        quantity: line.quantity,
                    });
                }
                Entry::Occupied(mut slot) => {
                    let existing = slot.get_mut();
                    if existing.unit_price != line.unit_price {
                        return Err(CoreError::ConflictingPrice {
                            product: line.name.clone(),
                            first: existing.unit_price,
                            second: line.unit_price,
                        });
                    }
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                }
            }
        }

        Ok(Inventory { entries })
    }

    pub fn get(&self, product: &str) -> Option<&StockEntry> {
        self.entries.get(product)
    }

    pub(crate) fn get_mut(&mut self, product: &str) -> Option<&mut StockEntry> {
        self.entries.get_mut(product)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, StockEntry> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Units still in the pool.
    pub fn total_quantity(&self) -> u64 {
        self.entries.values().map(|e| u64::from(e.quantity)).sum()
    }

    /// Full price of everything still in the pool.
    ///
    /// Called before matching, this is the baseline savings are measured
    /// against.
    pub fn full_price(&self) -> PreciseMoney {
        self.entries
            .values()
            .map(|e| e.unit_price.line_total(e.quantity))
            .sum()
    }
}

// =============================================================================
// Entry Points
// =============================================================================

/// Everything computed for one cart: what matched and the resulting totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartQuote {
    pub applications: Vec<RuleApplication>,
    pub remaining: Inventory,
    pub totals: Totals,
}

/// Runs the matcher and the calculator over a cart.
///
/// `rules` are evaluated in order; callers put the personal discount first.
pub fn evaluate<'a, I>(rules: I, lines: &[CartLine]) -> CoreResult<CartQuote>
where
    I: IntoIterator<Item = &'a GeneralSale>,
{
    let inventory = Inventory::from_lines(lines)?;
    let baseline = inventory.full_price();

    let MatchOutcome {
        applications,
        remaining,
    } = apply_rules(rules, inventory);
    let totals = Totals::calculate(&applications, &remaining, baseline);

    Ok(CartQuote {
        applications,
        remaining,
        totals,
    })
}

/// Prices a cart and renders the summary.
pub fn price_cart<'a, I>(rules: I, lines: &[CartLine]) -> CoreResult<TotalInfo>
where
    I: IntoIterator<Item = &'a GeneralSale>,
{
    evaluate(rules, lines).map(|quote| quote.totals.to_info())
}

// =============================================================================
// Unit Tests
// =============================================================================
