//! # Domain Types
//!
//! Core domain types used by the pricing engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    CartLine     │   │   GeneralSale   │   │ RuleApplication │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  name           │   │  id             │   │  product_name   │       │
//! │  │  unit_price     │   │  required_units │   │  unit_price     │       │
//! │  │  quantity       │   │  rule (kind)    │   │  quantity       │       │
//! │  └─────────────────┘   │  discount_pct   │   │  discount_pct   │       │
//! │         input          └─────────────────┘   └─────────────────┘       │
//! │                              rules               per request            │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                              │
//! │  │    TotalInfo    │   │ PaymentDetails  │                              │
//! │  │  total_price    │   │  card_number    │                              │
//! │  │  total_savings  │   │  expiry (MM/YY) │                              │
//! │  │  total_quantity │   │  cvc            │                              │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Cart Line
// =============================================================================

/// One product in a user's cart at pricing time.
///
/// Produced by the cart provider for every request; the engine never
/// persists it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    /// Product name, the key discount rules refer to.
    pub name: String,

    /// Price of a single unit.
    pub unit_price: Money,

    /// Units held in the cart.
    pub quantity: u32,
}

impl CartLine {
    /// Creates a cart line.
    pub fn new(name: impl Into<String>, unit_price: Money, quantity: u32) -> Self {
        CartLine {
            name: name.into(),
            unit_price,
            quantity,
        }
    }
}

// =============================================================================
// Rule Kind
// =============================================================================

/// How a matched rule decides the discounted quantity.
///
/// ## Matching Semantics
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Rule: { Pears: 4 }   Cart: Pears × 10                                  │
/// │                                                                         │
/// │  MORE  → threshold met, ALL 10 pears discounted                         │
/// │  EQ    → floor(10/4) = 2 bundles, 8 pears discounted, 2 at full price  │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
///
/// Serialized as the plain strings `"more"` and `"eq"`. Any other string
/// deserializes to [`RuleKind::Unrecognized`] so a stored payload written by
/// a newer version still decodes; configuration loading rejects it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleKind {
    /// Discount the whole held quantity once the threshold is met.
    More,
    /// Discount exact multiples of the required bundle only.
    Eq,
    /// A rule kind this version does not know. Matches nothing.
    Unrecognized(String),
}

impl RuleKind {
    /// Returns the wire token for this kind.
    pub fn as_str(&self) -> &str {
        match self {
            RuleKind::More => "more",
            RuleKind::Eq => "eq",
            RuleKind::Unrecognized(other) => other,
        }
    }

    /// Returns true for the kinds the matcher knows how to apply.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, RuleKind::Unrecognized(_))
    }
}

impl From<String> for RuleKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "more" => RuleKind::More,
            "eq" => RuleKind::Eq,
            _ => RuleKind::Unrecognized(value),
        }
    }
}

impl From<RuleKind> for String {
    fn from(kind: RuleKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// General Sale
// =============================================================================

/// A promotional discount rule, store-wide or personal.
///
/// ## Example (JSON, as stored for a personal discount)
/// ```json
/// {
///   "id": "SPRING10",
///   "requiredUnits": { "Pears": 4, "Bananas": 2 },
///   "rule": "eq",
///   "discountPercent": 30
/// }
/// ```
///
/// `required_units` is a `BTreeMap` so the products of a rule are always
/// visited in the same order and results are reproducible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct GeneralSale {
    /// Rule identifier. Empty for store-wide rules.
    #[serde(default)]
    pub id: String,

    /// Units of each product needed for one application of the rule.
    pub required_units: BTreeMap<String, u32>,

    /// Matching behavior.
    #[ts(type = "string")]
    pub rule: RuleKind,

    /// Percentage taken off the matched units (0-100).
    pub discount_percent: u8,
}

impl GeneralSale {
    /// Creates a rule from `(product, units)` pairs.
    ///
    /// ## Example
    /// ```rust
    /// use fruit_core::{GeneralSale, RuleKind};
    ///
    /// let sale = GeneralSale::new("", [("Apples", 9)], RuleKind::More, 10);
    /// assert!(sale.is_store_wide());
    /// ```
    pub fn new<I, N>(id: impl Into<String>, required_units: I, rule: RuleKind, discount_percent: u8) -> Self
    where
        I: IntoIterator<Item = (N, u32)>,
        N: Into<String>,
    {
        GeneralSale {
            id: id.into(),
            required_units: required_units
                .into_iter()
                .map(|(name, units)| (name.into(), units))
                .collect(),
            rule,
            discount_percent,
        }
    }

    /// Store-wide rules carry no identifier.
    pub fn is_store_wide(&self) -> bool {
        self.id.is_empty()
    }

    /// Name used in log lines and error messages.
    pub fn label(&self) -> &str {
        if self.id.is_empty() {
            "<store-wide>"
        } else {
            &self.id
        }
    }
}

// =============================================================================
// Rule Application
// =============================================================================

/// Units of one product discounted by one rule.
///
/// One entry per (rule, product) pair that actually matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RuleApplication {
    pub product_name: String,
    pub unit_price: Money,
    pub quantity_at_discount: u32,
    pub discount_percent: u8,
}

// =============================================================================
// Total Info
// =============================================================================

/// The pricing summary returned to the storefront.
///
/// All fields are pre-formatted strings: money with exactly two fractional
/// digits, quantity as a base-10 integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TotalInfo {
    /// What the user pays, e.g. `"42.00"`.
    pub total_price: String,
    /// Baseline minus what the user pays, e.g. `"18.00"`.
    pub total_savings: String,
    /// Units in the cart, e.g. `"6"`.
    pub total_quantity: String,
}

impl TotalInfo {
    /// Summary of an empty cart.
    pub fn empty() -> Self {
        TotalInfo {
            total_price: Money::zero().to_string(),
            total_savings: Money::zero().to_string(),
            total_quantity: "0".to_string(),
        }
    }
}

// =============================================================================
// Payment Details
// =============================================================================

/// Card details submitted at checkout.
///
/// Only structurally validated; no money moves.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentDetails {
    /// Card number, spaces and dashes allowed.
    #[serde(rename = "number")]
    pub card_number: String,

    /// Expiry as `MM/YY`.
    pub expiry: String,

    /// Card holder name.
    #[serde(default)]
    pub name: String,

    /// Card verification code.
    pub cvc: String,
}

/// Card numbers and CVCs never reach log output.
impl fmt::Debug for PaymentDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits: String = self.card_number.chars().filter(char::is_ascii_digit).collect();
        let last4 = digits.get(digits.len().saturating_sub(4)..).unwrap_or("");
        f.debug_struct("PaymentDetails")
            .field("card_number", &format_args!("****{}", last4))
            .field("expiry", &self.expiry)
            .field("name", &self.name)
            .field("cvc", &"***")
            .finish()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
