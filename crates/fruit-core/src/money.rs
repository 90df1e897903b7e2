//! # Money Module
//!
//! Provides the `Money` type for catalog prices and the `PreciseMoney`
//! accumulator used while pricing a cart.
//!
//! ## Why Two Types?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In float32 arithmetic:                                                 │
//! │    3 × 0.33 × 0.7 = 0.69299996  ❌ drift on every multiplication        │
//! │                                                                         │
//! │  A percentage discount on whole cents is NOT whole cents:              │
//! │    33 cents × 70% = 23.1 cents                                          │
//! │                                                                         │
//! │  OUR SOLUTION: Fixed Point                                              │
//! │    Money         = integer cents (catalog prices, final results)        │
//! │    PreciseMoney  = integer hundredths of a cent                         │
//! │    33 × (100 - 30) = 2310 hundredths of a cent, exact                   │
//! │    Rounding to cents happens ONCE, when the summary is rendered        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use fruit_core::money::{Money, PreciseMoney};
//!
//! let price = Money::from_cents(1099); // 10.99
//! let line = price.discounted_total(3, 30); // 3 units at 30% off
//! assert_eq!(line.round_to_cents(), Money::from_cents(2308)); // 23.079 → 23.08
//! assert_eq!(PreciseMoney::from(price).round_to_cents(), price);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul, Sub};
use ts_rs::TS;

/// Number of `PreciseMoney` units in one cent.
///
/// Percentages are whole numbers, so one cent split into a hundred parts
/// represents any `cents × quantity × percent / 100` exactly.
const PRECISION_PER_CENT: i128 = 100;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in cents.
///
/// ## Design Decisions
/// - **i64 (signed)**: savings can be negative in the arithmetic, even if the
///   engine never produces a negative result for valid rules
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Serialized as cents**: `{"unitPrice": 150}` means 1.50
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  CartLine.unit_price ──► Inventory ──► RuleApplication.unit_price       │
/// │                                │                                        │
/// │                                ▼                                        │
/// │                     PreciseMoney (accumulation)                         │
/// │                                │                                        │
/// │                                ▼                                        │
/// │                TotalInfo.total_price = "42.00"                          │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use fruit_core::money::Money;
    ///
    /// let price = Money::from_cents(150); // 1.50
    /// assert_eq!(price.cents(), 150);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies the unit price by a quantity, exactly.
    ///
    /// ## Example
    /// ```rust
    /// use fruit_core::money::Money;
    ///
    /// let line = Money::from_cents(299).line_total(3);
    /// assert_eq!(line.round_to_cents().cents(), 897);
    /// ```
    #[inline]
    pub fn line_total(&self, quantity: u32) -> PreciseMoney {
        PreciseMoney::from(*self) * quantity
    }

    /// Prices `quantity` units after a whole-percent discount.
    ///
    /// `quantity × price × (100 - percent) / 100`, kept in hundredths of a
    /// cent so nothing is rounded here. Percentages above 100 are clamped to
    /// 100 (free), never to a negative line.
    ///
    /// ## Example
    /// ```rust
    /// use fruit_core::money::Money;
    ///
    /// // 4 × 10.00 at 30% off = 28.00
    /// let line = Money::from_cents(1000).discounted_total(4, 30);
    /// assert_eq!(line.round_to_cents().cents(), 2800);
    /// ```
    pub fn discounted_total(&self, quantity: u32, discount_percent: u8) -> PreciseMoney {
        let payable_percent = 100 - i128::from(discount_percent.min(100));
        PreciseMoney(i128::from(self.0) * i128::from(quantity) * payable_percent)
    }
}

/// Renders the amount with exactly two fractional digits, e.g. `90.00`.
///
/// ## Note
/// No currency symbol: the store is single-currency and the storefront
/// decides how to present it.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

// =============================================================================
// PreciseMoney Type
// =============================================================================

/// Fixed-point amount in hundredths of a cent.
///
/// Only produced by pricing arithmetic; convert back with
/// [`PreciseMoney::round_to_cents`] at the very end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PreciseMoney(i128);

impl PreciseMoney {
    /// Zero amount.
    #[inline]
    pub const fn zero() -> Self {
        PreciseMoney(0)
    }

    /// Raw value in hundredths of a cent.
    #[inline]
    pub const fn raw(&self) -> i128 {
        self.0
    }

    /// Rounds to whole cents, half away from zero.
    ///
    /// ## Example
    /// ```rust
    /// use fruit_core::money::Money;
    ///
    /// // 0.5 cent rounds up, -0.5 cent rounds down
    /// assert_eq!(Money::from_cents(1).discounted_total(1, 50).round_to_cents().cents(), 1);
    /// ```
    pub fn round_to_cents(&self) -> Money {
        let half = PRECISION_PER_CENT / 2;
        let rounded = if self.0 >= 0 {
            (self.0 + half) / PRECISION_PER_CENT
        } else {
            (self.0 - half) / PRECISION_PER_CENT
        };
        Money::from_cents(rounded as i64)
    }
}

impl From<Money> for PreciseMoney {
    fn from(money: Money) -> Self {
        PreciseMoney(i128::from(money.cents()) * PRECISION_PER_CENT)
    }
}

/// Displays the value rounded to cents.
impl fmt::Display for PreciseMoney {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.round_to_cents().fmt(f)
    }
}

impl Add for PreciseMoney {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        PreciseMoney(self.0 + other.0)
    }
}

impl Mul<u32> for PreciseMoney {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        PreciseMoney(self.0 * i128::from(qty))
    }
}

impl Sum for PreciseMoney {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(PreciseMoney::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
