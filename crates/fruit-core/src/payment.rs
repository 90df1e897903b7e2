//! # Payment Check
//!
//! Structural validation of card details at checkout. Nothing is charged.
//!
//! ```text
//! PaymentDetails ──► parse_expiry("MM/YY") ──► CardExpiry { month, 20YY }
//!                │           │
//!                │           └── ExpiryFormat on unparsable input
//!                ├─► validate_card_number (digits, length, Luhn)
//!                ├─► validate_cvc
//!                └─► not expired relative to `today`
//! ```
//!
//! The current date is a parameter so the check stays deterministic;
//! [`validate_payment_now`] supplies the local date.

use chrono::{Datelike, Local, NaiveDate};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::PaymentDetails;
use crate::validation::{validate_card_number, validate_cvc, validate_expiry_month};

/// A parsed card expiry. The card is valid through the end of this month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CardExpiry {
    pub year: i32,
    pub month: u32,
}

impl CardExpiry {
    /// Whether the card can still be used on `today`.
    pub fn is_valid_on(&self, today: NaiveDate) -> bool {
        (self.year, self.month) >= (today.year(), today.month())
    }
}

/// Parses `MM/YY` into a month and a four digit year (`20YY`).
///
/// ## Example
/// ```rust
/// use fruit_core::payment::parse_expiry;
///
/// let expiry = parse_expiry("11/27").unwrap();
/// assert_eq!((expiry.month, expiry.year), (11, 2027));
/// assert!(parse_expiry("1127").is_err());
/// ```
pub fn parse_expiry(raw: &str) -> CoreResult<CardExpiry> {
    let format_error = || CoreError::ExpiryFormat(raw.to_string());

    let (month, year) = raw.trim().split_once('/').ok_or_else(format_error)?;
    let month = month.trim();
    let year = year.trim();

    if month.is_empty() || month.len() > 2 || year.len() != 2 {
        return Err(format_error());
    }
    let month: u32 = month.parse().map_err(|_| format_error())?;
    let year: i32 = year.parse().map_err(|_| format_error())?;

    validate_expiry_month(month)?;

    Ok(CardExpiry {
        year: 2000 + year,
        month,
    })
}

/// Validates card details against the given date.
///
/// ## Errors
/// - [`CoreError::ExpiryFormat`] when the expiry cannot be parsed
/// - [`CoreError::Validation`] for a bad number, CVC, month or an expired card
pub fn validate_payment(details: &PaymentDetails, today: NaiveDate) -> CoreResult<CardExpiry> {
    let expiry = parse_expiry(&details.expiry)?;
    validate_card_number(&details.card_number)?;
    validate_cvc(&details.cvc)?;

    if !expiry.is_valid_on(today) {
        return Err(ValidationError::Expired {
            month: expiry.month,
            year: expiry.year,
        }
        .into());
    }

    Ok(expiry)
}

/// [`validate_payment`] against the local calendar date.
pub fn validate_payment_now(details: &PaymentDetails) -> CoreResult<CardExpiry> {
    validate_payment(details, Local::now().date_naive())
}

// =============================================================================
// Unit Tests
// =============================================================================
