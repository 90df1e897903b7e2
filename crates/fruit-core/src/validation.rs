//! # Validation Module
//!
//! Input validation for discount rules and payment card fields.
//!
//! ## Validation Points
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Where Validation Runs                              │
//! │                                                                         │
//! │  Config load ([[sales]])   ──► validate_sale ──► reject at startup      │
//! │  Set personal discount     ──► validate_sale ──► InvalidSale            │
//! │  Checkout payment          ──► card number / cvc / month checks         │
//! │                                                                         │
//! │  Matching never validates: stored payloads with unknown kinds are       │
//! │  skipped by the matcher instead of failing the whole request.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use fruit_core::validation::{validate_card_number, validate_cvc};
//!
//! assert_eq!(validate_card_number("4916-5271-9968-3696").unwrap(), "4916527199683696");
//! assert!(validate_cvc("12").is_err());
//! ```

use crate::error::ValidationError;
use crate::types::GeneralSale;
use crate::MAX_DISCOUNT_PERCENT;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Shortest card number accepted.
const MIN_CARD_DIGITS: usize = 12;

/// Longest card number accepted.
const MAX_CARD_DIGITS: usize = 19;

// =============================================================================
// Sale Validators
// =============================================================================

/// Validates a discount rule before it is accepted into the system.
///
/// ## Rules
/// - `requiredUnits` must not be empty
/// - Every required quantity must be positive
/// - `discountPercent` must be within 0-100
/// - `rule` must be a recognized kind (`more` or `eq`)
///
/// ## Example
/// ```rust
/// use fruit_core::{validation::validate_sale, GeneralSale, RuleKind};
///
/// let ok = GeneralSale::new("", [("Apples", 1)], RuleKind::More, 10);
/// assert!(validate_sale(&ok).is_ok());
///
/// let zero = GeneralSale::new("", [("Apples", 0)], RuleKind::More, 10);
/// assert!(validate_sale(&zero).is_err());
/// ```
pub fn validate_sale(sale: &GeneralSale) -> ValidationResult<()> {
    if sale.required_units.is_empty() {
        return Err(ValidationError::Required {
            field: "requiredUnits".to_string(),
        });
    }

    for (product, &units) in &sale.required_units {
        if product.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "requiredUnits.product".to_string(),
            });
        }
        if units == 0 {
            return Err(ValidationError::MustBePositive {
                field: format!("requiredUnits.{}", product),
            });
        }
    }

    if sale.discount_percent > MAX_DISCOUNT_PERCENT {
        return Err(ValidationError::OutOfRange {
            field: "discountPercent".to_string(),
            min: 0,
            max: i64::from(MAX_DISCOUNT_PERCENT),
        });
    }

    if !sale.rule.is_recognized() {
        return Err(ValidationError::NotAllowed {
            field: "rule".to_string(),
            allowed: vec!["more".to_string(), "eq".to_string()],
        });
    }

    Ok(())
}

// =============================================================================
// Card Validators
// =============================================================================

/// Validates a card number and returns its digits.
///
/// ## Rules
/// - Spaces and dashes are ignored
/// - Only digits otherwise
/// - 12 to 19 digits
/// - Must pass the Luhn checksum
pub fn validate_card_number(number: &str) -> ValidationResult<String> {
    let mut digits = String::with_capacity(number.len());
    for c in number.chars() {
        match c {
            ' ' | '-' => continue,
            '0'..='9' => digits.push(c),
            _ => {
                return Err(ValidationError::InvalidFormat {
                    field: "number".to_string(),
                    reason: "must contain only digits".to_string(),
                })
            }
        }
    }

    if digits.is_empty() {
        return Err(ValidationError::Required {
            field: "number".to_string(),
        });
    }

    if !(MIN_CARD_DIGITS..=MAX_CARD_DIGITS).contains(&digits.len()) {
        return Err(ValidationError::InvalidFormat {
            field: "number".to_string(),
            reason: format!("must have {}-{} digits", MIN_CARD_DIGITS, MAX_CARD_DIGITS),
        });
    }

    if !luhn_valid(&digits) {
        return Err(ValidationError::Checksum);
    }

    Ok(digits)
}

/// Luhn mod-10 checksum over an all-digit string.
///
/// ## Algorithm
/// ```text
/// From the rightmost digit, double every second digit;
/// subtract 9 from any result above 9; the sum must end in 0.
///
///   7 9 9 2 7 3 9 8 7 1 3   ("79927398713")
///   ▲   ▲   ▲   ▲   ▲   ▲   untouched
///     ▲   ▲   ▲   ▲   ▲     doubled
/// ```
///
/// Non-digit input is never valid.
pub fn luhn_valid(digits: &str) -> bool {
    let mut sum = 0u32;
    for (i, c) in digits.chars().rev().enumerate() {
        let Some(mut d) = c.to_digit(10) else {
            return false;
        };
        if i % 2 == 1 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }
    !digits.is_empty() && sum % 10 == 0
}

/// Validates a card verification code (3 or 4 digits).
pub fn validate_cvc(cvc: &str) -> ValidationResult<()> {
    let cvc = cvc.trim();

    if cvc.is_empty() {
        return Err(ValidationError::Required {
            field: "cvc".to_string(),
        });
    }

    if !(3..=4).contains(&cvc.len()) || !cvc.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "cvc".to_string(),
            reason: "must be 3 or 4 digits".to_string(),
        });
    }

    Ok(())
}

/// Validates an expiry month (1-12).
pub fn validate_expiry_month(month: u32) -> ValidationResult<()> {
    if !(1..=12).contains(&month) {
        return Err(ValidationError::OutOfRange {
            field: "expiry.month".to_string(),
            min: 1,
            max: 12,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RuleKind;

    #[test]
    fn test_validate_sale() {
        let sale = GeneralSale::new("", [("Pears", 4), ("Bananas", 2)], RuleKind::Eq, 30);
        assert!(validate_sale(&sale).is_ok());

        let free = GeneralSale::new("", [("Pears", 1)], RuleKind::More, 100);
        assert!(validate_sale(&free).is_ok());
    }

    #[test]
    fn test_validate_sale_rejects_bad_rules() {
        let empty = GeneralSale::new("", Vec::<(String, u32)>::new(), RuleKind::More, 10);
        assert!(matches!(
            validate_sale(&empty),
            Err(ValidationError::Required { .. })
        ));

        let zero = GeneralSale::new("", [("Pears", 0)], RuleKind::Eq, 10);
        assert!(matches!(
            validate_sale(&zero),
            Err(ValidationError::MustBePositive { .. })
        ));

        let over = GeneralSale::new("", [("Pears", 1)], RuleKind::Eq, 101);
        assert!(matches!(
            validate_sale(&over),
            Err(ValidationError::OutOfRange { .. })
        ));

        let unknown = GeneralSale::new(
            "",
            [("Pears", 1)],
            RuleKind::Unrecognized("new".to_string()),
            10,
        );
        assert!(matches!(
            validate_sale(&unknown),
            Err(ValidationError::NotAllowed { .. })
        ));
    }

    #[test]
    fn test_luhn() {
        assert!(luhn_valid("79927398713"));
        assert!(luhn_valid("4916527199683696"));
        assert!(!luhn_valid("79927398710"));
        assert!(!luhn_valid(""));
        assert!(!luhn_valid("7992a398713"));
    }

    #[test]
    fn test_validate_card_number() {
        assert_eq!(
            validate_card_number("4916 5271 9968 3696").unwrap(),
            "4916527199683696"
        );
        assert!(matches!(
            validate_card_number("4916527199683697"),
            Err(ValidationError::Checksum)
        ));
        assert!(matches!(
            validate_card_number("4916x27199683696"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            validate_card_number("42"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            validate_card_number("  "),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_validate_cvc() {
        assert!(validate_cvc("123").is_ok());
        assert!(validate_cvc("1234").is_ok());
        assert!(validate_cvc("12").is_err());
        assert!(validate_cvc("12a").is_err());
        assert!(validate_cvc("").is_err());
    }

    #[test]
    fn test_validate_expiry_month() {
        assert!(validate_expiry_month(1).is_ok());
        assert!(validate_expiry_month(12).is_ok());
        assert!(validate_expiry_month(0).is_err());
        assert!(validate_expiry_month(13).is_err());
    }
}
