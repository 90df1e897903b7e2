//! Rule matcher: decides which rules apply and consumes stock for them.
//!
//! ```text
//! Rule { Pears: 4, Bananas: 2 }   Inventory { Pears: 9, Bananas: 5 }
//!
//!   multiples: Pears 9/4 = 2, Bananas 5/2 = 2   → count = min = 2
//!   eq   → consume Pears 8, Bananas 4           (left: Pears 1, Bananas 1)
//!   more → consume Pears 9, Bananas 5           (left: nothing)
//! ```
//!
//! A rule that names a product missing from the inventory, or whose count
//! is zero, is skipped without consuming anything.

use tracing::{debug, warn};

use super::Inventory;
use crate::types::{GeneralSale, RuleApplication, RuleKind};

/// Result of running every rule over the inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    /// One entry per (rule, product) pair that matched, in evaluation order.
    pub applications: Vec<RuleApplication>,
    /// Stock no rule consumed, charged at full price.
    pub remaining: Inventory,
}

/// Evaluates `rules` in order against `inventory`.
///
/// Each rule sees the inventory as left by the rules before it.
pub fn apply_rules<'a, I>(rules: I, mut inventory: Inventory) -> MatchOutcome
where
    I: IntoIterator<Item = &'a GeneralSale>,
{
    let mut applications = Vec::new();

    for sale in rules {
        if !sale.rule.is_recognized() {
            warn!(sale = %sale.label(), rule = %sale.rule, "Skipping discount with unrecognized rule kind");
            continue;
        }

        let count = match rule_count(sale, &inventory) {
            Some(count) if count > 0 => count,
            _ => {
                debug!(sale = %sale.label(), "Discount not applicable");
                continue;
            }
        };

        for (product, &required) in &sale.required_units {
            // rule_count already proved every product is present
            let Some(entry) = inventory.get_mut(product) else {
                continue;
            };

            let consumed = match sale.rule {
                RuleKind::More => entry.quantity,
                RuleKind::Eq => count * required,
                RuleKind::Unrecognized(_) => continue,
            };
            entry.quantity -= consumed;

            debug!(
                sale = %sale.label(),
                product = %product,
                consumed,
                discount_percent = sale.discount_percent,
                "Discount applied"
            );

            applications.push(RuleApplication {
                product_name: product.clone(),
                unit_price: entry.unit_price,
                quantity_at_discount: consumed,
                discount_percent: sale.discount_percent,
            });
        }
    }

    MatchOutcome {
        applications,
        remaining: inventory,
    }
}

/// How many whole times `sale` fits into the inventory.
///
/// `None` when a referenced product is absent, a required quantity is zero,
/// or the rule references no products at all.
fn rule_count(sale: &GeneralSale, inventory: &Inventory) -> Option<u32> {
    let mut count: Option<u32> = None;

    for (product, &required) in &sale.required_units {
        let entry = inventory.get(product)?;
        let multiples = entry.quantity.checked_div(required)?;
        count = Some(count.map_or(multiples, |c| c.min(multiples)));
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::CartLine;
    use std::collections::BTreeMap;

    fn inventory(items: &[(&str, i64, u32)]) -> Inventory {
        let lines: Vec<CartLine> = items
            .iter()
            .map(|&(name, cents, qty)| CartLine::new(name, Money::from_cents(cents), qty))
            .collect();
        Inventory::from_lines(&lines).unwrap()
    }

    fn consumed_by_product(outcome: &MatchOutcome) -> BTreeMap<String, u32> {
        let mut totals = BTreeMap::new();
        for app in &outcome.applications {
            *totals.entry(app.product_name.clone()).or_insert(0) += app.quantity_at_discount;
        }
        totals
    }

    #[test]
    fn test_more_consumes_everything() {
        let rules = vec![
            GeneralSale::new("", [("Pears", 4)], RuleKind::More, 20),
            GeneralSale::new("", [("Pears", 1)], RuleKind::More, 50),
        ];
        let outcome = apply_rules(&rules, inventory(&[("Pears", 100, 10)]));

        assert_eq!(outcome.applications.len(), 1);
        assert_eq!(outcome.applications[0].quantity_at_discount, 10);
        assert_eq!(outcome.remaining.get("Pears").unwrap().quantity, 0);
    }

    #[test]
    fn test_eq_leaves_remainder() {
        let rules = vec![GeneralSale::new("", [("Pears", 4)], RuleKind::Eq, 20)];
        let outcome = apply_rules(&rules, inventory(&[("Pears", 100, 10)]));

        assert_eq!(outcome.applications[0].quantity_at_discount, 8);
        assert_eq!(outcome.remaining.get("Pears").unwrap().quantity, 2);
    }

    #[test]
    fn test_count_is_minimum_across_products() {
        let rules = vec![GeneralSale::new("", [("Pears", 4), ("Bananas", 2)], RuleKind::Eq, 30)];
        let outcome = apply_rules(&rules, inventory(&[("Pears", 100, 9), ("Bananas", 100, 3)]));

        // Pears 9/4 = 2, Bananas 3/2 = 1 → count 1
        let consumed = consumed_by_product(&outcome);
        assert_eq!(consumed["Pears"], 4);
        assert_eq!(consumed["Bananas"], 2);
        assert_eq!(outcome.remaining.get("Pears").unwrap().quantity, 5);
        assert_eq!(outcome.remaining.get("Bananas").unwrap().quantity, 1);
    }

    #[test]
    fn test_absent_product_makes_rule_unsatisfiable() {
        let rules = vec![GeneralSale::new("", [("Pears", 1), ("Kiwi", 1)], RuleKind::More, 30)];
        let before = inventory(&[("Pears", 100, 5)]);
        let outcome = apply_rules(&rules, before.clone());

        assert!(outcome.applications.is_empty());
        assert_eq!(outcome.remaining, before);
    }

    #[test]
    fn test_zero_quantity_and_zero_requirement() {
        let rules = vec![
            GeneralSale::new("", [("Pears", 1)], RuleKind::More, 30),
            GeneralSale::new("", [("Apples", 0)], RuleKind::More, 30),
        ];
        let before = inventory(&[("Pears", 100, 0), ("Apples", 100, 3)]);
        let outcome = apply_rules(&rules, before.clone());

        assert!(outcome.applications.is_empty());
        assert_eq!(outcome.remaining, before);
    }

    #[test]
    fn test_unrecognized_kind_is_inert() {
        let rules = vec![GeneralSale::new(
            "X",
            [("Pears", 1)],
            RuleKind::Unrecognized("bogo".to_string()),
            30,
        )];
        let before = inventory(&[("Pears", 100, 5)]);
        let outcome = apply_rules(&rules, before.clone());

        assert!(outcome.applications.is_empty());
        assert_eq!(outcome.remaining, before);
    }

    #[test]
    fn test_never_over_consumes() {
        let rules = vec![
            GeneralSale::new("", [("Pears", 3)], RuleKind::Eq, 10),
            GeneralSale::new("", [("Pears", 2), ("Apples", 1)], RuleKind::Eq, 20),
            GeneralSale::new("", [("Apples", 2)], RuleKind::More, 30),
            GeneralSale::new("", [("Pears", 1)], RuleKind::More, 40),
        ];
        let original = [("Pears", 100, 11), ("Apples", 50, 7)];
        let outcome = apply_rules(&rules, inventory(&original));
        let consumed = consumed_by_product(&outcome);

        for (name, _, qty) in original {
            let used = consumed.get(name).copied().unwrap_or(0);
            let left = outcome.remaining.get(name).unwrap().quantity;
            assert!(used <= qty);
            assert_eq!(used + left, qty);
        }
    }

    #[test]
    fn test_personal_rule_first_starves_store_wide() {
        let personal = GeneralSale::new("VIP", [("Apples", 1)], RuleKind::More, 40);
        let store_wide = vec![GeneralSale::new("", [("Apples", 2)], RuleKind::Eq, 10)];
        let outcome = apply_rules(
            std::iter::once(&personal).chain(store_wide.iter()),
            inventory(&[("Apples", 100, 4)]),
        );

        assert_eq!(outcome.applications.len(), 1);
        assert_eq!(outcome.applications[0].discount_percent, 40);
    }
}
