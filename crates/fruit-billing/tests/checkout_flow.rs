//! End-to-end flows through CheckoutService with in-memory collaborators.

mod common;

use common::{harness, line, sale, valid_card, StaticCatalog};
use fruit_billing::{checkout_key, BillingError, CheckoutStep, DiscountLookupPolicy};
use fruit_cache::KeyValueStore;
use fruit_core::{RuleKind, TotalInfo};
use uuid::Uuid;

fn totals(price: &str, savings: &str, quantity: &str) -> TotalInfo {
    TotalInfo {
        total_price: price.to_string(),
        total_savings: savings.to_string(),
        total_quantity: quantity.to_string(),
    }
}

// =============================================================================
// Cart Summary
// =============================================================================

#[tokio::test]
async fn cart_summary_sorts_lines_and_applies_store_wide_sales() {
    let h = harness(
        vec![sale("", &[("Pears", 4), ("Bananas", 2)], RuleKind::Eq, 30)],
        StaticCatalog::default(),
        DiscountLookupPolicy::Fail,
    );
    let user = Uuid::new_v4();
    h.carts
        .put(user, vec![line("Pears", 1000, 4), line("Bananas", 1000, 2)])
        .await;

    let summary = h.service.cart_summary(user).await.unwrap();

    let names: Vec<&str> = summary.lines.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, ["Bananas", "Pears"]);
    assert_eq!(summary.totals, totals("42.00", "18.00", "6"));
    assert!(!summary.is_discount_added);
}

#[tokio::test]
async fn cart_summary_of_empty_cart() {
    let h = harness(vec![], StaticCatalog::default(), DiscountLookupPolicy::Fail);
    let summary = h.service.cart_summary(Uuid::new_v4()).await.unwrap();

    assert!(summary.lines.is_empty());
    assert_eq!(summary.totals, TotalInfo::empty());
}

#[tokio::test]
async fn store_wide_rule_for_absent_product_changes_nothing() {
    let h = harness(
        vec![sale("", &[("Kiwi", 1)], RuleKind::More, 50)],
        StaticCatalog::default(),
        DiscountLookupPolicy::Fail,
    );
    let user = Uuid::new_v4();
    h.carts.put(user, vec![line("Apples", 250, 2)]).await;

    let summary = h.service.cart_summary(user).await.unwrap();
    assert_eq!(summary.totals, totals("5.00", "0.00", "2"));
}

#[tokio::test]
async fn conflicting_prices_fail_pricing() {
    let h = harness(vec![], StaticCatalog::default(), DiscountLookupPolicy::Fail);
    let user = Uuid::new_v4();
    h.carts
        .put(user, vec![line("Apples", 100, 1), line("Apples", 120, 1)])
        .await;

    let err = h.service.cart_summary(user).await.unwrap_err();
    assert_eq!(err.code(), "pricing_failed");
}

#[tokio::test]
async fn lookup_failure_follows_policy() {
    let failing = harness(vec![], StaticCatalog::default(), DiscountLookupPolicy::Fail);
    let degrading = harness(vec![], StaticCatalog::default(), DiscountLookupPolicy::Degrade);
    let user = Uuid::new_v4();

    for h in [&failing, &degrading] {
        h.carts.put(user, vec![line("Apples", 100, 3)]).await;
        h.store.fail_reads(true);
    }

    let err = failing.service.cart_summary(user).await.unwrap_err();
    assert!(matches!(err, BillingError::Store(_)));

    let summary = degrading.service.cart_summary(user).await.unwrap();
    assert_eq!(summary.totals, totals("3.00", "0.00", "3"));
    assert!(!summary.is_discount_added);
}

// =============================================================================
// Claiming A Discount
// =============================================================================

#[tokio::test]
async fn apply_discount_then_price_with_it_first() {
    let catalog = StaticCatalog::default().with(sale("APPLES10", &[("Apples", 1)], RuleKind::More, 10));
    let h = harness(
        vec![sale("", &[("Apples", 1)], RuleKind::More, 50)],
        catalog,
        DiscountLookupPolicy::Fail,
    );
    let user = Uuid::new_v4();
    h.carts.put(user, vec![line("Apples", 10000, 1)]).await;

    let claimed = h.service.apply_discount(user, "APPLES10").await.unwrap();
    assert_eq!(claimed.id, "APPLES10");

    // Personal 10% consumes the apple before the 50% store-wide sale
    let summary = h.service.cart_summary(user).await.unwrap();
    assert_eq!(summary.totals, totals("90.00", "10.00", "1"));
    assert!(summary.is_discount_added);
}

#[tokio::test]
async fn apply_discount_twice_is_a_conflict() {
    let catalog = StaticCatalog::default()
        .with(sale("A", &[("Apples", 1)], RuleKind::More, 10))
        .with(sale("B", &[("Pears", 1)], RuleKind::More, 20));
    let h = harness(vec![], catalog, DiscountLookupPolicy::Fail);
    let user = Uuid::new_v4();

    h.service.apply_discount(user, "A").await.unwrap();
    let err = h.service.apply_discount(user, "B").await.unwrap_err();

    assert!(matches!(err, BillingError::Conflict(_)));
    assert!(err.is_client_error());
    assert_eq!(h.service.discounts().get_personal_discount(user).await.unwrap().id, "A");
}

#[tokio::test]
async fn concurrent_claims_admit_one_winner() {
    let catalog = StaticCatalog::default()
        .with(sale("A", &[("Apples", 1)], RuleKind::More, 10))
        .with(sale("B", &[("Pears", 1)], RuleKind::More, 20));
    let h = harness(vec![], catalog, DiscountLookupPolicy::Fail);
    let user = Uuid::new_v4();

    let (a, b) = tokio::join!(
        h.service.apply_discount(user, "A"),
        h.service.apply_discount(user, "B"),
    );

    let winner = match (a, b) {
        (Ok(sale), Err(BillingError::Conflict(_))) | (Err(BillingError::Conflict(_)), Ok(sale)) => sale,
        other => panic!("expected exactly one claim to win, got {other:?}"),
    };
    assert_eq!(h.service.discounts().get_personal_discount(user).await.unwrap(), winner);
}

#[tokio::test]
async fn apply_unknown_discount_is_not_found() {
    let h = harness(vec![], StaticCatalog::default(), DiscountLookupPolicy::Fail);
    let err = h.service.apply_discount(Uuid::new_v4(), "NOPE").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn apply_discount_with_unknown_rule_kind_is_rejected() {
    let catalog = StaticCatalog::default().with(sale(
        "NEW",
        &[("Apples", 1)],
        RuleKind::Unrecognized("new".to_string()),
        10,
    ));
    let h = harness(vec![], catalog, DiscountLookupPolicy::Fail);
    let user = Uuid::new_v4();

    let err = h.service.apply_discount(user, "NEW").await.unwrap_err();
    assert_eq!(err.code(), "invalid_sale");
    assert!(h.service.discounts().get_personal_discount(user).await.unwrap_err().is_not_found());
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn checkout_clears_cart_and_discount() {
    let catalog = StaticCatalog::default().with(sale("A", &[("Apples", 1)], RuleKind::More, 10));
    let h = harness(vec![], catalog, DiscountLookupPolicy::Fail);
    let user = Uuid::new_v4();
    h.carts.put(user, vec![line("Apples", 100, 2)]).await;
    h.service.apply_discount(user, "A").await.unwrap();

    h.service.checkout(user, &valid_card()).await.unwrap();

    assert!(h.carts.lines(user).await.is_empty());
    assert!(h.service.discounts().get_personal_discount(user).await.unwrap_err().is_not_found());

    // A finished checkout leaves nothing to reconcile
    assert!(h.store.get(&checkout_key(user)).await.unwrap_err().is_not_found());
    assert!(!h.service.reconcile(user).await.unwrap());
}

#[tokio::test]
async fn checkout_without_discount_succeeds() {
    let h = harness(vec![], StaticCatalog::default(), DiscountLookupPolicy::Fail);
    let user = Uuid::new_v4();
    h.carts.put(user, vec![line("Apples", 100, 2)]).await;

    h.service.checkout(user, &valid_card()).await.unwrap();
    assert!(h.carts.lines(user).await.is_empty());
}

#[tokio::test]
async fn invalid_card_changes_nothing() {
    let h = harness(vec![], StaticCatalog::default(), DiscountLookupPolicy::Fail);
    let user = Uuid::new_v4();
    h.carts.put(user, vec![line("Apples", 100, 2)]).await;

    let mut card = valid_card();
    card.expiry = "1199".to_string();
    let err = h.service.checkout(user, &card).await.unwrap_err();
    assert!(matches!(err, BillingError::Format(_)));

    let mut card = valid_card();
    card.card_number = "4916527199683697".to_string();
    let err = h.service.checkout(user, &card).await.unwrap_err();
    assert!(matches!(err, BillingError::Validation(_)));

    assert_eq!(h.carts.lines(user).await.len(), 1);
    assert!(h.store.get(&checkout_key(user)).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn unrecorded_checkout_changes_nothing() {
    let catalog = StaticCatalog::default().with(sale("A", &[("Apples", 1)], RuleKind::More, 10));
    let h = harness(vec![], catalog, DiscountLookupPolicy::Fail);
    let user = Uuid::new_v4();
    h.carts.put(user, vec![line("Apples", 100, 2)]).await;
    h.service.apply_discount(user, "A").await.unwrap();

    h.store.fail_writes(true);
    let err = h.service.checkout(user, &valid_card()).await.unwrap_err();
    assert!(matches!(err, BillingError::Store(_)));

    h.store.fail_writes(false);
    assert_eq!(h.carts.lines(user).await.len(), 1);
    assert_eq!(h.service.discounts().get_personal_discount(user).await.unwrap().id, "A");
}

#[tokio::test]
async fn failed_discount_removal_reports_progress_and_reconciles() {
    let catalog = StaticCatalog::default().with(sale("A", &[("Apples", 1)], RuleKind::More, 10));
    let h = harness(vec![], catalog, DiscountLookupPolicy::Fail);
    let user = Uuid::new_v4();
    h.carts.put(user, vec![line("Apples", 100, 2)]).await;
    h.service.apply_discount(user, "A").await.unwrap();

    h.store.fail_deletes(true);
    let err = h.service.checkout(user, &valid_card()).await.unwrap_err();
    match err {
        BillingError::CheckoutIncomplete { completed, source, .. } => {
            assert_eq!(completed, vec![CheckoutStep::ClearCart]);
            assert!(matches!(*source, BillingError::Store(_)));
        }
        other => panic!("expected CheckoutIncomplete, got {other:?}"),
    }
    assert!(h.carts.lines(user).await.is_empty());

    // The cart refilled after the failure is not cleared again
    h.carts.put(user, vec![line("Pears", 200, 1)]).await;

    h.store.fail_deletes(false);
    assert!(h.service.reconcile(user).await.unwrap());
    assert!(h.service.discounts().get_personal_discount(user).await.unwrap_err().is_not_found());
    assert_eq!(h.carts.lines(user).await.len(), 1);
    assert!(!h.service.reconcile(user).await.unwrap());
}

#[tokio::test]
async fn failed_cart_clear_reports_no_progress() {
    let h = harness(vec![], StaticCatalog::default(), DiscountLookupPolicy::Fail);
    let user = Uuid::new_v4();
    h.carts.put(user, vec![line("Apples", 100, 2)]).await;

    h.carts.fail_clear(true);
    let err = h.service.checkout(user, &valid_card()).await.unwrap_err();
    assert!(matches!(
        err,
        BillingError::CheckoutIncomplete { ref completed, .. } if completed.is_empty()
    ));

    h.carts.fail_clear(false);
    assert!(h.service.reconcile(user).await.unwrap());
    assert!(h.carts.lines(user).await.is_empty());
    assert!(!h.service.reconcile(user).await.unwrap());
}

#[tokio::test]
async fn reconcile_without_pending_checkout_leaves_shopper_alone() {
    let catalog = StaticCatalog::default().with(sale("A", &[("Apples", 1)], RuleKind::More, 10));
    let h = harness(vec![], catalog, DiscountLookupPolicy::Fail);
    let user = Uuid::new_v4();
    h.carts.put(user, vec![line("Apples", 100, 2)]).await;
    h.service.apply_discount(user, "A").await.unwrap();

    assert!(!h.service.reconcile(user).await.unwrap());
    assert!(!h.service.reconcile(user).await.unwrap());

    assert_eq!(h.carts.lines(user).await.len(), 1);
    assert_eq!(h.service.discounts().get_personal_discount(user).await.unwrap().id, "A");
}
