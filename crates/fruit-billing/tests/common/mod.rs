//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fruit_billing::config::DiscountSettings;
use fruit_billing::{
    CartProvider, CheckoutService, DiscountCatalog, DiscountLookupPolicy, DiscountManager,
    ProviderError, SalesCatalog,
};
use fruit_cache::{CacheError, CacheResult, InMemoryStore, KeyValueStore};
use fruit_core::{CartLine, GeneralSale, Money, PaymentDetails, RuleKind};
use tokio::sync::Mutex;
use uuid::Uuid;

// =============================================================================
// Carts
// =============================================================================

#[derive(Default)]
pub struct InMemoryCarts {
    carts: Mutex<HashMap<Uuid, Vec<CartLine>>>,
    fail_clear: AtomicBool,
}

impl InMemoryCarts {
    pub async fn put(&self, user_id: Uuid, lines: Vec<CartLine>) {
        self.carts.lock().await.insert(user_id, lines);
    }

    pub async fn lines(&self, user_id: Uuid) -> Vec<CartLine> {
        self.carts.lock().await.get(&user_id).cloned().unwrap_or_default()
    }

    pub fn fail_clear(&self, fail: bool) {
        self.fail_clear.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl CartProvider for InMemoryCarts {
    async fn cart_lines(&self, user_id: Uuid) -> Result<Vec<CartLine>, ProviderError> {
        Ok(self.lines(user_id).await)
    }

    async fn clear_cart(&self, user_id: Uuid) -> Result<(), ProviderError> {
        if self.fail_clear.load(Ordering::SeqCst) {
            return Err(ProviderError::new("clear_cart", "database unavailable"));
        }
        self.carts.lock().await.remove(&user_id);
        Ok(())
    }
}

// =============================================================================
// Discount Catalog
// =============================================================================

#[derive(Default)]
pub struct StaticCatalog {
    discounts: HashMap<String, GeneralSale>,
}

impl StaticCatalog {
    pub fn with(mut self, sale: GeneralSale) -> Self {
        self.discounts.insert(sale.id.clone(), sale);
        self
    }
}

#[async_trait]
impl DiscountCatalog for StaticCatalog {
    async fn discount_by_id(&self, id: &str) -> Result<Option<GeneralSale>, ProviderError> {
        Ok(self.discounts.get(id).cloned())
    }
}

// =============================================================================
// Key-Value Store With Switchable Failures
// =============================================================================

#[derive(Default)]
pub struct FlakyStore {
    inner: InMemoryStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_deletes: AtomicBool,
}

impl FlakyStore {
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }
}

fn refused() -> CacheError {
    CacheError::ConnectionFailed("connection refused".to_string())
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> CacheResult<String> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(refused());
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(refused());
        }
        self.inner.set(key, value, ttl).await
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<bool> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(refused());
        }
        self.inner.set_if_absent(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(refused());
        }
        self.inner.delete(key).await
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub struct Harness {
    pub service: CheckoutService,
    pub carts: Arc<InMemoryCarts>,
    pub store: Arc<FlakyStore>,
}

pub fn harness(store_wide: Vec<GeneralSale>, catalog: StaticCatalog, policy: DiscountLookupPolicy) -> Harness {
    let carts = Arc::new(InMemoryCarts::default());
    let store = Arc::new(FlakyStore::default());
    let settings = DiscountSettings {
        ttl_secs: 3600,
        lookup_policy: policy,
    };
    let discounts = DiscountManager::new(
        store.clone(),
        SalesCatalog::new(store_wide).expect("valid store-wide sales"),
        &settings,
    );
    let service = CheckoutService::new(discounts, carts.clone(), Arc::new(catalog));

    Harness { service, carts, store }
}

pub fn line(name: &str, cents: i64, quantity: u32) -> CartLine {
    CartLine::new(name, Money::from_cents(cents), quantity)
}

pub fn sale(id: &str, units: &[(&str, u32)], rule: RuleKind, percent: u8) -> GeneralSale {
    GeneralSale::new(id, units.iter().map(|&(name, qty)| (name, qty)), rule, percent)
}

pub fn valid_card() -> PaymentDetails {
    PaymentDetails {
        card_number: "4916527199683696".to_string(),
        expiry: "11/99".to_string(),
        name: "test".to_string(),
        cvc: "123".to_string(),
    }
}
