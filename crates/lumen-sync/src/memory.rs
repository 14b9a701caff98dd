//! # In-Memory Store Backends
//!
//! Reference implementations of the store traits. `MemoryLocalStore` is
//! the in-process analog of a browser's local storage and serves as the
//! default cache backend; `MemoryRemoteStore` stands in for a hosted
//! database and supports fault injection so connectivity failures are
//! testable without a network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tokio::sync::Mutex;

use async_trait::async_trait;

use lumen_core::{Bill, Product};

use crate::error::{SyncError, SyncResult};
use crate::store::{LocalStore, RemoteStore};

// =============================================================================
// Memory Local Store
// =============================================================================

/// In-memory local cache: two named collections plus the id counters.
#[derive(Default)]
pub struct MemoryLocalStore {
    products: Mutex<Vec<Product>>,
    bills: Mutex<Vec<Bill>>,
    counters: Mutex<HashMap<String, u64>>,
}

impl MemoryLocalStore {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the cache with an initial product collection.
    pub async fn with_products(products: Vec<Product>) -> Self {
        let store = Self::new();
        *store.products.lock().await = products;
        store
    }
}

#[async_trait]
impl LocalStore for MemoryLocalStore {
    async fn get_products(&self) -> SyncResult<Vec<Product>> {
        Ok(self.products.lock().await.clone())
    }

    async fn save_products(&self, products: &[Product]) -> SyncResult<()> {
        *self.products.lock().await = products.to_vec();
        Ok(())
    }

    async fn get_bills(&self) -> SyncResult<Vec<Bill>> {
        Ok(self.bills.lock().await.clone())
    }

    async fn save_bills(&self, bills: &[Bill]) -> SyncResult<()> {
        *self.bills.lock().await = bills.to_vec();
        Ok(())
    }

    async fn next_sequence(&self, name: &str) -> SyncResult<u64> {
        let mut counters = self.counters.lock().await;
        let counter = counters.entry(name.to_string()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }
}

// =============================================================================
// Memory Remote Store
// =============================================================================

/// In-memory remote store with fault injection.
///
/// ## Fault Injection
/// ```text
/// fail_all(true)  - every call fails with a transport error until cleared
/// fail_next(n)    - the next n calls fail, then behavior returns to normal
/// ```
#[derive(Default)]
pub struct MemoryRemoteStore {
    products: Mutex<Vec<Product>>,
    bills: Mutex<Vec<Bill>>,
    fail_all: AtomicBool,
    fail_next: AtomicU32,
}

impl MemoryRemoteStore {
    /// Creates an empty remote store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the remote with an initial product collection.
    pub async fn with_products(products: Vec<Product>) -> Self {
        let store = Self::new();
        *store.products.lock().await = products;
        store
    }

    /// Makes every subsequent call fail until called with `false`.
    pub fn fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    /// Makes the next `n` calls fail.
    pub fn fail_next(&self, n: u32) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    /// Direct inspection for tests: the current remote product rows.
    pub async fn product_rows(&self) -> Vec<Product> {
        self.products.lock().await.clone()
    }

    /// Direct inspection for tests: the current remote bill rows.
    pub async fn bill_rows(&self) -> Vec<Bill> {
        self.bills.lock().await.clone()
    }

    /// Applies fault injection; every trait method calls this first.
    fn gate(&self) -> SyncResult<()> {
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(SyncError::Transport("simulated outage".into()));
        }

        let remaining = self.fail_next.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_next.store(remaining - 1, Ordering::SeqCst);
            return Err(SyncError::Transport("simulated transient failure".into()));
        }

        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn get_products(&self) -> SyncResult<Vec<Product>> {
        self.gate()?;
        Ok(self.products.lock().await.clone())
    }

    async fn create_product(&self, product: &Product) -> SyncResult<()> {
        self.gate()?;
        self.products.lock().await.push(product.clone());
        Ok(())
    }

    async fn update_product(&self, product: &Product) -> SyncResult<()> {
        self.gate()?;
        let mut products = self.products.lock().await;
        match products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => {
                *existing = product.clone();
                Ok(())
            }
            None => Err(SyncError::NotFound {
                entity: "product",
                id: product.id.clone(),
            }),
        }
    }

    async fn delete_product(&self, id: &str) -> SyncResult<()> {
        self.gate()?;
        let mut products = self.products.lock().await;
        let before = products.len();
        products.retain(|p| p.id != id);
        if products.len() == before {
            return Err(SyncError::NotFound {
                entity: "product",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn find_product_by_barcode(&self, barcode: &str) -> SyncResult<Option<Product>> {
        self.gate()?;
        Ok(self
            .products
            .lock()
            .await
            .iter()
            .find(|p| p.barcode == barcode)
            .cloned())
    }

    async fn get_bills(&self) -> SyncResult<Vec<Bill>> {
        self.gate()?;
        Ok(self.bills.lock().await.clone())
    }

    async fn create_bill(&self, bill: &Bill) -> SyncResult<()> {
        self.gate()?;
        self.bills.lock().await.push(bill.clone());
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(id: &str, barcode: &str) -> Product {
        Product {
            id: id.into(),
            barcode: barcode.into(),
            name: format!("Product {id}"),
            description: None,
            price_cents: 100,
            category: None,
            stock: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_local_round_trip() {
        let store = MemoryLocalStore::new();
        assert!(store.get_products().await.unwrap().is_empty());

        let products = vec![product("P-000001", "11111111")];
        store.save_products(&products).await.unwrap();
        assert_eq!(store.get_products().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sequences_are_independent_and_monotonic() {
        let store = MemoryLocalStore::new();
        assert_eq!(store.next_sequence("P").await.unwrap(), 1);
        assert_eq!(store.next_sequence("P").await.unwrap(), 2);
        assert_eq!(store.next_sequence("B").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_remote_find_by_barcode() {
        let remote =
            MemoryRemoteStore::with_products(vec![product("r-1", "40063813")]).await;

        let found = remote.find_product_by_barcode("40063813").await.unwrap();
        assert_eq!(found.unwrap().id, "r-1");
        assert!(remote
            .find_product_by_barcode("99999999")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_remote_update_missing_is_not_found() {
        let remote = MemoryRemoteStore::new();
        let err = remote.update_product(&product("r-9", "1")).await.unwrap_err();
        assert!(matches!(err, SyncError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_fail_all_gates_every_call() {
        let remote = MemoryRemoteStore::new();
        remote.fail_all(true);
        assert!(remote.get_products().await.is_err());
        assert!(remote.create_product(&product("r-1", "1")).await.is_err());

        remote.fail_all(false);
        assert!(remote.get_products().await.is_ok());
    }

    #[tokio::test]
    async fn test_fail_next_is_transient() {
        let remote = MemoryRemoteStore::new();
        remote.fail_next(2);
        assert!(remote.get_products().await.is_err());
        assert!(remote.get_bills().await.is_err());
        assert!(remote.get_products().await.is_ok());
    }
}
