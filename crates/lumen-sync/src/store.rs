//! # Store Traits
//!
//! The persistence seams of the sync engine. Concrete backends (browser
//! local storage, hosted SQL/NoSQL services) live outside this crate;
//! the reconciler only ever sees these two shapes.
//!
//! ## Store Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Store Interfaces                                 │
//! │                                                                         │
//! │  LocalStore (the cache - cheap, always available)                      │
//! │  ├── get/save whole collections (products, bills)                      │
//! │  └── next_sequence: counter for human-readable offline ids             │
//! │                                                                         │
//! │  RemoteStore (the source of shared truth - may be unreachable)         │
//! │  ├── get-all per collection                                            │
//! │  ├── create/update/delete by id                                        │
//! │  └── find_product_by_barcode: natural-key lookup, the idempotency     │
//! │      check that keeps retried uploads from duplicating rows            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;

use lumen_core::{Bill, Product};

use crate::error::SyncResult;

// =============================================================================
// Local Store
// =============================================================================

/// The local cache: whole-collection reads and writes.
///
/// Every mutating operation of the sync engine lands here first and is
/// immediately visible to the caller, whatever the remote does.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Returns the cached product collection.
    async fn get_products(&self) -> SyncResult<Vec<Product>>;

    /// Replaces the cached product collection.
    async fn save_products(&self, products: &[Product]) -> SyncResult<()>;

    /// Returns the cached bill collection.
    async fn get_bills(&self) -> SyncResult<Vec<Bill>>;

    /// Replaces the cached bill collection.
    async fn save_bills(&self, bills: &[Bill]) -> SyncResult<()>;

    /// Returns the next value of the named counter (starting at 1).
    ///
    /// Used to mint human-readable sequential ids (`P-000123`) for
    /// records born offline, before any remote id exists.
    async fn next_sequence(&self, name: &str) -> SyncResult<u64>;
}

// =============================================================================
// Remote Store
// =============================================================================

/// The remote store: per-record operations plus get-all, any of which
/// may fail with a transport error at any time.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Returns the complete remote product collection.
    async fn get_products(&self) -> SyncResult<Vec<Product>>;

    /// Creates a product remotely.
    async fn create_product(&self, product: &Product) -> SyncResult<()>;

    /// Updates a product remotely by id.
    async fn update_product(&self, product: &Product) -> SyncResult<()>;

    /// Deletes a product remotely by id.
    async fn delete_product(&self, id: &str) -> SyncResult<()>;

    /// Looks a product up by its natural key.
    ///
    /// Upload paths MUST check this before `create_product` so that a
    /// retried upload of a record that already landed (under any id)
    /// does not create a duplicate row.
    async fn find_product_by_barcode(&self, barcode: &str) -> SyncResult<Option<Product>>;

    /// Returns the complete remote bill collection.
    async fn get_bills(&self) -> SyncResult<Vec<Bill>>;

    /// Creates a bill remotely.
    async fn create_bill(&self, bill: &Bill) -> SyncResult<()>;
}

// =============================================================================
// Sequential Id Formatting
// =============================================================================

/// Formats a counter value as a human-readable sequential id.
///
/// ```rust
/// use lumen_sync::store::format_sequential_id;
///
/// assert_eq!(format_sequential_id("P", 123), "P-000123");
/// ```
pub fn format_sequential_id(prefix: &str, seq: u64) -> String {
    format!("{}-{:06}", prefix, seq)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_sequential_id() {
        assert_eq!(format_sequential_id("P", 1), "P-000001");
        assert_eq!(format_sequential_id("B", 999999), "B-999999");
        // Wider than the pad: keeps all digits
        assert_eq!(format_sequential_id("P", 1_000_000), "P-1000000");
    }
}
