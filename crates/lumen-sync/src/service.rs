//! # Sync Service
//!
//! The offline-first reconciler. Every mutation lands in the local cache
//! first and is immediately visible to the caller; the remote leg is
//! best-effort and any record it misses is rediscovered by the next full
//! pass via the symmetric-difference scan.
//!
//! ## Operation Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      User Mutation (create/update/delete)               │
//! │                                                                         │
//! │  1. Validate input                  ──► Err(Validation) on bad input   │
//! │  2. LOCAL leg: read, apply, save    ──► Err(NotFound) is HARD here     │
//! │     (serialized: the cache write lock is held across the whole         │
//! │      read-modify-write, so concurrent mutations never interleave       │
//! │      between a collection read and its save; the lock is released      │
//! │      before any remote call)                                           │
//! │  3. Emit the change event                                               │
//! │  4. REMOTE leg: best-effort push    ──► failure logged, marks offline, │
//! │                                         never unwinds the mutation     │
//! └─────────────────────────────────────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Full Sync Pass                                 │
//! │                                                                         │
//! │  compare_exchange(sync_in_progress)  ──► already running: skip, no-op  │
//! │  snapshot both sides of BOTH collections, plan the differences          │
//! │  upload local-only   (re-check natural key before each create)         │
//! │  persist the staged downloads ONLY after every remote call succeeded   │
//! │  any transport error ──► abort pass, SyncFailed event, mark offline,   │
//! │                          local cache untouched (no download persisted) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use lumen_core::validation::{validate_price_cents, validate_product_name, validate_quantity};
use lumen_core::{
    Bill, BillItem, CoreError, Money, PaymentMethod, Product, Subscribers, Subscription,
    ValidationError,
};

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::event::{SyncEvent, SyncEventKind};
use crate::reconcile::{plan_bills, plan_products};
use crate::store::{format_sequential_id, LocalStore, RemoteStore};

// =============================================================================
// Input Types
// =============================================================================

/// Fields accepted when creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub barcode: String,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub category: Option<String>,
    pub stock: Option<i64>,
}

/// One line of a bill being finalized.
#[derive(Debug, Clone)]
pub struct NewBillItem {
    pub product_id: String,
    pub barcode: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
}

// =============================================================================
// Sync Status
// =============================================================================

/// Point-in-time snapshot of the engine's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncStatus {
    /// Whether the remote is currently believed reachable.
    pub is_online: bool,

    /// Unix millis of the last completed full pass, 0 if none yet.
    pub last_sync_time: i64,

    /// Whether a full pass is running right now.
    pub sync_in_progress: bool,
}

// =============================================================================
// Sync Service
// =============================================================================

/// Local-first CRUD plus background reconciliation over a local cache
/// and a remote store.
///
/// Cheap to share: wrap in an `Arc` and hand clones of that to the agent
/// and to every caller. All state is interior.
pub struct SyncService {
    local: Arc<dyn LocalStore>,
    remote: Arc<dyn RemoteStore>,
    config: SyncConfig,
    /// Serializes every local read-modify-write. The store exposes only
    /// whole-collection get/save, so without this two concurrent
    /// mutations could interleave and one save would erase the other.
    /// Never held across a remote call.
    cache_write: Mutex<()>,
    is_online: AtomicBool,
    last_sync_time: AtomicI64,
    sync_in_progress: AtomicBool,
    subscribers: Subscribers<SyncEvent>,
}

/// Counts of records moved by one full pass.
#[derive(Debug, Default)]
struct PassCounts {
    uploaded_products: usize,
    downloaded_products: usize,
    uploaded_bills: usize,
    downloaded_bills: usize,
}

impl SyncService {
    /// Creates a service over the given stores.
    ///
    /// Connectivity starts optimistic (online); the agent overwrites it
    /// from the platform signal before the first pass.
    pub fn new(
        local: Arc<dyn LocalStore>,
        remote: Arc<dyn RemoteStore>,
        config: SyncConfig,
    ) -> SyncResult<Self> {
        config.validate()?;
        Ok(SyncService {
            local,
            remote,
            config,
            cache_write: Mutex::new(()),
            is_online: AtomicBool::new(true),
            last_sync_time: AtomicI64::new(0),
            sync_in_progress: AtomicBool::new(false),
            subscribers: Subscribers::new(),
        })
    }

    /// The configuration this service was built with.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Current engine state.
    pub fn status(&self) -> SyncStatus {
        SyncStatus {
            is_online: self.is_online.load(Ordering::SeqCst),
            last_sync_time: self.last_sync_time.load(Ordering::SeqCst),
            sync_in_progress: self.sync_in_progress.load(Ordering::SeqCst),
        }
    }

    // =========================================================================
    // Observers
    // =========================================================================

    /// Registers a sync event listener; see [`Subscribers::subscribe`]
    /// for the delivery and unsubscribe contract.
    pub fn subscribe<F>(&self, listener: F) -> Subscription<SyncEvent>
    where
        F: Fn(&SyncEvent) + Send + Sync + 'static,
    {
        self.subscribers.subscribe(listener)
    }

    fn emit(&self, kind: SyncEventKind) {
        self.subscribers.notify(&SyncEvent::now(kind));
    }

    // =========================================================================
    // Connectivity
    // =========================================================================

    /// Records a connectivity transition. Returns true if the state
    /// actually changed; edge transitions emit `Online`/`Offline`.
    pub fn set_online(&self, online: bool) -> bool {
        let was = self.is_online.swap(online, Ordering::SeqCst);
        if was == online {
            return false;
        }

        if online {
            info!("Connectivity restored");
            self.emit(SyncEventKind::Online);
        } else {
            warn!("Connectivity lost, operating from local cache");
            self.emit(SyncEventKind::Offline);
        }
        true
    }

    /// Folds the outcome of a best-effort remote leg into connectivity
    /// state. The local mutation already succeeded; nothing unwinds.
    fn note_remote_leg<T>(&self, op: &'static str, result: SyncResult<T>) {
        match result {
            Ok(_) => {
                self.set_online(true);
            }
            Err(err) => {
                warn!(%err, op, "Remote leg failed, local change stands");
                if err.is_retryable() {
                    self.set_online(false);
                }
            }
        }
    }

    // =========================================================================
    // Product CRUD
    // =========================================================================

    /// Creates a product: local cache first, then best-effort remote.
    ///
    /// The new record carries a sequential offline id (`P-nnnnnn`) and is
    /// visible in [`products`](Self::products) before this returns, even
    /// with the remote unreachable.
    pub async fn create_product(&self, input: NewProduct) -> SyncResult<Product> {
        validate_product_name(&input.name)?;
        validate_price_cents(input.price_cents)?;
        let barcode = input.barcode.trim().to_string();
        if barcode.is_empty() {
            return Err(ValidationError::Required {
                field: "barcode".to_string(),
            }
            .into());
        }

        let product = {
            let _guard = self.cache_write.lock().await;

            let mut products = self.local.get_products().await?;
            if products.iter().any(|p| p.barcode == barcode) {
                return Err(ValidationError::Duplicate {
                    field: "barcode".to_string(),
                    value: barcode,
                }
                .into());
            }

            let seq = self.local.next_sequence("P").await?;
            let now = Utc::now();
            let product = Product {
                id: format_sequential_id("P", seq),
                barcode,
                name: input.name.trim().to_string(),
                description: input.description,
                price_cents: input.price_cents,
                category: input.category,
                stock: input.stock,
                created_at: now,
                updated_at: now,
            };

            products.push(product.clone());
            self.local.save_products(&products).await?;
            product
        };

        info!(id = %product.id, barcode = %product.barcode, "Product created locally");
        self.emit(SyncEventKind::ProductCreated {
            id: product.id.clone(),
        });

        let pushed = self.push_product(&product).await;
        self.note_remote_leg("create_product", pushed);

        Ok(product)
    }

    /// Updates a product. The id must exist in the local cache; a miss
    /// is a hard [`SyncError::NotFound`], not a deferred sync.
    pub async fn update_product(&self, product: Product) -> SyncResult<Product> {
        validate_product_name(&product.name)?;
        validate_price_cents(product.price_cents)?;

        let updated = {
            let _guard = self.cache_write.lock().await;

            let mut products = self.local.get_products().await?;
            let slot = products
                .iter_mut()
                .find(|p| p.id == product.id)
                .ok_or_else(|| SyncError::NotFound {
                    entity: "product",
                    id: product.id.clone(),
                })?;

            let mut updated = product;
            updated.created_at = slot.created_at;
            updated.updated_at = Utc::now();
            *slot = updated.clone();

            self.local.save_products(&products).await?;
            updated
        };

        info!(id = %updated.id, "Product updated locally");
        self.emit(SyncEventKind::ProductUpdated {
            id: updated.id.clone(),
        });

        let pushed = self.remote.update_product(&updated).await;
        self.note_remote_leg("update_product", pushed);

        Ok(updated)
    }

    /// Deletes a product by id. A local miss is a hard error.
    pub async fn delete_product(&self, id: &str) -> SyncResult<()> {
        {
            let _guard = self.cache_write.lock().await;

            let mut products = self.local.get_products().await?;
            let before = products.len();
            products.retain(|p| p.id != id);
            if products.len() == before {
                return Err(SyncError::NotFound {
                    entity: "product",
                    id: id.to_string(),
                });
            }

            self.local.save_products(&products).await?;
        }

        info!(id, "Product deleted locally");
        self.emit(SyncEventKind::ProductDeleted { id: id.to_string() });

        let pushed = self.remote.delete_product(id).await;
        self.note_remote_leg("delete_product", pushed);

        Ok(())
    }

    /// The current local product catalog.
    pub async fn products(&self) -> SyncResult<Vec<Product>> {
        self.local.get_products().await
    }

    /// Looks a product up by barcode in the local catalog.
    pub async fn product_by_barcode(&self, barcode: &str) -> SyncResult<Option<Product>> {
        let products = self.local.get_products().await?;
        Ok(products.into_iter().find(|p| p.barcode == barcode))
    }

    /// Uploads one product, idempotent by natural key: if any row with
    /// this barcode already exists remotely (under any id), nothing is
    /// created.
    async fn push_product(&self, product: &Product) -> SyncResult<()> {
        if self
            .remote
            .find_product_by_barcode(&product.barcode)
            .await?
            .is_some()
        {
            debug!(barcode = %product.barcode, "Barcode already remote, skipping upload");
            return Ok(());
        }
        self.remote.create_product(product).await
    }

    // =========================================================================
    // Bills
    // =========================================================================

    /// Finalizes a bill: computes line totals with checked arithmetic,
    /// persists locally, then pushes best-effort.
    pub async fn create_bill(
        &self,
        items: Vec<NewBillItem>,
        payment_method: PaymentMethod,
    ) -> SyncResult<Bill> {
        if items.is_empty() {
            return Err(CoreError::EmptyBill.into());
        }

        let mut lines = Vec::with_capacity(items.len());
        let mut subtotal = Money::zero();
        for item in items {
            validate_quantity(item.quantity)?;
            validate_price_cents(item.unit_price_cents)?;

            let line_total = Money::from_cents(item.unit_price_cents)
                .checked_mul(item.quantity)
                .ok_or_else(|| CoreError::MoneyOverflow {
                    context: "line total".to_string(),
                })?;
            subtotal = subtotal
                .checked_add(line_total)
                .ok_or_else(|| CoreError::MoneyOverflow {
                    context: "bill subtotal".to_string(),
                })?;

            lines.push(BillItem {
                product_id: item.product_id,
                barcode: item.barcode,
                name_snapshot: item.name,
                unit_price_cents: item.unit_price_cents,
                quantity: item.quantity,
                line_total_cents: line_total.cents(),
            });
        }

        let bill = {
            let _guard = self.cache_write.lock().await;

            let seq = self.local.next_sequence("B").await?;
            let bill = Bill {
                id: format_sequential_id("B", seq),
                items: lines,
                subtotal_cents: subtotal.cents(),
                total_cents: subtotal.cents(),
                payment_method,
                created_at: Utc::now(),
            };

            let mut bills = self.local.get_bills().await?;
            bills.push(bill.clone());
            self.local.save_bills(&bills).await?;
            bill
        };

        info!(id = %bill.id, total_cents = bill.total_cents, "Bill finalized locally");
        self.emit(SyncEventKind::BillCreated {
            id: bill.id.clone(),
        });

        let pushed = self.remote.create_bill(&bill).await;
        self.note_remote_leg("create_bill", pushed);

        Ok(bill)
    }

    /// The locally cached bills.
    pub async fn bills(&self) -> SyncResult<Vec<Bill>> {
        self.local.get_bills().await
    }

    // =========================================================================
    // Full Sync
    // =========================================================================

    /// Runs a full reconciliation pass now, regardless of the timer.
    ///
    /// Returns `Ok(true)` if a pass ran and completed, `Ok(false)` if it
    /// was skipped because another pass is in flight. At most one pass
    /// runs at a time; concurrent calls are silent no-ops.
    pub async fn force_sync(&self) -> SyncResult<bool> {
        self.full_sync().await
    }

    /// See [`force_sync`](Self::force_sync).
    pub async fn full_sync(&self) -> SyncResult<bool> {
        if self
            .sync_in_progress
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Full sync already in progress, skipping");
            return Ok(false);
        }

        let result = self.run_full_pass().await;
        self.sync_in_progress.store(false, Ordering::SeqCst);

        match result {
            Ok(counts) => {
                self.last_sync_time
                    .store(Utc::now().timestamp_millis(), Ordering::SeqCst);
                self.set_online(true);
                info!(
                    uploaded_products = counts.uploaded_products,
                    downloaded_products = counts.downloaded_products,
                    uploaded_bills = counts.uploaded_bills,
                    downloaded_bills = counts.downloaded_bills,
                    "Full sync complete"
                );
                self.emit(SyncEventKind::FullSync {
                    uploaded_products: counts.uploaded_products,
                    downloaded_products: counts.downloaded_products,
                    uploaded_bills: counts.uploaded_bills,
                    downloaded_bills: counts.downloaded_bills,
                });
                Ok(true)
            }
            Err(err) => {
                warn!(%err, "Full sync aborted, local cache unchanged");
                if err.is_retryable() {
                    self.set_online(false);
                }
                self.emit(SyncEventKind::SyncFailed {
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// The pass body: snapshot, plan, upload, then persist the staged
    /// downloads. All remote traffic happens before any local write, so
    /// a transport error anywhere aborts the pass with the local cache
    /// exactly as it was.
    async fn run_full_pass(&self) -> SyncResult<PassCounts> {
        let mut counts = PassCounts::default();

        let local_products = self.local.get_products().await?;
        let remote_products = self.remote.get_products().await?;
        let local_bills = self.local.get_bills().await?;
        let remote_bills = self.remote.get_bills().await?;

        let product_plan = plan_products(&local_products, &remote_products);
        let bill_plan = plan_bills(&local_bills, &remote_bills);

        for product in &product_plan.upload {
            // The snapshot may be stale: another register can have landed
            // this barcode since we fetched. Re-check before creating.
            if self
                .remote
                .find_product_by_barcode(&product.barcode)
                .await?
                .is_none()
            {
                self.remote.create_product(product).await?;
                counts.uploaded_products += 1;
            }
        }

        for bill in &bill_plan.upload {
            self.remote.create_bill(bill).await?;
            counts.uploaded_bills += 1;
        }

        // Remote traffic done. Persist the downloads against a FRESH
        // local read under the write lock: a user mutation that landed
        // while the pass was in flight must not be clobbered by the
        // pre-pass snapshot.
        if !product_plan.download.is_empty() || !bill_plan.download.is_empty() {
            let _guard = self.cache_write.lock().await;

            if !product_plan.download.is_empty() {
                let mut merged = self.local.get_products().await?;
                for product in product_plan.download {
                    let known = merged
                        .iter()
                        .any(|p| p.id == product.id || p.barcode == product.barcode);
                    if !known {
                        merged.push(product);
                        counts.downloaded_products += 1;
                    }
                }
                self.local.save_products(&merged).await?;
            }

            if !bill_plan.download.is_empty() {
                let mut merged = self.local.get_bills().await?;
                for bill in bill_plan.download {
                    if !merged.iter().any(|b| b.id == bill.id) {
                        merged.push(bill);
                        counts.downloaded_bills += 1;
                    }
                }
                self.local.save_bills(&merged).await?;
            }
        }

        Ok(counts)
    }

    // =========================================================================
    // Drift Check
    // =========================================================================

    /// The cheap periodic check: compares collection cardinality on both
    /// sides and escalates to a full pass on mismatch.
    ///
    /// Returns `Ok(true)` if drift was detected (and a full sync ran).
    /// Offline, or with a pass already in flight, this is a guaranteed
    /// no-op that issues ZERO remote calls.
    pub async fn check_drift(&self) -> SyncResult<bool> {
        if !self.is_online.load(Ordering::SeqCst) {
            debug!("Offline, skipping drift check");
            return Ok(false);
        }
        if self.sync_in_progress.load(Ordering::SeqCst) {
            debug!("Sync in progress, skipping drift check");
            return Ok(false);
        }

        let local_products = self.local.get_products().await?.len();
        let local_bills = self.local.get_bills().await?.len();

        let remote_products = match self.remote.get_products().await {
            Ok(products) => products.len(),
            Err(err) => {
                self.set_online(false);
                return Err(err);
            }
        };
        let remote_bills = match self.remote.get_bills().await {
            Ok(bills) => bills.len(),
            Err(err) => {
                self.set_online(false);
                return Err(err);
            }
        };

        if local_products == remote_products && local_bills == remote_bills {
            debug!("Cardinality matches, no drift");
            return Ok(false);
        }

        info!(
            local_products,
            remote_products, local_bills, remote_bills, "Cardinality drift, running full sync"
        );
        self.full_sync().await?;
        Ok(true)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
