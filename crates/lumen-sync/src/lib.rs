//! # lumen-sync: Offline-First Sync Reconciler for Lumen POS
//!
//! Keeps the local cache and a remote store eventually consistent for
//! the product and bill collections, under unreliable connectivity,
//! without ever blocking a register on network latency.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          lumen-sync                                     │
//! │                                                                         │
//! │   Host UI ──► SyncService (service.rs)                                  │
//! │               │  local-first CRUD: cache leg is authoritative,         │
//! │               │  remote leg is best-effort                             │
//! │               │  full sync: symmetric difference + natural-key dedup   │
//! │               │  observers: SyncEvent fan-out (event.rs)               │
//! │               │                                                         │
//! │   platform ──► SyncAgent (agent.rs)                                     │
//! │   online/      periodic cardinality drift check, catch-up sync on      │
//! │   offline      the offline→online edge                                 │
//! │               │                                                         │
//! │               ▼                                                         │
//! │   LocalStore / RemoteStore traits (store.rs)                            │
//! │   reference in-memory backends with fault injection (memory.rs)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Consistency Model
//!
//! Availability over freshness. Every mutation is applied to the local
//! cache first and is immediately readable; records the remote leg
//! misses stay "present local, absent remote" and are rediscovered by
//! the next full pass. A passive pass moves records by presence only
//! and never overwrites an entity that exists on both sides.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tokio::sync::watch;
//! use lumen_sync::{
//!     MemoryLocalStore, MemoryRemoteStore, SyncAgent, SyncConfig, SyncService,
//! };
//!
//! # async fn demo() -> lumen_sync::SyncResult<()> {
//! let service = Arc::new(SyncService::new(
//!     Arc::new(MemoryLocalStore::new()),
//!     Arc::new(MemoryRemoteStore::new()),
//!     SyncConfig::default(),
//! )?);
//!
//! let (_connectivity_tx, connectivity_rx) = watch::channel(true);
//! let agent = SyncAgent::spawn(service.clone(), connectivity_rx);
//!
//! let sub = service.subscribe(|event| {
//!     println!("sync event: {:?}", event.kind);
//! });
//! // ... operate the register ...
//! sub.unsubscribe();
//! agent.shutdown().await;
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod agent;
pub mod config;
pub mod error;
pub mod event;
pub mod memory;
pub mod reconcile;
pub mod service;
pub mod store;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use agent::{SyncAgent, SyncAgentHandle};
pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use event::{SyncEvent, SyncEventKind};
pub use memory::{MemoryLocalStore, MemoryRemoteStore};
pub use reconcile::{plan_bills, plan_products, ReconcilePlan};
pub use service::{NewBillItem, NewProduct, SyncService, SyncStatus};
pub use store::{LocalStore, RemoteStore};
