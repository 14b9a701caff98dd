//! # Sync Events
//!
//! Tagged notifications delivered to `onSync` observers after every
//! state-changing pass and every manual mutation. Observers register via
//! [`SyncService::subscribe`](crate::service::SyncService::subscribe) and
//! receive events through the shared observer registry, so a panicking
//! listener never aborts a pass.

use chrono::{DateTime, Utc};
use serde::Serialize;

// =============================================================================
// Sync Event
// =============================================================================

/// One sync notification: what changed, and when.
#[derive(Debug, Clone, Serialize)]
pub struct SyncEvent {
    /// What happened.
    #[serde(flatten)]
    pub kind: SyncEventKind,

    /// When the change was observed.
    pub timestamp: DateTime<Utc>,
}

impl SyncEvent {
    /// Stamps a kind with the current time.
    pub fn now(kind: SyncEventKind) -> Self {
        SyncEvent {
            kind,
            timestamp: Utc::now(),
        }
    }
}

/// The kinds of change a sync observer can see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncEventKind {
    /// A full reconciliation pass completed, with per-collection counts
    /// of records that moved.
    FullSync {
        uploaded_products: usize,
        downloaded_products: usize,
        uploaded_bills: usize,
        downloaded_bills: usize,
    },

    /// A product was created locally.
    ProductCreated { id: String },

    /// A product was updated locally.
    ProductUpdated { id: String },

    /// A product was deleted locally.
    ProductDeleted { id: String },

    /// A bill was finalized locally.
    BillCreated { id: String },

    /// Connectivity transitioned to online.
    Online,

    /// Connectivity transitioned to offline.
    Offline,

    /// A full sync pass aborted. Local state is unchanged and usable;
    /// the pass will be re-attempted later.
    SyncFailed { message: String },
}
