//! # Reconciliation Planner
//!
//! Pure symmetric-difference planning for a full sync pass. No I/O here:
//! the planner sees two snapshots and says what should move where; the
//! service executes the plan against the stores.
//!
//! ## Identity Matching
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Product Identity Matching                           │
//! │                                                                         │
//! │  Same id on both sides          ──► same entity, nothing moves         │
//! │  Same barcode, different ids    ──► same LOGICAL entity (one side      │
//! │                                     created it before ids converged);  │
//! │                                     nothing moves, no duplicate made   │
//! │  id and barcode both unmatched  ──► record moves to the other side    │
//! │                                                                         │
//! │  Bills have no natural key: matching is by id only.                    │
//! │                                                                         │
//! │  MERGE POLICY: presence/absence only. A passive pass NEVER overwrites  │
//! │  an entity that exists on both sides - explicit update/delete          │
//! │  operations are the only authority for content changes.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;

use lumen_core::{Bill, Product};

// =============================================================================
// Reconcile Plan
// =============================================================================

/// What a full sync pass should move, in enumeration order.
#[derive(Debug, Clone, Default)]
pub struct ReconcilePlan<T> {
    /// Local-only records to upload.
    pub upload: Vec<T>,
    /// Remote-only records to download into the local cache.
    pub download: Vec<T>,
}

impl<T> ReconcilePlan<T> {
    /// True when both sides already agree on membership.
    pub fn is_empty(&self) -> bool {
        self.upload.is_empty() && self.download.is_empty()
    }
}

// =============================================================================
// Planners
// =============================================================================

/// Plans the product moves: symmetric difference by id, with the barcode
/// natural key as fallback so cross-origin duplicates collapse into one
/// logical record.
pub fn plan_products(local: &[Product], remote: &[Product]) -> ReconcilePlan<Product> {
    let remote_ids: HashSet<&str> = remote.iter().map(|p| p.id.as_str()).collect();
    let remote_barcodes: HashSet<&str> = remote.iter().map(|p| p.barcode.as_str()).collect();
    let local_ids: HashSet<&str> = local.iter().map(|p| p.id.as_str()).collect();
    let local_barcodes: HashSet<&str> = local.iter().map(|p| p.barcode.as_str()).collect();

    let upload = local
        .iter()
        .filter(|p| {
            !remote_ids.contains(p.id.as_str()) && !remote_barcodes.contains(p.barcode.as_str())
        })
        .cloned()
        .collect();

    let download = remote
        .iter()
        .filter(|p| {
            !local_ids.contains(p.id.as_str()) && !local_barcodes.contains(p.barcode.as_str())
        })
        .cloned()
        .collect();

    ReconcilePlan { upload, download }
}

/// Plans the bill moves: symmetric difference by id only.
pub fn plan_bills(local: &[Bill], remote: &[Bill]) -> ReconcilePlan<Bill> {
    let remote_ids: HashSet<&str> = remote.iter().map(|b| b.id.as_str()).collect();
    let local_ids: HashSet<&str> = local.iter().map(|b| b.id.as_str()).collect();

    let upload = local
        .iter()
        .filter(|b| !remote_ids.contains(b.id.as_str()))
        .cloned()
        .collect();

    let download = remote
        .iter()
        .filter(|b| !local_ids.contains(b.id.as_str()))
        .cloned()
        .collect();

    ReconcilePlan { upload, download }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use lumen_core::PaymentMethod;

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

    fn bill(id: &str) -> Bill {
        Bill {
            id: id.into(),
            items: vec![],
            subtotal_cents: 0,
            total_cents: 0,
            payment_method: PaymentMethod::Cash,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_symmetric_difference_by_id() {
        let local = vec![product("P-000001", "11111111"), product("P-000002", "22222222")];
        let remote = vec![product("P-000002", "22222222"), product("r-3", "33333333")];

        let plan = plan_products(&local, &remote);

        assert_eq!(plan.upload.len(), 1);
        assert_eq!(plan.upload[0].id, "P-000001");
        assert_eq!(plan.download.len(), 1);
        assert_eq!(plan.download[0].id, "r-3");
    }

    #[test]
    fn test_natural_key_collapses_cross_origin_duplicates() {
        // Same barcode, different ids: one logical product, nothing moves
        let local = vec![product("P-000001", "40063813")];
        let remote = vec![product("c9a1e2d0", "40063813")];

        let plan = plan_products(&local, &remote);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_both_sides_present_never_moves() {
        let local = vec![product("P-000001", "11111111")];
        let remote = vec![product("P-000001", "11111111")];

        assert!(plan_products(&local, &remote).is_empty());
    }

    #[test]
    fn test_empty_sides() {
        let one = vec![product("P-000001", "11111111")];

        let plan = plan_products(&one, &[]);
        assert_eq!(plan.upload.len(), 1);
        assert!(plan.download.is_empty());

        let plan = plan_products(&[], &one);
        assert!(plan.upload.is_empty());
        assert_eq!(plan.download.len(), 1);

        assert!(plan_products(&[], &[]).is_empty());
    }

    #[test]
    fn test_upload_preserves_enumeration_order() {
        let local = vec![
            product("P-000001", "11111111"),
            product("P-000002", "22222222"),
            product("P-000003", "33333333"),
        ];

        let plan = plan_products(&local, &[]);
        let ids: Vec<&str> = plan.upload.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["P-000001", "P-000002", "P-000003"]);
    }

    #[test]
    fn test_bills_match_by_id_only() {
        let local = vec![bill("B-000001"), bill("B-000002")];
        let remote = vec![bill("B-000002"), bill("B-000003")];

        let plan = plan_bills(&local, &remote);
        assert_eq!(plan.upload.len(), 1);
        assert_eq!(plan.upload[0].id, "B-000001");
        assert_eq!(plan.download.len(), 1);
        assert_eq!(plan.download[0].id, "B-000003");
    }
}
