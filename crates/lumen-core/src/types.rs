//! # Domain Types
//!
//! Core domain types used throughout Lumen POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Bill       │   │    BillItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  product_id     │       │
//! │  │  barcode (key)  │   │  items[]        │   │  name_snapshot  │       │
//! │  │  name           │   │  total_cents    │   │  unit_price     │       │
//! │  │  price_cents    │   │  payment_method │   │  quantity       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every product has:
//! - `id`: immutable identifier used for store relations. Born-offline
//!   records carry a human-readable sequential id (`P-000123`) until a
//!   remote id exists; sync matching falls back to the natural key.
//! - `barcode`: the natural key - what the scanner actually reads, and
//!   what the sync engine uses to detect cross-origin duplicates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier (UUID v4 when remote-assigned, `P-nnnnnn` when
    /// generated offline).
    pub id: String,

    /// Barcode (EAN-13, UPC-A, etc.) - the natural key.
    pub barcode: String,

    /// Display name shown to the cashier and on the bill.
    pub name: String,

    /// Optional description for product details.
    pub description: Option<String>,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Optional category label for catalog filtering.
    pub category: Option<String>,

    /// Current stock level, if tracked.
    pub stock: Option<i64>,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Card payment on external terminal.
    Card,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

// =============================================================================
// Bill Item
// =============================================================================

/// A line item on a bill.
/// Uses the snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillItem {
    /// The product this line refers to.
    pub product_id: String,
    /// Barcode at time of sale (frozen).
    pub barcode: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// Quantity sold.
    pub quantity: i64,
    /// Line total (unit_price × quantity).
    pub line_total_cents: i64,
}

impl BillItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Bill
// =============================================================================

/// A finalized sale bill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    /// Unique identifier (`B-nnnnnn` when generated offline).
    pub id: String,
    /// Line items, in the order they were rung up.
    pub items: Vec<BillItem>,
    /// Sum of line totals.
    pub subtotal_cents: i64,
    /// Final amount charged.
    pub total_cents: i64,
    /// How the customer paid.
    pub payment_method: PaymentMethod,
    /// When the bill was finalized.
    pub created_at: DateTime<Utc>,
}

impl Bill {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
