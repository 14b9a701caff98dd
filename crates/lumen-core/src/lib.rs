//! # lumen-core: Pure Domain Logic for Lumen POS
//!
//! This crate is the bottom layer of Lumen POS. It contains the domain
//! types and pure logic shared by the scan decoder and the sync engine.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Lumen POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Host UI (out of scope)                       │   │
//! │  │    Catalog ──► Cart ──► Billing ──► Scan mode                   │   │
//! │  └───────────────┬─────────────────────────────┬───────────────────┘   │
//! │                  │ key events                  │ CRUD + status          │
//! │  ┌───────────────▼───────────┐   ┌─────────────▼───────────────────┐   │
//! │  │       lumen-scan          │   │          lumen-sync             │   │
//! │  │  keystroke state machine  │   │  local-first reconciliation     │   │
//! │  └───────────────┬───────────┘   └─────────────┬───────────────────┘   │
//! │                  │                             │                        │
//! │  ┌───────────────▼─────────────────────────────▼───────────────────┐   │
//! │  │               ★ lumen-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │   │
//! │  │   │   types   │  │   money   │  │validation │  │ observer  │   │   │
//! │  │   │  Product  │  │   Money   │  │  barcode  │  │Subscribers│   │   │
//! │  │   │   Bill    │  │  (cents)  │  │   rules   │  │  registry │   │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Bill, BillItem, PaymentMethod)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Input and barcode validation rules
//! - [`observer`] - Broadcast notification registry shared by both engines
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use lumen_core::money::Money;
//! use lumen_core::validation::validate_barcode;
//!
//! // Create money from cents (never from floats!)
//! let price = Money::from_cents(1099); // $10.99
//! let line_total = price * 3;
//! assert_eq!(line_total.cents(), 3297);
//!
//! // A scanned barcode must be digits-only within the length bounds
//! assert!(validate_barcode("4006381333931", 8, 20).is_ok());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod observer;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use lumen_core::Money` instead of
// `use lumen_core::money::Money`

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use observer::{Subscribers, Subscription};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default minimum accepted barcode length.
///
/// ## Why 8?
/// The shortest symbology the store hardware emits is EAN-8. Anything
/// shorter is almost certainly stray human typing that slipped past the
/// timing heuristic.
pub const DEFAULT_MIN_BARCODE_LEN: usize = 8;

/// Default maximum accepted barcode length.
///
/// Covers EAN-13, UPC-A, ITF-14 and the in-store Code128 labels with
/// headroom. Longer bursts are treated as malformed input.
pub const DEFAULT_MAX_BARCODE_LEN: usize = 20;

/// Maximum quantity of a single line item on a bill.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;
