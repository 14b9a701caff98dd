//! # Validation Module
//!
//! Input validation utilities for Lumen POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Host UI                                                      │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Scan flush validation (length bounds, digit-only)                 │
//! │  └── Product/bill field validation before persistence                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Storage backend (out of scope)                               │
//! │  └── Uniqueness and referential constraints                            │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::MAX_LINE_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Barcode Validators
// =============================================================================

/// Validates a flushed scan buffer as a barcode.
///
/// ## Rules
/// - Input is trimmed first
/// - Length must be within `[min, max]` - checked FIRST
/// - Every character must be an ASCII decimal digit - checked SECOND
///
/// The ordering matters: a string that is both out of bounds and
/// non-numeric reports the length failure, never both. Callers rely on
/// exactly one rejection reason per flush.
///
/// ## Example
/// ```rust
/// use lumen_core::validation::validate_barcode;
///
/// assert!(validate_barcode("4006381333931", 8, 20).is_ok());
/// assert!(validate_barcode("123", 8, 20).is_err());      // too short
/// assert!(validate_barcode("12a45678", 8, 20).is_err()); // not digits
/// ```
pub fn validate_barcode(text: &str, min: usize, max: usize) -> ValidationResult<String> {
    let text = text.trim();

    if text.len() < min {
        return Err(ValidationError::TooShort {
            field: "barcode".to_string(),
            min,
        });
    }

    if text.len() > max {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max,
        });
    }

    if !text.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must contain only digits".to_string(),
        });
    }

    Ok(text.to_string())
}

/// Returns true if a character may enter the scan accumulation buffer.
///
/// Accumulation is deliberately looser than final validity: scanners for
/// Code128 labels emit letters, hyphens and underscores mid-burst, and
/// rejecting them per-key would split one burst into several garbage
/// flushes. The digits-only rule applies at flush time instead.
#[inline]
pub fn is_accumulable_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

// =============================================================================
// Product Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 200 characters
///
/// ## Example
/// ```rust
/// use lumen_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Coca-Cola 330ml").is_ok());
/// assert!(validate_product_name("").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items)
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a line item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
