//! # Scan Configuration
//!
//! Caller-supplied tuning for the decoder. The timing threshold and the
//! length bounds are empirically tuned heuristics, not derived constants;
//! treat them as configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use lumen_core::{DEFAULT_MAX_BARCODE_LEN, DEFAULT_MIN_BARCODE_LEN};

use crate::error::ScanError;

// =============================================================================
// Scan Configuration
// =============================================================================

/// Decoder configuration.
///
/// ## Field Interplay
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  inter_key_timeout_ms (100ms default)                                   │
/// │  ──────────────────────────────────                                     │
/// │  • A char arriving within this window of the previous one is           │
/// │    machine-speed (scanners emit keys every 10-30ms)                    │
/// │  • Doubles as the debounce quiet period that forces a flush            │
/// │                                                                         │
/// │  capture_keys (false default)                                          │
/// │  ────────────────────────────                                          │
/// │  • false: keys are ignored while a text-entry field has focus, so     │
/// │    the decoder never steals manual input                               │
/// │  • true: dedicated scan mode - focus suppression is bypassed and      │
/// │    consumed keys should be swallowed by the host (prevent default)    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Minimum accepted barcode length.
    #[serde(default = "default_min_length")]
    pub min_length: usize,

    /// Maximum accepted barcode length.
    #[serde(default = "default_max_length")]
    pub max_length: usize,

    /// Maximum silence between two keys of one burst, and the debounce
    /// quiet period (milliseconds).
    #[serde(default = "default_inter_key_timeout_ms")]
    pub inter_key_timeout_ms: u64,

    /// Whether the decoder owns the keyboard exclusively (scan mode).
    #[serde(default)]
    pub capture_keys: bool,
}

fn default_min_length() -> usize {
    DEFAULT_MIN_BARCODE_LEN
}

fn default_max_length() -> usize {
    DEFAULT_MAX_BARCODE_LEN
}

fn default_inter_key_timeout_ms() -> u64 {
    100
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            min_length: default_min_length(),
            max_length: default_max_length(),
            inter_key_timeout_ms: default_inter_key_timeout_ms(),
            capture_keys: false,
        }
    }
}

impl ScanConfig {
    /// Returns the inter-key timeout as a `Duration`.
    #[inline]
    pub fn inter_key_timeout(&self) -> Duration {
        Duration::from_millis(self.inter_key_timeout_ms)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.min_length == 0 {
            return Err(ScanError::InvalidConfig(
                "min_length must be at least 1".into(),
            ));
        }

        if self.min_length > self.max_length {
            return Err(ScanError::InvalidConfig(format!(
                "min_length ({}) exceeds max_length ({})",
                self.min_length, self.max_length
            )));
        }

        if self.inter_key_timeout_ms == 0 {
            return Err(ScanError::InvalidConfig(
                "inter_key_timeout_ms must be nonzero".into(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScanConfig::default();
        assert_eq!(config.min_length, 8);
        assert_eq!(config.max_length, 20);
        assert_eq!(config.inter_key_timeout_ms, 100);
        assert!(!config.capture_keys);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let config = ScanConfig {
            min_length: 21,
            max_length: 20,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ScanError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = ScanConfig {
            inter_key_timeout_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_with_partial_fields() {
        let config: ScanConfig = serde_json::from_str(r#"{"capture_keys": true}"#).unwrap();
        assert!(config.capture_keys);
        assert_eq!(config.min_length, 8);
    }
}
