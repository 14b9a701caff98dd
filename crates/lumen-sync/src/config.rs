//! # Sync Configuration
//!
//! Configuration for the sync engine.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. TOML Config File (caller-supplied path)                            │
//! │     sync.toml                                                          │
//! │                                                                         │
//! │  2. Default Values                                                     │
//! │     10s drift-check interval, startup sync enabled                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # sync.toml
//! sync_interval_secs = 10
//! startup_sync = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{SyncError, SyncResult};

// =============================================================================
// Sync Configuration
// =============================================================================

/// Sync behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Interval between incremental drift checks (seconds).
    ///
    /// The check compares only collection cardinality, so it is cheap to
    /// run often; a mismatch escalates to a full sync.
    #[serde(default = "default_sync_interval")]
    pub sync_interval_secs: u64,

    /// Whether to run a full sync when the agent starts (and is online).
    #[serde(default = "default_startup_sync")]
    pub startup_sync: bool,
}

fn default_sync_interval() -> u64 {
    10
}

fn default_startup_sync() -> bool {
    true
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            sync_interval_secs: default_sync_interval(),
            startup_sync: default_startup_sync(),
        }
    }
}

impl SyncConfig {
    /// Loads configuration from a TOML file, falling back to defaults if
    /// no path is given or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> SyncResult<Self> {
        match path {
            Some(p) if p.exists() => {
                debug!(path = %p.display(), "Loading sync config");
                let raw = std::fs::read_to_string(p)?;
                let config: SyncConfig = toml::from_str(&raw)?;
                config.validate()?;
                info!(path = %p.display(), "Sync config loaded");
                Ok(config)
            }
            _ => {
                debug!("No sync config file, using defaults");
                Ok(SyncConfig::default())
            }
        }
    }

    /// Returns the drift-check interval as a `Duration`.
    #[inline]
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SyncResult<()> {
        if self.sync_interval_secs == 0 {
            return Err(SyncError::InvalidConfig(
                "sync_interval_secs must be nonzero".into(),
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
        let config = SyncConfig::default();
        assert_eq!(config.sync_interval_secs, 10);
        assert!(config.startup_sync);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: SyncConfig = toml::from_str("sync_interval_secs = 30").unwrap();
        assert_eq!(config.sync_interval_secs, 30);
        assert!(config.startup_sync);
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = SyncConfig {
            sync_interval_secs: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SyncError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_load_missing_path_uses_defaults() {
        let config = SyncConfig::load_or_default(None).unwrap();
        assert_eq!(config.sync_interval_secs, 10);

        let config =
            SyncConfig::load_or_default(Some(Path::new("/nonexistent/sync.toml"))).unwrap();
        assert_eq!(config.sync_interval_secs, 10);
    }
}
