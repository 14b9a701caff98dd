//! # Sync Error Types
//!
//! Error types for sync operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │   Transport     │  │     Local       │  │    Configuration        │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Transport      │  │  NotFound       │  │  InvalidConfig          │ │
//! │  │  (best-effort,  │  │  Storage        │  │  ConfigLoadFailed       │ │
//! │  │   retryable)    │  │  (hard errors)  │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  PROPAGATION POLICY                                                    │
//! │  • Background pass errors: caught, logged, turned into a SyncFailed   │
//! │    event - never propagated out of the periodic timer                  │
//! │  • Remote leg of a user mutation: caught, logged, local state stays   │
//! │    authoritative                                                       │
//! │  • Local leg of a user mutation: propagates (NotFound means the edit  │
//! │    was rejected outright, not merely "not yet synced")                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type covering all possible sync failures.
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// A remote call failed (network, auth, schema).
    #[error("Remote store error: {0}")]
    Transport(String),

    // =========================================================================
    // Local Errors
    // =========================================================================
    /// An update/delete targeted an id absent from the local cache.
    ///
    /// This is the one hard failure a caller must handle: the edit was
    /// rejected outright, as opposed to merely "not yet synced".
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The local cache failed to read or persist a collection.
    #[error("Local store error: {0}")]
    Storage(String),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid sync configuration.
    #[error("Invalid sync configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    // =========================================================================
    // Domain Errors
    // =========================================================================
    /// Input validation failed before the local leg was applied.
    #[error("Validation error: {0}")]
    Validation(#[from] lumen_core::ValidationError),

    /// A domain computation failed (e.g. money overflow on bill totals).
    #[error("Domain error: {0}")]
    Core(#[from] lumen_core::CoreError),

    // =========================================================================
    // Serialization
    // =========================================================================
    /// Failed to serialize or deserialize a record.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::SerializationFailed(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization (for retry logic)
// =============================================================================

impl SyncError {
    /// Returns true if this error is recoverable and the operation will
    /// be re-attempted by a later pass.
    ///
    /// ## Retryable Errors
    /// - Transport failures: the affected record stays "present local,
    ///   absent remote" and is rediscovered by the next full sync's
    ///   symmetric-difference scan.
    ///
    /// ## Non-Retryable Errors
    /// - NotFound (the edit was rejected)
    /// - Configuration and validation errors
    pub fn is_retryable(&self) -> bool {
        matches!(self, SyncError::Transport(_))
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_) | SyncError::ConfigLoadFailed(_)
        )
    }
}
