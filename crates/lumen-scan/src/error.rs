//! # Scan Error Types
//!
//! Every failure the decoder can produce. None of these are ever raised
//! to the caller as a panic or a `Result` - they are delivered through
//! [`ScanSink::on_error`](crate::decoder::ScanSink::on_error), once per
//! rejected flush (and once at startup if the key source is unavailable).

use thiserror::Error;

/// Reasons a flush or the decoder itself can fail.
///
/// ## Rejection Ordering
/// A flushed buffer that is both out of bounds and non-numeric reports
/// `Length`, never both. Callers can rely on exactly one error per
/// rejected flush.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// Flushed buffer length is outside `[min, max]`.
    #[error("scan rejected: length {len} outside [{min}, {max}]")]
    Length { len: usize, min: usize, max: usize },

    /// Flushed buffer contains a non-digit character.
    #[error("scan rejected: '{text}' is not a numeric barcode")]
    Format { text: String },

    /// The keystroke source could not be subscribed at startup.
    ///
    /// The decoder emits this once and then stays inert: handle calls
    /// become no-ops and no further events are produced.
    #[error("keystroke source unavailable: {0}")]
    ListenerUnavailable(String),

    /// The supplied configuration is unusable (e.g. `min > max`).
    ///
    /// Like `ListenerUnavailable`, emitted once at startup; the decoder
    /// then stays inert.
    #[error("invalid scan configuration: {0}")]
    InvalidConfig(String),
}

impl ScanError {
    /// Returns true for the startup failures that leave the decoder inert.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ScanError::ListenerUnavailable(_) | ScanError::InvalidConfig(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScanError::Length {
            len: 7,
            min: 8,
            max: 20,
        };
        assert_eq!(err.to_string(), "scan rejected: length 7 outside [8, 20]");

        let err = ScanError::Format {
            text: "12a45678".into(),
        };
        assert!(err.to_string().contains("12a45678"));
    }

    #[test]
    fn test_fatal_classification() {
        assert!(ScanError::ListenerUnavailable("no window".into()).is_fatal());
        assert!(ScanError::InvalidConfig("min > max".into()).is_fatal());
        assert!(!ScanError::Format { text: "x".into() }.is_fatal());
    }
}
