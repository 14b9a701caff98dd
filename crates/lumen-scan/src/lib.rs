//! # lumen-scan: Barcode Keystroke Decoder
//!
//! A USB/HID barcode scanner is, to the platform, just a very fast
//! keyboard. This crate classifies a live keystroke stream as either
//! incidental human typing or machine-speed scanner input, buffers the
//! burst, flushes it on a terminator key or a quiet period, validates the
//! result, and emits a clean scan event.
//!
//! ## Decode Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Scan Decode Pipeline                             │
//! │                                                                         │
//! │  raw key events            pure state machine         host callbacks    │
//! │  ──────────────            ──────────────────         ──────────────    │
//! │                                                                         │
//! │  KeySource ──► ScanDecoder ──► ScanSession ──┬── flush ──► validate     │
//! │  (subscribe)   (tokio task)    IDLE ⇄ ACCUM  │            │             │
//! │                     │                        │            ├─ ok ──────► │
//! │                     │ debounce deadline      │            │  on_scan    │
//! │                     └── sleep_until ─────────┘            └─ reject ──► │
//! │                         (quiet period)                       on_error   │
//! │                                                                         │
//! │  FLUSH TRIGGERS:                                                       │
//! │  • Enter with a non-empty buffer (terminator)                          │
//! │  • inter_key_timeout of silence (debounce)                             │
//! │  • resetBuffer() - clears WITHOUT emitting                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - `ScanConfig` (length bounds, timing, capture mode)
//! - [`keys`] - `Key`/`KeyEvent` input types
//! - [`session`] - Pure IDLE/ACCUMULATING state machine (no timers)
//! - [`decoder`] - Async decoder task, debounce timer, sink delivery
//! - [`error`] - `ScanError` taxonomy
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lumen_scan::{ChannelKeySource, ScanConfig, ScanDecoder, ScanSink};
//!
//! let (source, feed) = ChannelKeySource::new(64);
//! let decoder = ScanDecoder::spawn(ScanConfig::default(), source, sink);
//!
//! // Host forwards every raw key event:
//! feed.press(KeyEvent::char('4')).await;
//! // ... sink.on_scan("4006381333931") fires after the burst
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod decoder;
pub mod error;
pub mod keys;
pub mod session;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::ScanConfig;
pub use decoder::{ChannelKeySource, KeyFeed, KeySource, ScanDecoder, ScanDecoderHandle, ScanSink};
pub use error::ScanError;
pub use keys::{Key, KeyEvent};
pub use session::{KeyDisposition, ScanSession, ScanStatus};
