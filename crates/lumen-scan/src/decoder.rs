//! # Scan Decoder Task
//!
//! The async shell around [`ScanSession`]: owns the debounce timer,
//! consumes the key-event stream, and delivers outcomes through the
//! [`ScanSink`] callbacks. Spawned once per scan surface and controlled
//! through a cloneable [`ScanDecoderHandle`].
//!
//! ## Task Anatomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       ScanDecoder task                                  │
//! │                                                                         │
//! │  tokio::select! {                                                       │
//! │      key event   ──► session.press() ──► Buffered / Flush / Ignored    │
//! │      command     ──► Reset (clear, no emission) | Shutdown             │
//! │      sleep_until ──► debounce fired  ──► session.flush_if_due()        │
//! │  }                                                                      │
//! │                                                                         │
//! │  • The pending deadline is recomputed every iteration, so each         │
//! │    buffered key supersedes the previous deferred flush                 │
//! │  • Teardown (shutdown or source closed) exits the loop, dropping       │
//! │    the timer with it - it can never fire against a dead session        │
//! │  • No outcome ever propagates as a panic or Result: exactly one of    │
//! │    on_scan/on_error fires per non-empty flush, nothing otherwise       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use lumen_core::error::ValidationError;
use lumen_core::validation::validate_barcode;

use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::keys::KeyEvent;
use crate::session::{KeyDisposition, ScanSession, ScanStatus};

// =============================================================================
// Host Seams
// =============================================================================

/// Receives decoder outcomes. Implemented by the host UI layer.
///
/// Both callbacks are fire-and-forget: the decoder never inspects a
/// return value and keeps running whatever the sink does.
pub trait ScanSink: Send + Sync + 'static {
    /// Called once per accepted scan with the validated barcode.
    fn on_scan(&self, barcode: &str);

    /// Called once per rejected flush, and once at startup if the
    /// decoder could not be brought up.
    fn on_error(&self, error: &ScanError);
}

/// Provides the raw key-event stream.
///
/// `subscribe` runs once at spawn. A source that cannot deliver events
/// (e.g. no interactive window exists) returns an error, which degrades
/// the decoder to an inert no-op after a single `on_error`.
pub trait KeySource: Send + 'static {
    fn subscribe(&mut self) -> Result<mpsc::Receiver<KeyEvent>, ScanError>;
}

// =============================================================================
// Channel Key Source
// =============================================================================

/// The standard [`KeySource`]: a bounded channel the host pushes raw key
/// events into via a [`KeyFeed`].
pub struct ChannelKeySource {
    rx: Option<mpsc::Receiver<KeyEvent>>,
}

impl ChannelKeySource {
    /// Creates a source and its feeding half.
    pub fn new(capacity: usize) -> (Self, KeyFeed) {
        let (tx, rx) = mpsc::channel(capacity);
        (ChannelKeySource { rx: Some(rx) }, KeyFeed { tx })
    }
}

impl KeySource for ChannelKeySource {
    fn subscribe(&mut self) -> Result<mpsc::Receiver<KeyEvent>, ScanError> {
        self.rx
            .take()
            .ok_or_else(|| ScanError::ListenerUnavailable("key stream already taken".into()))
    }
}

/// The host's handle for forwarding key events into the decoder.
#[derive(Clone)]
pub struct KeyFeed {
    tx: mpsc::Sender<KeyEvent>,
}

impl KeyFeed {
    /// Forwards one key event. A shut-down decoder simply drops it.
    pub async fn press(&self, event: KeyEvent) {
        let _ = self.tx.send(event).await;
    }
}

// =============================================================================
// Decoder Commands
// =============================================================================

enum Command {
    /// Clear the buffer without emitting (mode switches).
    Reset,
    /// Stop the task.
    Shutdown,
}

// =============================================================================
// Scan Decoder
// =============================================================================

/// Spawns and wires the decoder task.
pub struct ScanDecoder;

impl ScanDecoder {
    /// Starts the decoder.
    ///
    /// Never fails: an unusable config or an unavailable key source is
    /// reported once through `sink.on_error` and the returned handle is
    /// inert (all operations are no-ops).
    pub fn spawn(
        config: ScanConfig,
        mut source: impl KeySource,
        sink: Arc<dyn ScanSink>,
    ) -> ScanDecoderHandle {
        if let Err(e) = config.validate() {
            warn!(%e, "scan decoder not started");
            sink.on_error(&e);
            return ScanDecoderHandle::inert();
        }

        let keys = match source.subscribe() {
            Ok(rx) => rx,
            Err(e) => {
                warn!(%e, "scan decoder not started");
                sink.on_error(&e);
                return ScanDecoderHandle::inert();
            }
        };

        let status = Arc::new(RwLock::new(ScanStatus::default()));
        let (cmd_tx, cmd_rx) = mpsc::channel(16);

        tokio::spawn(Self::run(config, keys, cmd_rx, sink, status.clone()));

        ScanDecoderHandle { cmd_tx, status }
    }

    /// Main decoder loop. Runs until shutdown or until the key source
    /// closes.
    async fn run(
        config: ScanConfig,
        mut keys: mpsc::Receiver<KeyEvent>,
        mut cmd_rx: mpsc::Receiver<Command>,
        sink: Arc<dyn ScanSink>,
        status: Arc<RwLock<ScanStatus>>,
    ) {
        info!(
            min_length = config.min_length,
            max_length = config.max_length,
            inter_key_timeout_ms = config.inter_key_timeout_ms,
            capture_keys = config.capture_keys,
            "Scan decoder started"
        );

        let (min, max) = (config.min_length, config.max_length);
        let mut session = ScanSession::new(config);

        loop {
            let deadline = session.deadline();

            tokio::select! {
                maybe_event = keys.recv() => {
                    let Some(event) = maybe_event else {
                        debug!("Key source closed, decoder stopping");
                        break;
                    };

                    match session.press(&event, Instant::now()) {
                        KeyDisposition::Ignored => {}
                        KeyDisposition::Buffered { .. } => {
                            debug!(buffer = %session.buffer(), "Key buffered");
                        }
                        KeyDisposition::Flush { text, .. } => {
                            Self::finalize(&text, min, max, sink.as_ref());
                        }
                    }

                    *status.write().await = session.status();
                }

                Some(cmd) = cmd_rx.recv() => {
                    match cmd {
                        Command::Reset => {
                            debug!("Buffer reset requested");
                            session.reset();
                            *status.write().await = session.status();
                        }
                        Command::Shutdown => {
                            debug!("Decoder shutdown requested");
                            break;
                        }
                    }
                }

                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)),
                        if deadline.is_some() => {
                    if let Some(text) = session.flush_if_due(Instant::now()) {
                        debug!(text = %text, "Debounce flush");
                        Self::finalize(&text, min, max, sink.as_ref());
                    }
                    *status.write().await = session.status();
                }
            }
        }

        info!("Scan decoder stopped");
    }

    /// Validates a flushed buffer and emits exactly one sink callback.
    ///
    /// An empty (post-trim) buffer emits nothing at all.
    fn finalize(text: &str, min: usize, max: usize, sink: &dyn ScanSink) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return;
        }

        match validate_barcode(trimmed, min, max) {
            Ok(barcode) => {
                info!(barcode = %barcode, "Scan accepted");
                sink.on_scan(&barcode);
            }
            Err(ValidationError::TooShort { .. }) | Err(ValidationError::TooLong { .. }) => {
                let err = ScanError::Length {
                    len: trimmed.len(),
                    min,
                    max,
                };
                debug!(%err, "Scan rejected");
                sink.on_error(&err);
            }
            Err(_) => {
                let err = ScanError::Format {
                    text: trimmed.to_string(),
                };
                debug!(%err, "Scan rejected");
                sink.on_error(&err);
            }
        }
    }
}

// =============================================================================
// Decoder Handle
// =============================================================================

/// Cloneable control handle for a running decoder.
#[derive(Clone)]
pub struct ScanDecoderHandle {
    cmd_tx: mpsc::Sender<Command>,
    status: Arc<RwLock<ScanStatus>>,
}

impl ScanDecoderHandle {
    /// A handle whose operations are all no-ops (startup failed).
    fn inert() -> Self {
        let (cmd_tx, _) = mpsc::channel(1);
        ScanDecoderHandle {
            cmd_tx,
            status: Arc::new(RwLock::new(ScanStatus::default())),
        }
    }

    /// Forces ACCUMULATING → IDLE without emitting anything.
    ///
    /// Used when the host switches modes and a half-captured burst must
    /// not surface later.
    pub async fn reset_buffer(&self) {
        let _ = self.cmd_tx.send(Command::Reset).await;
    }

    /// Returns a display snapshot of the decoder state.
    ///
    /// Snapshot semantics: the value reflects the state at call time and
    /// is not live-bound; do not use it for decision logic.
    pub async fn status(&self) -> ScanStatus {
        self.status.read().await.clone()
    }

    /// Stops the decoder task, clearing any pending debounce flush.
    pub async fn shutdown(&self) {
        let _ = self.cmd_tx.send(Command::Shutdown).await;
    }
}

// =============================================================================
// Tests
// =============================================================================
