//! # Scan Session State Machine
//!
//! The pure heart of the decoder: a two-state accumulator with no timers,
//! no channels and no callbacks. Time enters only as `Instant` arguments,
//! which keeps every transition deterministic and unit-testable; the
//! async layer in [`decoder`](crate::decoder) owns the actual clock.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │            qualifying char                 qualifying char              │
//! │   ┌──────┐ ───────────────► ┌──────────────┐ ──┐ (buffer grows,        │
//! │   │ IDLE │                  │ ACCUMULATING │ ◄─┘  deadline resets)     │
//! │   └──────┘ ◄─────────────── └──────────────┘                           │
//! │              flush: Enter with non-empty buffer,                       │
//! │                     debounce deadline reached (timer, or a late        │
//! │                     key observing the elapsed deadline),               │
//! │                     or explicit reset (no emission)                    │
//! │                                                                         │
//! │  INVARIANT: buffer is non-empty  ⇔  state is ACCUMULATING              │
//! │             a flush always empties both together                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Classification Heuristic
//! Timing segments the stream into bursts: a character within
//! `inter_key_timeout` of the previous accepted key continues the
//! current burst, while a longer gap closes the previous burst (its
//! stale buffer is flushed through validation) and starts a new one
//! with the arriving key. The first character of a burst is therefore
//! always admitted on faith; machine-speed continuation is what lets a
//! scanner burst grow to a valid length, and slow human typing splits
//! into short per-burst fragments that fail the length check at flush.

use tokio::time::Instant;

use lumen_core::validation::is_accumulable_char;

use crate::config::ScanConfig;
use crate::keys::{Key, KeyEvent};

// =============================================================================
// Key Disposition
// =============================================================================

/// What the session decided to do with one key event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyDisposition {
    /// Not part of a scan; the host should process the key normally.
    Ignored,

    /// The character entered the buffer. When `capture` is true the host
    /// must suppress the key's default action and propagation so it does
    /// not leak into a focused field.
    Buffered { capture: bool },

    /// A buffer was finalized: by the terminator, or by a late key whose
    /// gap closed the previous burst (in which case the late key has
    /// already started a new one). `capture` mirrors the triggering
    /// key's suppression in capture mode.
    Flush { text: String, capture: bool },
}

// =============================================================================
// Status Snapshot
// =============================================================================

/// Read-only session status for display purposes.
///
/// This is a snapshot, not a live-bound reference; do not use it for
/// decision logic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStatus {
    /// True while mid-scan.
    pub is_scanning: bool,
    /// Characters accumulated since the last flush.
    pub buffer: String,
}

// =============================================================================
// Scan Session
// =============================================================================

/// Ephemeral per-burst state. Created empty, mutated on every qualifying
/// keystroke, reset to empty on flush.
#[derive(Debug)]
pub struct ScanSession {
    config: ScanConfig,
    buffer: String,
    last_key_at: Option<Instant>,
}

impl ScanSession {
    /// Creates an idle session. The config must already be validated.
    pub fn new(config: ScanConfig) -> Self {
        ScanSession {
            config,
            buffer: String::new(),
            last_key_at: None,
        }
    }

    /// True once the session believes it is mid-scan.
    #[inline]
    pub fn is_scanning(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// The accumulated characters since the last flush.
    #[inline]
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Returns a display snapshot of the current state.
    pub fn status(&self) -> ScanStatus {
        ScanStatus {
            is_scanning: self.is_scanning(),
            buffer: self.buffer.clone(),
        }
    }

    /// The debounce deadline: the instant at which, absent further keys,
    /// the buffer must be flushed. `None` while idle.
    pub fn deadline(&self) -> Option<Instant> {
        if self.is_scanning() {
            self.last_key_at
                .map(|t| t + self.config.inter_key_timeout())
        } else {
            None
        }
    }

    /// Feeds one key event into the state machine.
    pub fn press(&mut self, event: &KeyEvent, now: Instant) -> KeyDisposition {
        // Focus suppression: without capture mode, never steal keys
        // (the terminator included) from a manual-entry field.
        if !self.config.capture_keys && event.text_input_focused {
            return KeyDisposition::Ignored;
        }

        match event.key {
            Key::Enter => {
                // Terminator: flush a non-empty buffer immediately. An
                // Enter while idle is ordinary typing.
                if self.is_scanning() {
                    KeyDisposition::Flush {
                        text: self.take_buffer(),
                        capture: self.config.capture_keys,
                    }
                } else {
                    KeyDisposition::Ignored
                }
            }

            Key::Char(c) => {
                if !is_accumulable_char(c) {
                    return KeyDisposition::Ignored;
                }

                // Burst boundary: a gap past the inter-key window means
                // the buffered characters belong to the previous burst.
                // Flush them and let this key start a new one.
                let stale = self.flush_if_due(now);

                self.buffer.push(c);
                self.last_key_at = Some(now);

                match stale {
                    Some(text) => KeyDisposition::Flush {
                        text,
                        capture: self.config.capture_keys,
                    },
                    None => KeyDisposition::Buffered {
                        capture: self.config.capture_keys,
                    },
                }
            }

            Key::Other => KeyDisposition::Ignored,
        }
    }

    /// Checks whether the debounce deadline has passed and, if so,
    /// flushes. Returns the flushed text, or `None` if nothing was due.
    pub fn flush_if_due(&mut self, now: Instant) -> Option<String> {
        match self.deadline() {
            Some(deadline) if now >= deadline => Some(self.take_buffer()),
            _ => None,
        }
    }

    /// Forces ACCUMULATING → IDLE without emission.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.last_key_at = None;
    }

    /// Empties the buffer and clears the timing state together,
    /// preserving the buffer/scanning invariant.
    fn take_buffer(&mut self) -> String {
        self.last_key_at = None;
        std::mem::take(&mut self.buffer)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn session() -> ScanSession {
        ScanSession::new(ScanConfig::default())
    }

    fn capture_session() -> ScanSession {
        ScanSession::new(ScanConfig {
            capture_keys: true,
            ..Default::default()
        })
    }

    #[test]
    fn test_starts_idle() {
        let s = session();
        assert!(!s.is_scanning());
        assert_eq!(s.buffer(), "");
        assert!(s.deadline().is_none());
    }

    #[test]
    fn test_char_starts_accumulating() {
        let mut s = session();
        let now = Instant::now();

        let d = s.press(&KeyEvent::char('4'), now);
        assert_eq!(d, KeyDisposition::Buffered { capture: false });
        assert!(s.is_scanning());
        assert_eq!(s.buffer(), "4");
        assert_eq!(s.deadline(), Some(now + Duration::from_millis(100)));
    }

    #[test]
    fn test_fast_keys_extend_buffer_and_deadline() {
        let mut s = session();
        let t0 = Instant::now();

        s.press(&KeyEvent::char('1'), t0);
        s.press(&KeyEvent::char('2'), t0 + Duration::from_millis(20));
        s.press(&KeyEvent::char('3'), t0 + Duration::from_millis(40));

        assert_eq!(s.buffer(), "123");
        // Debounce, not interval: deadline tracks the LAST key
        assert_eq!(
            s.deadline(),
            Some(t0 + Duration::from_millis(140))
        );
    }

    #[test]
    fn test_enter_flushes_non_empty_buffer() {
        let mut s = session();
        let now = Instant::now();

        for c in "10000000".chars() {
            s.press(&KeyEvent::char(c), now);
        }

        let d = s.press(&KeyEvent::enter(), now);
        assert_eq!(
            d,
            KeyDisposition::Flush {
                text: "10000000".into(),
                capture: false
            }
        );
        assert!(!s.is_scanning());
        assert_eq!(s.buffer(), "");
    }

    #[test]
    fn test_enter_while_idle_is_ignored() {
        let mut s = session();
        assert_eq!(s.press(&KeyEvent::enter(), Instant::now()), KeyDisposition::Ignored);
    }

    #[test]
    fn test_timeout_flush() {
        let mut s = session();
        let t0 = Instant::now();

        s.press(&KeyEvent::char('1'), t0);
        s.press(&KeyEvent::char('2'), t0 + Duration::from_millis(10));

        // Not due yet
        assert_eq!(s.flush_if_due(t0 + Duration::from_millis(50)), None);
        // Quiet period elapsed since the last key
        assert_eq!(
            s.flush_if_due(t0 + Duration::from_millis(111)),
            Some("12".into())
        );
        assert!(!s.is_scanning());
    }

    #[test]
    fn test_focus_suppression_without_capture() {
        let mut s = session();
        let d = s.press(&KeyEvent::char_in_field('5'), Instant::now());
        assert_eq!(d, KeyDisposition::Ignored);
        assert!(!s.is_scanning());
    }

    #[test]
    fn test_enter_in_focused_field_is_suppressed() {
        // The terminator gets the same focus guard as characters: an
        // Enter typed into a search box must not flush an earlier buffer
        let mut s = session();
        let now = Instant::now();
        s.press(&KeyEvent::char('9'), now);

        let d = s.press(
            &KeyEvent {
                key: Key::Enter,
                text_input_focused: true,
            },
            now,
        );
        assert_eq!(d, KeyDisposition::Ignored);
        assert!(s.is_scanning());
        assert_eq!(s.buffer(), "9");
    }

    #[test]
    fn test_capture_mode_enter_flushes_despite_focus() {
        let mut s = capture_session();
        let now = Instant::now();
        s.press(&KeyEvent::char_in_field('9'), now);

        let d = s.press(
            &KeyEvent {
                key: Key::Enter,
                text_input_focused: true,
            },
            now,
        );
        assert_eq!(
            d,
            KeyDisposition::Flush {
                text: "9".into(),
                capture: true
            }
        );
    }

    #[test]
    fn test_late_key_closes_previous_burst() {
        let mut s = session();
        let t0 = Instant::now();

        s.press(&KeyEvent::char('1'), t0);
        s.press(&KeyEvent::char('2'), t0 + Duration::from_millis(50));

        // 200ms of silence: this key belongs to a NEW burst, and the
        // stale buffer flushes on its arrival
        let d = s.press(&KeyEvent::char('7'), t0 + Duration::from_millis(250));
        assert_eq!(
            d,
            KeyDisposition::Flush {
                text: "12".into(),
                capture: false
            }
        );
        assert!(s.is_scanning());
        assert_eq!(s.buffer(), "7");
        assert_eq!(
            s.deadline(),
            Some(t0 + Duration::from_millis(350))
        );
    }

    #[test]
    fn test_key_within_window_continues_burst() {
        let mut s = session();
        let t0 = Instant::now();

        s.press(&KeyEvent::char('1'), t0);
        let d = s.press(&KeyEvent::char('2'), t0 + Duration::from_millis(90));
        assert_eq!(d, KeyDisposition::Buffered { capture: false });
        assert_eq!(s.buffer(), "12");
    }

    #[test]
    fn test_capture_mode_bypasses_focus_suppression() {
        let mut s = capture_session();
        let d = s.press(&KeyEvent::char_in_field('5'), Instant::now());
        assert_eq!(d, KeyDisposition::Buffered { capture: true });
        assert_eq!(s.buffer(), "5");
    }

    #[test]
    fn test_non_accumulable_chars_never_reach_buffer() {
        let mut s = session();
        let now = Instant::now();

        assert_eq!(s.press(&KeyEvent::char(' '), now), KeyDisposition::Ignored);
        assert_eq!(s.press(&KeyEvent::char('!'), now), KeyDisposition::Ignored);
        assert_eq!(
            s.press(
                &KeyEvent {
                    key: Key::Other,
                    text_input_focused: false
                },
                now
            ),
            KeyDisposition::Ignored
        );
        assert!(!s.is_scanning());
    }

    #[test]
    fn test_hyphen_and_letters_accumulate() {
        // Accumulation class is looser than final digit-only validity
        let mut s = session();
        let now = Instant::now();

        s.press(&KeyEvent::char('A'), now);
        s.press(&KeyEvent::char('-'), now);
        s.press(&KeyEvent::char('_'), now);
        assert_eq!(s.buffer(), "A-_");
    }

    #[test]
    fn test_reset_clears_without_emission() {
        let mut s = session();
        let now = Instant::now();

        s.press(&KeyEvent::char('9'), now);
        assert!(s.is_scanning());

        s.reset();
        assert!(!s.is_scanning());
        assert_eq!(s.buffer(), "");
        assert!(s.deadline().is_none());
        assert_eq!(s.flush_if_due(now + Duration::from_secs(1)), None);
    }

    #[test]
    fn test_first_key_after_flush_is_admitted() {
        let mut s = session();
        let t0 = Instant::now();

        s.press(&KeyEvent::char('1'), t0);
        s.press(&KeyEvent::enter(), t0);

        // Long after the previous burst: no timing evidence, admit on faith
        let d = s.press(&KeyEvent::char('2'), t0 + Duration::from_secs(30));
        assert_eq!(d, KeyDisposition::Buffered { capture: false });
    }

    #[test]
    fn test_buffer_scanning_invariant() {
        let mut s = session();
        let now = Instant::now();

        assert_eq!(s.is_scanning(), !s.buffer().is_empty());
        s.press(&KeyEvent::char('7'), now);
        assert_eq!(s.is_scanning(), !s.buffer().is_empty());
        s.press(&KeyEvent::enter(), now);
        assert_eq!(s.is_scanning(), !s.buffer().is_empty());
    }

    #[test]
    fn test_status_snapshot() {
        let mut s = session();
        s.press(&KeyEvent::char('7'), Instant::now());

        let status = s.status();
        assert!(status.is_scanning);
        assert_eq!(status.buffer, "7");

        // Snapshot, not live: later mutation does not affect it
        s.reset();
        assert_eq!(status.buffer, "7");
    }
}
