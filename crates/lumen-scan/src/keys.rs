//! # Key Event Types
//!
//! The decoder's only input: one [`KeyEvent`] per raw key press, carrying
//! the pressed key and enough focus information to avoid stealing typed
//! input from a manual-entry field. The host UI layer adapts its native
//! keyboard events into this shape.

use serde::{Deserialize, Serialize};

// =============================================================================
// Key
// =============================================================================

/// The pressed key, reduced to what the decoder cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    /// A printable character key.
    Char(char),
    /// The scan terminator (scanners are configured to send Enter as a
    /// suffix after the symbol data).
    Enter,
    /// Any other key (modifiers, arrows, function keys). Never buffered.
    Other,
}

// =============================================================================
// Key Event
// =============================================================================

/// One raw key press as observed by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// The pressed key.
    pub key: Key,

    /// Whether UI focus was on a text-entry control at press time.
    ///
    /// While `capture_keys` is false the decoder ignores events with this
    /// set, so ordinary typing into a search box is left alone.
    pub text_input_focused: bool,
}

impl KeyEvent {
    /// A character key pressed outside any text-entry field.
    pub fn char(c: char) -> Self {
        KeyEvent {
            key: Key::Char(c),
            text_input_focused: false,
        }
    }

    /// A character key pressed while a text-entry field has focus.
    pub fn char_in_field(c: char) -> Self {
        KeyEvent {
            key: Key::Char(c),
            text_input_focused: true,
        }
    }

    /// The Enter terminator, outside any text-entry field.
    pub fn enter() -> Self {
        KeyEvent {
            key: Key::Enter,
            text_input_focused: false,
        }
    }
}
