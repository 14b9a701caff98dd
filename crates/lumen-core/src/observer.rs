//! # Observer Registry
//!
//! Broadcast notification with opt-in subscription and explicit
//! unsubscribe. Both engines deliver their change events through this
//! registry: the sync engine's `onSync` listeners and any host-side
//! fan-out of scan results.
//!
//! ## Delivery Guarantees
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Subscribers<E>::notify                             │
//! │                                                                         │
//! │  1. Snapshot the listener list under the lock                          │
//! │  2. Release the lock                                                   │
//! │  3. Call each listener on the snapshot                                 │
//! │                                                                         │
//! │  • A listener that subscribes/unsubscribes from inside a handler       │
//! │    takes effect on the NEXT notify, never corrupts this one            │
//! │  • A panicking listener is caught, logged, and skipped - it never      │
//! │    aborts the pass or starves the remaining listeners                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, Weak};
use tracing::warn;

/// A registered listener callback.
type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Internal registry state behind the lock.
struct Registry<E> {
    next_id: u64,
    listeners: Vec<(u64, Listener<E>)>,
}

// =============================================================================
// Subscribers
// =============================================================================

/// A cloneable broadcast registry for events of type `E`.
///
/// Clones share the same listener list, so a service can hand out
/// subscription access while keeping one registry instance internally.
pub struct Subscribers<E> {
    inner: Arc<Mutex<Registry<E>>>,
}

impl<E> Clone for Subscribers<E> {
    fn clone(&self) -> Self {
        Subscribers {
            inner: self.inner.clone(),
        }
    }
}

impl<E> Default for Subscribers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Subscribers<E> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Subscribers {
            inner: Arc::new(Mutex::new(Registry {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Registers a listener and returns its unsubscribe handle.
    ///
    /// Dropping the handle does NOT unsubscribe; removal is explicit, so
    /// a fire-and-forget caller can discard the handle and stay
    /// subscribed for the registry's lifetime.
    pub fn subscribe<F>(&self, listener: F) -> Subscription<E>
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let mut registry = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Arc::new(listener)));

        Subscription {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Notifies every currently-registered listener.
    ///
    /// Listener panics are caught and logged per handler; delivery
    /// continues with the remaining listeners.
    pub fn notify(&self, event: &E) {
        let snapshot: Vec<Listener<E>> = {
            let registry = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            registry.listeners.iter().map(|(_, l)| l.clone()).collect()
        };

        for listener in snapshot {
            if catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
                warn!("event listener panicked; skipping");
            }
        }
    }

    /// Returns the number of registered listeners.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .listeners
            .len()
    }

    /// Returns true if no listeners are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// Subscription Handle
// =============================================================================

/// Handle returned by [`Subscribers::subscribe`].
///
/// Holds a weak reference to the registry so an outliving handle never
/// keeps a torn-down service alive.
pub struct Subscription<E> {
    id: u64,
    registry: Weak<Mutex<Registry<E>>>,
}

impl<E> Subscription<E> {
    /// Removes the listener from the registry.
    ///
    /// Idempotent: calling twice, or after the registry is gone, is a
    /// no-op.
    pub fn unsubscribe(&self) {
        if let Some(inner) = self.registry.upgrade() {
            let mut registry = inner.lock().unwrap_or_else(|e| e.into_inner());
            registry.listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
