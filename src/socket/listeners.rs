//! Listener registry.
//!
//! One ordered listener list and one primary handler slot per
//! [`EventKind`]. Dispatch calls the list in registration order and the
//! handler last.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use crate::protocol::{EventKind, SocketEvent};

// ============================================================================
// Types
// ============================================================================

/// Event callback.
///
/// Compared by identity ([`Arc::ptr_eq`]) for removal, so keep a clone of
/// the `Arc` you registered.
pub type Listener = Arc<dyn Fn(&SocketEvent) + Send + Sync>;

/// Listeners and handler for one kind.
#[derive(Default, Clone)]
struct Slot {
    listeners: Vec<Listener>,
    handler: Option<Listener>,
}

// ============================================================================
// ListenerSet
// ============================================================================

/// Per-kind listener storage.
#[derive(Default, Clone)]
pub(crate) struct ListenerSet {
    slots: [Slot; 4],
}

impl ListenerSet {
    /// Appends a listener for `kind`.
    pub(crate) fn add(&mut self, kind: EventKind, listener: Listener) {
        self.slots[kind.index()].listeners.push(listener);
    }

    /// Removes the most recently added registration of `listener`.
    ///
    /// Returns `false` if it was not registered.
    pub(crate) fn remove(&mut self, kind: EventKind, listener: &Listener) -> bool {
        let listeners = &mut self.slots[kind.index()].listeners;
        match listeners.iter().rposition(|l| Arc::ptr_eq(l, listener)) {
            Some(index) => {
                listeners.remove(index);
                true
            }
            None => false,
        }
    }

    /// Replaces the handler slot for `kind`.
    pub(crate) fn set_handler(&mut self, kind: EventKind, handler: Option<Listener>) {
        self.slots[kind.index()].handler = handler;
    }

    /// Returns `true` if a handler is set for `kind`.
    pub(crate) fn has_handler(&self, kind: EventKind) -> bool {
        self.slots[kind.index()].handler.is_some()
    }

    /// Returns the number of listeners for `kind`, handler excluded.
    pub(crate) fn count(&self, kind: EventKind) -> usize {
        self.slots[kind.index()].listeners.len()
    }

    /// Snapshots the callbacks to run for `kind`, in dispatch order.
    ///
    /// Taken under the socket lock and invoked after releasing it, so a
    /// callback may add or remove listeners without affecting the current
    /// dispatch.
    pub(crate) fn targets(&self, kind: EventKind) -> Vec<Listener> {
        let slot = &self.slots[kind.index()];
        slot.listeners
            .iter()
            .chain(slot.handler.iter())
            .cloned()
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
