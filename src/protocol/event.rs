//! Standards-shaped socket events.
//!
//! These are the objects listeners receive. Each maps to one
//! [`EventKind`], which selects the listener list and handler slot used
//! for dispatch.
//!
//! # Event Types
//!
//! | Kind | Payload |
//! |------|---------|
//! | `open` | none |
//! | `error` | none |
//! | `close` | `was_clean`, `code`, `reason` |
//! | `message` | decoded `data` |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// Close code reported when the transport supplied none (RFC 6455 §7.4.1).
pub const CLOSE_NO_STATUS: u16 = 1005;

// ============================================================================
// EventKind
// ============================================================================

/// The four event kinds a socket emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Connection established.
    Open,
    /// Transport-side failure.
    Error,
    /// Connection finished.
    Close,
    /// Data received.
    Message,
}

impl EventKind {
    /// All kinds, in slot order.
    pub const ALL: [Self; 4] = [Self::Open, Self::Error, Self::Close, Self::Message];

    /// Returns the lowercase event name.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Error => "error",
            Self::Close => "close",
            Self::Message => "message",
        }
    }

    /// Returns the slot index used by listener tables.
    #[inline]
    #[must_use]
    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// CloseEvent
// ============================================================================

/// Payload of a `close` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseEvent {
    /// Whether the closing handshake completed.
    pub was_clean: bool,
    /// Close code.
    pub code: u16,
    /// Close reason supplied by the peer.
    pub reason: String,
}

// ============================================================================
// MessageEvent
// ============================================================================

/// Payload of a `message` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    /// Decoded message text.
    pub data: String,
}

// ============================================================================
// SocketEvent
// ============================================================================

/// An event delivered to socket listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    /// Connection established.
    Open,
    /// Transport reported an error. Carries no detail.
    Error,
    /// Connection finished.
    Close(CloseEvent),
    /// Message received.
    Message(MessageEvent),
}

impl SocketEvent {
    /// Returns the kind used for dispatch.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Open => EventKind::Open,
            Self::Error => EventKind::Error,
            Self::Close(_) => EventKind::Close,
            Self::Message(_) => EventKind::Message,
        }
    }

    /// Returns the message text for `message` events.
    #[inline]
    #[must_use]
    pub fn data(&self) -> Option<&str> {
        match self {
            Self::Message(message) => Some(&message.data),
            _ => None,
        }
    }

    /// Returns the close payload for `close` events.
    #[inline]
    #[must_use]
    pub fn close_info(&self) -> Option<&CloseEvent> {
        match self {
            Self::Close(close) => Some(close),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(SocketEvent::Open.kind(), EventKind::Open);
        assert_eq!(SocketEvent::Error.kind(), EventKind::Error);

        let message = SocketEvent::Message(MessageEvent { data: "hi".into() });
        assert_eq!(message.kind(), EventKind::Message);
        assert_eq!(message.data(), Some("hi"));
        assert!(message.close_info().is_none());
    }

    #[test]
    fn test_close_info() {
        let close = SocketEvent::Close(CloseEvent {
            was_clean: true,
            code: 1000,
            reason: "bye".into(),
        });
        let info = close.close_info().expect("close payload");
        assert!(info.was_clean);
        assert_eq!(info.code, 1000);
        assert_eq!(close.data(), None);
    }

    #[test]
    fn test_slot_indices_are_distinct() {
        let indices: Vec<usize> = EventKind::ALL.iter().map(|k| k.index()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_kind_serde() {
        let kind: EventKind = serde_json::from_str("\"message\"").expect("parse kind");
        assert_eq!(kind, EventKind::Message);
        assert_eq!(kind.to_string(), "message");
    }
}
