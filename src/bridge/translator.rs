//! Event translation.
//!
//! Turns raw transport notifications into listener-facing events and
//! decides which lifecycle state each one implies. Pure functions; the
//! socket applies the result under its own lock.
//!
//! | Kind | Event | Implied state |
//! |------|-------|---------------|
//! | `open` | [`SocketEvent::Open`] | OPEN |
//! | `error` | [`SocketEvent::Error`] | hint, never CLOSED |
//! | `close` | [`SocketEvent::Close`] | CLOSED |
//! | `message` | [`SocketEvent::Message`] | hint, never CLOSED |

// ============================================================================
// Imports
// ============================================================================

use crate::error::{Error, Result};
use crate::protocol::{
    CLOSE_NO_STATUS, CloseEvent, MessageEvent, NotificationKind, RawNotification, SocketEvent,
    decode_payload,
};
use crate::socket::ReadyState;

// ============================================================================
// Translation
// ============================================================================

/// Builds the event for a notification.
///
/// # Errors
///
/// - [`Error::Decode`] if a message payload is missing or malformed
/// - [`Error::Protocol`] if the notification kind is unknown
pub fn translate(notification: &RawNotification) -> Result<SocketEvent> {
    match notification.kind {
        NotificationKind::Open => Ok(SocketEvent::Open),

        NotificationKind::Error => Ok(SocketEvent::Error),

        NotificationKind::Close => Ok(SocketEvent::Close(CloseEvent {
            was_clean: notification.was_clean,
            code: notification.code.unwrap_or(CLOSE_NO_STATUS),
            reason: notification.reason.clone().unwrap_or_default(),
        })),

        NotificationKind::Message => {
            let encoded = notification
                .message
                .as_deref()
                .ok_or_else(|| Error::decode("message notification without payload"))?;
            let data = decode_payload(encoded)?.into_owned();
            Ok(SocketEvent::Message(MessageEvent { data }))
        }

        NotificationKind::Unknown => Err(Error::protocol(format!(
            "unknown notification type for socket {}",
            notification.target_id
        ))),
    }
}

/// Returns the state a notification moves its socket to, if any.
///
/// Only a `close` notification may close a socket; a CLOSED hint on any
/// other kind is ignored so the close event is never skipped.
#[must_use]
pub fn target_state(notification: &RawNotification) -> Option<ReadyState> {
    match notification.kind {
        NotificationKind::Open => Some(ReadyState::Open),
        NotificationKind::Close => Some(ReadyState::Closed),
        NotificationKind::Error | NotificationKind::Message => notification
            .ready_state
            .filter(|state| !state.is_terminal()),
        NotificationKind::Unknown => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
