//! Raw transport notifications.
//!
//! The transport reports socket activity as tagged records, pulled in
//! batches after it signals that events are available. Records are
//! consumed once by the translator and never stored.
//!
//! # Format
//!
//! ```json
//! {
//!   "webSocketId": 1,
//!   "type": "close",
//!   "readyState": 3,
//!   "wasClean": true,
//!   "code": 1000,
//!   "reason": "done"
//! }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Value, from_str, from_value};
use tracing::warn;

use crate::error::Result;
use crate::identifiers::SocketId;
use crate::socket::ReadyState;

// ============================================================================
// NotificationKind
// ============================================================================

/// Kind tag of a raw notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Transport connection opened.
    Open,
    /// Transport error.
    Error,
    /// Transport connection closed.
    Close,
    /// Message received.
    Message,
    /// Any tag this bridge does not understand.
    #[serde(other)]
    Unknown,
}

// ============================================================================
// RawNotification
// ============================================================================

/// One transport-level event for one socket id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNotification {
    /// Socket the notification is addressed to.
    #[serde(rename = "webSocketId")]
    pub target_id: SocketId,

    /// Notification kind.
    #[serde(rename = "type")]
    pub kind: NotificationKind,

    /// State the transport believes the socket is in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready_state: Option<ReadyState>,

    /// Negotiated sub-protocol.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,

    /// Close only: whether the closing handshake completed.
    #[serde(default)]
    pub was_clean: bool,

    /// Close only: close code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,

    /// Close only: close reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Message only: percent-encoded payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ============================================================================
// RawNotification - Constructors
// ============================================================================

impl RawNotification {
    /// Creates a bare notification of the given kind.
    #[must_use]
    pub fn new(target_id: SocketId, kind: NotificationKind) -> Self {
        Self {
            target_id,
            kind,
            ready_state: None,
            protocol: None,
            was_clean: false,
            code: None,
            reason: None,
            message: None,
        }
    }

    /// Creates an `open` notification carrying the OPEN state hint.
    #[inline]
    #[must_use]
    pub fn open(target_id: SocketId) -> Self {
        Self::new(target_id, NotificationKind::Open).with_ready_state(ReadyState::Open)
    }

    /// Creates an `error` notification.
    #[inline]
    #[must_use]
    pub fn error(target_id: SocketId) -> Self {
        Self::new(target_id, NotificationKind::Error)
    }

    /// Creates a `close` notification carrying the CLOSED state hint.
    #[must_use]
    pub fn close(
        target_id: SocketId,
        was_clean: bool,
        code: u16,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            was_clean,
            code: Some(code),
            reason: Some(reason.into()),
            ..Self::new(target_id, NotificationKind::Close).with_ready_state(ReadyState::Closed)
        }
    }

    /// Creates a `message` notification from an already-encoded payload.
    #[must_use]
    pub fn message(target_id: SocketId, encoded: impl Into<String>) -> Self {
        Self {
            message: Some(encoded.into()),
            ..Self::new(target_id, NotificationKind::Message)
        }
    }

    /// Sets the state hint.
    #[inline]
    #[must_use]
    pub fn with_ready_state(mut self, state: ReadyState) -> Self {
        self.ready_state = Some(state);
        self
    }

    /// Sets the negotiated sub-protocol.
    #[inline]
    #[must_use]
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }
}

// ============================================================================
// RawNotification - Parsing
// ============================================================================

impl RawNotification {
    /// Parses a JSON array of notification records.
    ///
    /// A record that fails to parse is logged and skipped; its neighbours
    /// are still returned in their original order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if `json` is not an array.
    pub fn parse_batch(json: &str) -> Result<Vec<Self>> {
        let records: Vec<Value> = from_str(json)?;
        let mut batch = Vec::with_capacity(records.len());

        for (index, record) in records.into_iter().enumerate() {
            match from_value::<Self>(record) {
                Ok(notification) => batch.push(notification),
                Err(e) => warn!(index, error = %e, "Skipping malformed notification"),
            }
        }

        Ok(batch)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_close_record() {
        let json_str = r#"[{
            "webSocketId": 4,
            "type": "close",
            "readyState": 3,
            "wasClean": true,
            "code": 1000,
            "reason": "done"
        }]"#;

        let batch = RawNotification::parse_batch(json_str).expect("parse batch");
        assert_eq!(batch.len(), 1);

        let close = &batch[0];
        assert_eq!(close.target_id, SocketId::new(4));
        assert_eq!(close.kind, NotificationKind::Close);
        assert_eq!(close.ready_state, Some(ReadyState::Closed));
        assert!(close.was_clean);
        assert_eq!(close.code, Some(1000));
        assert_eq!(close.reason.as_deref(), Some("done"));
    }

    #[test]
    fn test_parse_preserves_order() {
        let json_str = r#"[
            {"webSocketId": 1, "type": "open", "readyState": 1, "protocol": "chat"},
            {"webSocketId": 1, "type": "message", "message": "hi"},
            {"webSocketId": 2, "type": "error"}
        ]"#;

        let batch = RawNotification::parse_batch(json_str).expect("parse batch");
        let kinds: Vec<_> = batch.iter().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![
                NotificationKind::Open,
                NotificationKind::Message,
                NotificationKind::Error
            ]
        );
        assert_eq!(batch[0].protocol.as_deref(), Some("chat"));
    }

    #[test]
    fn test_malformed_record_is_skipped() {
        let json_str = r#"[
            {"webSocketId": 1, "type": "open"},
            {"type": "message"},
            {"webSocketId": 1, "type": "open", "readyState": 42},
            {"webSocketId": 1, "type": "message", "message": "ok"}
        ]"#;

        let batch = RawNotification::parse_batch(json_str).expect("parse batch");
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[1].message.as_deref(), Some("ok"));
    }

    #[test]
    fn test_unknown_kind() {
        let json_str = r#"[{"webSocketId": 1, "type": "ping"}]"#;
        let batch = RawNotification::parse_batch(json_str).expect("parse batch");
        assert_eq!(batch[0].kind, NotificationKind::Unknown);
    }

    #[test]
    fn test_non_array_is_error() {
        assert!(RawNotification::parse_batch(r#"{"webSocketId": 1}"#).is_err());
    }

    #[test]
    fn test_constructors() {
        let id = SocketId::new(9);
        let close = RawNotification::close(id, false, 1006, "abnormal");
        assert_eq!(close.kind, NotificationKind::Close);
        assert_eq!(close.ready_state, Some(ReadyState::Closed));
        assert!(!close.was_clean);

        let open = RawNotification::open(id).with_protocol("chat");
        assert_eq!(open.ready_state, Some(ReadyState::Open));
        assert_eq!(open.protocol.as_deref(), Some("chat"));

        let message = RawNotification::message(id, "a%20b");
        let json = serde_json::to_string(&message).expect("serialize");
        assert!(json.contains("\"webSocketId\":9"));
        assert!(json.contains("\"type\":\"message\""));
    }
}
