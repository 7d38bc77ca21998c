//! Transport protocol types.
//!
//! This module defines what crosses the boundary between the bridge and
//! the transport runtime, and the events the bridge hands to listeners.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | encoded payload | Bridge → Transport | Outbound data (`send`) |
//! | `RawNotification` | Transport → Bridge | Socket activity, in batches |
//! | `SocketEvent` | Bridge → Listener | Standards-shaped event |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `codec` | Percent-encoding for the string-only channel |
//! | `event` | Listener-facing event types |
//! | `notification` | Raw transport notification records |

// ============================================================================
// Submodules
// ============================================================================

/// Percent-encoding helpers.
pub mod codec;

/// Listener-facing event types.
pub mod event;

/// Raw transport notifications.
pub mod notification;

// ============================================================================
// Re-exports
// ============================================================================

pub use codec::{decode_payload, encode_payload};
pub use event::{CLOSE_NO_STATUS, CloseEvent, EventKind, MessageEvent, SocketEvent};
pub use notification::{NotificationKind, RawNotification};
