//! Socket Bridge - WebSocket facade over a plugin transport.
//!
//! This library exposes a standards-shaped [`WebSocket`] to application
//! code while the actual network I/O is performed by an external transport
//! runtime that loads asynchronously and talks to the bridge through a
//! narrow, string-only channel.
//!
//! # Architecture
//!
//! The bridge sits between two parties:
//!
//! - **Application**: Creates sockets, sends text, listens for events
//! - **Transport**: Owns real connections, reports activity in batches
//!
//! Key design principles:
//!
//! - Each [`Bridge`] owns: scheduler + task queue + socket registry
//! - Calls made before the transport loads are buffered and flushed in order
//! - Socket creation runs on a later scheduler turn, so listeners attached
//!   right after construction never miss an event
//! - Payloads are percent-encoded in both directions
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//!
//! use socket_bridge::{Bridge, EventKind, ManualScheduler, Result};
//!
//! fn main() -> Result<()> {
//!     let scheduler = Arc::new(ManualScheduler::new());
//!     let bridge = Bridge::builder()
//!         .scheduler(scheduler.clone())
//!         .caller_url("https://example.com/app")
//!         .build()?;
//!
//!     let socket = bridge.connect("ws://example.com/chat", "chat")?;
//!     socket.listen(EventKind::Open, |_| println!("connected"));
//!
//!     // Create is deferred until the transport reports readiness
//!     scheduler.drain();
//!     assert_eq!(bridge.pending_task_count(), 1);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`bridge`] | Bridge context, builder and notification routing |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Socket ids and their allocator |
//! | [`protocol`] | Notification records, events and payload codec |
//! | [`socket`] | The [`WebSocket`] facade |
//! | [`transport`] | Transport handle, task queue and scheduler |

// ============================================================================
// Modules
// ============================================================================

/// Bridge context and transport entry points.
///
/// Use [`Bridge::builder()`] to create a configured bridge instance.
pub mod bridge;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe socket identifiers.
pub mod identifiers;

/// Transport protocol types.
///
/// Raw notification records, listener-facing events and payload encoding.
pub mod protocol;

/// Socket facade.
pub mod socket;

/// Transport boundary.
///
/// Handle contract, deferred queue and next-turn scheduling.
pub mod transport;

#[cfg(test)]
mod testing;

// ============================================================================
// Re-exports
// ============================================================================

// Bridge types
pub use bridge::{Bridge, BridgeBuilder, BridgeConfig};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::SocketId;

// Protocol types
pub use protocol::{
    CLOSE_NO_STATUS, CloseEvent, EventKind, MessageEvent, NotificationKind, RawNotification,
    SocketEvent,
};

// Socket types
pub use socket::{ConnectOptions, Listener, ReadyState, WebSocket};

// Transport types
pub use transport::{
    ChannelScheduler, CreateRequest, ManualScheduler, PendingTask, Scheduler, SchedulerLoop,
    TaskQueue, TransportHandle,
};
