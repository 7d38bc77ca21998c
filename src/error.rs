//! Error types for the socket bridge.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use socket_bridge::{Result, WebSocket};
//!
//! fn greet(socket: &WebSocket) -> Result<()> {
//!     if !socket.send("hello")? {
//!         // Transport buffer is full, retry later.
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Usage | [`Error::InvalidState`], [`Error::InvalidUrl`], [`Error::IdsExhausted`] |
//! | Configuration | [`Error::Config`] |
//! | Transport | [`Error::TransportNotReady`], [`Error::Protocol`] |
//! | Payload | [`Error::Decode`] |
//! | External | [`Error::Json`], [`Error::Url`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;

use crate::identifiers::SocketId;
use crate::socket::ReadyState;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Usage Errors
    // ========================================================================
    /// Operation not allowed in the socket's current state.
    ///
    /// Returned by `send` while the socket is still connecting.
    #[error("Invalid state: socket {socket_id} is {state}, {operation} not allowed")]
    InvalidState {
        /// Socket the operation was attempted on.
        socket_id: SocketId,
        /// State at the time of the call.
        state: ReadyState,
        /// Name of the rejected operation.
        operation: &'static str,
    },

    /// Every socket id this bridge can hand out has been used.
    ///
    /// Ids are never recycled, so no further sockets can be created.
    #[error("Socket id space exhausted")]
    IdsExhausted,

    /// Target address is not a usable WebSocket URL.
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl {
        /// The rejected address.
        url: String,
        /// Why it was rejected.
        message: String,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when bridge configuration is incomplete or invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Transport Errors
    // ========================================================================
    /// The transport handle has not signalled readiness yet.
    #[error("Transport not ready")]
    TransportNotReady,

    /// Transport delivered something the bridge cannot interpret.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    // ========================================================================
    // Payload Errors
    // ========================================================================
    /// Percent-decoding of an inbound payload failed.
    #[error("Decode error: {message}")]
    Decode {
        /// Description of the decoding failure.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parse error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates an invalid state error.
    #[inline]
    pub fn invalid_state(socket_id: SocketId, state: ReadyState, operation: &'static str) -> Self {
        Self::InvalidState {
            socket_id,
            state,
            operation,
        }
    }

    /// Creates an invalid URL error.
    #[inline]
    pub fn invalid_url(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates a decode error.
    #[inline]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is an invalid state error.
    #[inline]
    #[must_use]
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }

    /// Returns `true` if this error came from malformed transport input.
    #[inline]
    #[must_use]
    pub fn is_transport_input_error(&self) -> bool {
        matches!(
            self,
            Self::Protocol { .. } | Self::Decode { .. } | Self::Json(_)
        )
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Recoverable errors may succeed once the caller waits for the socket
    /// to open or for the transport to become ready.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidState {
                state: ReadyState::Connecting,
                ..
            } | Self::TransportNotReady
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
