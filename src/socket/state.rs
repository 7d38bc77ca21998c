//! Connection lifecycle states.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// ReadyState
// ============================================================================

/// Four-value connection lifecycle, numbered as in the WebSocket standard.
///
/// States only move forward; [`ReadyState::Closed`] is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum ReadyState {
    /// Connection not yet established.
    Connecting = 0,
    /// Connection established, data may flow.
    Open = 1,
    /// Close requested, waiting for the transport to confirm.
    Closing = 2,
    /// Connection finished.
    Closed = 3,
}

impl ReadyState {
    /// Numeric value of [`ReadyState::Connecting`].
    pub const CONNECTING: u8 = 0;
    /// Numeric value of [`ReadyState::Open`].
    pub const OPEN: u8 = 1;
    /// Numeric value of [`ReadyState::Closing`].
    pub const CLOSING: u8 = 2;
    /// Numeric value of [`ReadyState::Closed`].
    pub const CLOSED: u8 = 3;

    /// Returns the numeric value.
    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Returns the upper-case name used by the standard.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connecting => "CONNECTING",
            Self::Open => "OPEN",
            Self::Closing => "CLOSING",
            Self::Closed => "CLOSED",
        }
    }

    /// Returns `true` for [`ReadyState::Closed`].
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Returns `true` if moving from `self` to `next` is a legal transition.
    ///
    /// Staying in the same non-terminal state counts as legal.
    #[inline]
    #[must_use]
    pub fn can_advance_to(self, next: Self) -> bool {
        !self.is_terminal() && next >= self
    }
}

impl fmt::Display for ReadyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<u8> for ReadyState {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            Self::CONNECTING => Ok(Self::Connecting),
            Self::OPEN => Ok(Self::Open),
            Self::CLOSING => Ok(Self::Closing),
            Self::CLOSED => Ok(Self::Closed),
            other => Err(Error::protocol(format!("unknown readyState {other}"))),
        }
    }
}

impl From<ReadyState> for u8 {
    #[inline]
    fn from(state: ReadyState) -> Self {
        state.as_u8()
    }
}

// ============================================================================
// Tests
// ============================================================================
