//! Type-safe identifiers.
//!
//! Newtype wrappers keep socket ids from being mixed up with byte counts,
//! close codes, or other integers crossing the transport boundary.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// SocketId
// ============================================================================

/// Identifier shared by a socket facade and its transport-level connection.
///
/// Ids are allocated monotonically per bridge and never recycled, so a
/// late notification for a closed socket can never reach a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SocketId(u32);

impl SocketId {
    /// Wraps a raw id.
    #[inline]
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw id passed to the transport.
    #[inline]
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SocketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SocketId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

// ============================================================================
// SocketIdAllocator
// ============================================================================

/// Monotonic id source, one per bridge.
#[derive(Debug, Default)]
pub struct SocketIdAllocator {
    next: AtomicU32,
}

impl SocketIdAllocator {
    /// Creates an allocator starting at id 0.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: AtomicU32::new(0),
        }
    }

    /// Allocates the next id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IdsExhausted`] once the id space is used up.
    #[inline]
    pub fn next(&self) -> Result<SocketId> {
        self.next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |id| id.checked_add(1))
            .map(SocketId)
            .map_err(|_| Error::IdsExhausted)
    }

    /// Returns `true` if `id` was handed out by this allocator.
    #[inline]
    #[must_use]
    pub fn has_issued(&self, id: SocketId) -> bool {
        id.0 < self.next.load(Ordering::Relaxed)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocator_is_monotonic() {
        let allocator = SocketIdAllocator::new();
        let a = allocator.next().expect("id");
        let b = allocator.next().expect("id");
        let c = allocator.next().expect("id");

        assert_eq!(a, SocketId::new(0));
        assert!(a < b && b < c);
    }

    #[test]
    fn test_has_issued() {
        let allocator = SocketIdAllocator::new();
        assert!(!allocator.has_issued(SocketId::new(0)));

        let id = allocator.next().expect("id");
        assert!(allocator.has_issued(id));
        assert!(!allocator.has_issued(SocketId::new(1)));
    }

    #[test]
    fn test_allocator_never_wraps() {
        let allocator = SocketIdAllocator {
            next: AtomicU32::new(u32::MAX - 1),
        };

        let last = allocator.next().expect("last id");
        assert_eq!(last, SocketId::new(u32::MAX - 1));

        assert!(matches!(allocator.next(), Err(Error::IdsExhausted)));
        assert!(matches!(allocator.next(), Err(Error::IdsExhausted)));
        assert!(allocator.has_issued(last));
        assert!(!allocator.has_issued(SocketId::new(u32::MAX)));
    }

    #[test]
    fn test_serde_transparent() {
        let id: SocketId = serde_json::from_str("7").expect("parse id");
        assert_eq!(id.as_u32(), 7);
        assert_eq!(serde_json::to_string(&id).expect("serialize"), "7");
    }

    #[test]
    fn test_display() {
        assert_eq!(SocketId::new(42).to_string(), "42");
    }
}
