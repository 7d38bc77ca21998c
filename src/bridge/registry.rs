//! Instance registry.
//!
//! Maps socket ids to live sockets so inbound notifications can be routed.
//! Ids are never reused, which lets the registry tell a retired id apart
//! from one that was never issued.

// ============================================================================
// Imports
// ============================================================================

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::identifiers::{SocketId, SocketIdAllocator};
use crate::socket::WebSocket;

// ============================================================================
// Lookup
// ============================================================================

/// Result of resolving a notification's target id.
#[derive(Debug)]
pub(crate) enum Lookup {
    /// Socket is registered.
    Live(WebSocket),
    /// Id was issued but the socket has since closed.
    Retired,
    /// Id was never issued by this bridge.
    Unknown,
}

// ============================================================================
// Registry
// ============================================================================

/// Live sockets keyed by id.
#[derive(Default)]
pub(crate) struct Registry {
    ids: SocketIdAllocator,
    sockets: RwLock<FxHashMap<SocketId, WebSocket>>,
}

impl Registry {
    /// Allocates a fresh, never-reused id.
    #[inline]
    pub(crate) fn allocate_id(&self) -> Result<SocketId> {
        self.ids.next()
    }

    /// Registers a socket under its id.
    pub(crate) fn insert(&self, socket: WebSocket) {
        self.sockets.write().insert(socket.id(), socket);
    }

    /// Resolves an id.
    pub(crate) fn lookup(&self, id: SocketId) -> Lookup {
        if let Some(socket) = self.sockets.read().get(&id) {
            return Lookup::Live(socket.clone());
        }

        if self.ids.has_issued(id) {
            Lookup::Retired
        } else {
            Lookup::Unknown
        }
    }

    /// Deregisters a socket. Returns `false` if it was not registered.
    pub(crate) fn remove(&self, id: SocketId) -> bool {
        self.sockets.write().remove(&id).is_some()
    }

    /// Returns the number of registered sockets.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.sockets.read().len()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use crate::bridge::Bridge;
    use crate::socket::ConnectOptions;
    use crate::transport::ManualScheduler;

    fn bridge() -> Bridge {
        Bridge::builder()
            .scheduler(Arc::new(ManualScheduler::new()))
            .build()
            .expect("build bridge")
    }

    #[test]
    fn test_lookup_states() {
        let bridge = bridge();
        let socket = WebSocket::connect(&bridge, "ws://example.com/", ConnectOptions::new())
            .expect("connect");
        let registry = bridge.registry();

        assert!(matches!(registry.lookup(socket.id()), Lookup::Live(s) if s == socket));
        assert!(matches!(registry.lookup(SocketId::new(99)), Lookup::Unknown));

        assert!(registry.remove(socket.id()));
        assert!(!registry.remove(socket.id()));
        assert!(matches!(registry.lookup(socket.id()), Lookup::Retired));
    }

    #[test]
    fn test_ids_never_recycled() {
        let bridge = bridge();
        let first = WebSocket::connect(&bridge, "ws://example.com/", ConnectOptions::new())
            .expect("connect");
        first.close();

        let second = WebSocket::connect(&bridge, "ws://example.com/", ConnectOptions::new())
            .expect("connect");
        assert_ne!(first.id(), second.id());
        assert_eq!(bridge.registry().len(), 1);
    }

    #[test]
    fn test_bridges_are_isolated() {
        let a = bridge();
        let b = bridge();
        let socket_a = WebSocket::connect(&a, "ws://example.com/", ConnectOptions::new())
            .expect("connect");
        let socket_b = WebSocket::connect(&b, "ws://example.com/", ConnectOptions::new())
            .expect("connect");

        assert_eq!(socket_a.id(), socket_b.id());
        assert_eq!(a.registry().len(), 1);
        assert_eq!(b.registry().len(), 1);
    }
}
