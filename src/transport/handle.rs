//! Transport handle contract.
//!
//! The transport runtime is an external collaborator. It loads on its own
//! schedule and exposes a narrow synchronous call surface keyed by socket
//! id. This module defines that surface as a trait; the bridge never
//! depends on how it is implemented.

// ============================================================================
// Imports
// ============================================================================

use crate::identifiers::SocketId;
use crate::protocol::RawNotification;

// ============================================================================
// CreateRequest
// ============================================================================

/// Arguments of a transport-level `create` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRequest {
    /// Target WebSocket URL.
    pub url: String,
    /// Requested sub-protocols, possibly empty.
    pub protocols: Vec<String>,
    /// Proxy host, if any.
    pub proxy_host: Option<String>,
    /// Proxy port, `0` when no proxy is used.
    pub proxy_port: u16,
    /// Extra handshake headers, already formatted for the transport.
    pub headers: Option<String>,
}

// ============================================================================
// TransportHandle
// ============================================================================

/// The single process-wide transport object.
///
/// All sockets funnel through one handle. Calls for distinct ids may be
/// interleaved arbitrarily after readiness.
pub trait TransportHandle: Send + Sync {
    /// Opens a transport-level connection for `id`.
    fn create(&self, id: SocketId, request: &CreateRequest);

    /// Hands an encoded payload to the transport.
    ///
    /// Returns a negative value when the whole payload was accepted,
    /// otherwise the number of bytes the transport could not yet buffer.
    fn send(&self, id: SocketId, encoded_payload: &str) -> i64;

    /// Starts closing the connection for `id`.
    fn close(&self, id: SocketId);

    /// Loads a socket policy file. Best effort.
    fn load_policy_file(&self, url: &str);

    /// Returns every notification available right now, in transport order.
    fn receive_notifications(&self) -> Vec<RawNotification>;

    /// Tells the transport which page is using it.
    fn set_caller_url(&self, _url: &str) {}

    /// Enables or disables transport-side debug output.
    fn set_debug(&self, _debug: bool) {}
}
