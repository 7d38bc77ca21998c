//! Per-socket connection options.
//!
//! # Example
//!
//! ```
//! use socket_bridge::ConnectOptions;
//!
//! let options = ConnectOptions::new()
//!     .with_protocol("chat")
//!     .with_proxy("proxy.example.com", 8080)
//!     .with_headers("Cookie: session=abc");
//!
//! assert_eq!(options.protocols, vec!["chat".to_string()]);
//! ```

// ============================================================================
// ConnectOptions
// ============================================================================

/// Sub-protocol and transport-selection parameters for one socket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Requested sub-protocols, in preference order.
    pub protocols: Vec<String>,

    /// Proxy host for the transport to tunnel through.
    pub proxy_host: Option<String>,

    /// Proxy port, `0` when unset.
    pub proxy_port: u16,

    /// Extra handshake headers, passed through verbatim.
    pub headers: Option<String>,
}

// ============================================================================
// Constructors
// ============================================================================

impl ConnectOptions {
    /// Creates options with no sub-protocols, proxy, or headers.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            protocols: Vec::new(),
            proxy_host: None,
            proxy_port: 0,
            headers: None,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl ConnectOptions {
    /// Appends one sub-protocol.
    #[inline]
    #[must_use]
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocols.push(protocol.into());
        self
    }

    /// Appends several sub-protocols.
    #[inline]
    #[must_use]
    pub fn with_protocols<I, S>(mut self, protocols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.protocols.extend(protocols.into_iter().map(Into::into));
        self
    }

    /// Routes the connection through a proxy.
    #[inline]
    #[must_use]
    pub fn with_proxy(mut self, host: impl Into<String>, port: u16) -> Self {
        self.proxy_host = Some(host.into());
        self.proxy_port = port;
        self
    }

    /// Sets extra handshake headers.
    #[inline]
    #[must_use]
    pub fn with_headers(mut self, headers: impl Into<String>) -> Self {
        self.headers = Some(headers.into());
        self
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<&str> for ConnectOptions {
    /// A single sub-protocol name.
    fn from(protocol: &str) -> Self {
        Self::new().with_protocol(protocol)
    }
}

impl From<String> for ConnectOptions {
    fn from(protocol: String) -> Self {
        Self::new().with_protocol(protocol)
    }
}

impl From<Vec<String>> for ConnectOptions {
    fn from(protocols: Vec<String>) -> Self {
        Self {
            protocols,
            ..Self::new()
        }
    }
}

impl From<&[&str]> for ConnectOptions {
    fn from(protocols: &[&str]) -> Self {
        Self::new().with_protocols(protocols.iter().copied())
    }
}

// ============================================================================
// Tests
// ============================================================================
