//! Bridge configuration.
//!
//! # Example
//!
//! ```
//! use socket_bridge::BridgeConfig;
//!
//! let config = BridgeConfig::new()
//!     .with_caller_url("https://example.com/app")
//!     .with_debug()
//!     .with_policy_file("xmlsocket://example.com:843");
//!
//! assert!(config.debug);
//! ```

// ============================================================================
// BridgeConfig
// ============================================================================

/// Settings applied when the transport becomes ready.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BridgeConfig {
    /// URL of the page using the bridge, reported to the transport.
    pub caller_url: Option<String>,

    /// Enable transport-side debug output.
    pub debug: bool,

    /// Policy files to load as soon as the transport is ready.
    pub policy_files: Vec<String>,
}

// ============================================================================
// Constructors
// ============================================================================

impl BridgeConfig {
    /// Creates a configuration with no caller URL, debug off, and no
    /// policy files.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            caller_url: None,
            debug: false,
            policy_files: Vec::new(),
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl BridgeConfig {
    /// Sets the caller URL.
    #[inline]
    #[must_use]
    pub fn with_caller_url(mut self, url: impl Into<String>) -> Self {
        self.caller_url = Some(url.into());
        self
    }

    /// Enables transport debug output.
    #[inline]
    #[must_use]
    pub fn with_debug(mut self) -> Self {
        self.debug = true;
        self
    }

    /// Adds a policy file to load on readiness.
    #[inline]
    #[must_use]
    pub fn with_policy_file(mut self, url: impl Into<String>) -> Self {
        self.policy_files.push(url.into());
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = BridgeConfig::new();
        assert!(config.caller_url.is_none());
        assert!(!config.debug);
        assert!(config.policy_files.is_empty());
        assert_eq!(config, BridgeConfig::default());
    }

    #[test]
    fn test_builder_chain() {
        let config = BridgeConfig::new()
            .with_caller_url("https://example.com/")
            .with_policy_file("a")
            .with_policy_file("b");

        assert_eq!(config.caller_url.as_deref(), Some("https://example.com/"));
        assert_eq!(config.policy_files, vec!["a", "b"]);
    }
}
