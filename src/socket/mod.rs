//! Socket facade.
//!
//! This module contains the application-facing socket type and the pieces
//! it is built from:
//!
//! - [`WebSocket`] - Per-connection facade and state machine
//! - [`ReadyState`] - Connection lifecycle
//! - [`ConnectOptions`] - Sub-protocols and transport options
//! - [`Listener`] - Event callback type

// ============================================================================
// Submodules
// ============================================================================

/// Socket facade implementation.
pub mod core;

/// Listener registry.
pub mod listeners;

/// Connection options.
pub mod options;

/// Lifecycle states.
pub mod state;

// ============================================================================
// Re-exports
// ============================================================================

pub use self::core::WebSocket;
pub use listeners::Listener;
pub use options::ConnectOptions;
pub use state::ReadyState;
