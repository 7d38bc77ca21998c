//! Bridge context.
//!
//! Everything sockets on one transport share lives here:
//!
//! - [`Bridge`] - Scheduler, task queue and instance registry
//! - [`BridgeBuilder`] - Fluent configuration
//! - [`BridgeConfig`] - Settings applied on transport readiness
//! - [`translator`] - Raw notification to event translation

// ============================================================================
// Submodules
// ============================================================================

/// Builder pattern for bridge configuration.
pub mod builder;

/// Readiness settings.
pub mod config;

/// Bridge context implementation.
pub mod core;

/// Socket id to instance mapping.
pub(crate) mod registry;

/// Notification translation.
pub mod translator;

// ============================================================================
// Re-exports
// ============================================================================

pub use self::core::Bridge;
pub use builder::BridgeBuilder;
pub use config::BridgeConfig;
