//! Builder pattern for bridge configuration.
//!
//! Provides a fluent API for configuring and creating [`Bridge`] instances.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use socket_bridge::{Bridge, ManualScheduler};
//!
//! # fn example() -> socket_bridge::Result<()> {
//! let bridge = Bridge::builder()
//!     .scheduler(Arc::new(ManualScheduler::new()))
//!     .caller_url("https://example.com/app")
//!     .build()?;
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use url::Url;

use crate::error::{Error, Result};
use crate::transport::Scheduler;

use super::config::BridgeConfig;
use super::core::Bridge;

// ============================================================================
// BridgeBuilder
// ============================================================================

/// Builder for configuring a [`Bridge`] instance.
///
/// Use [`Bridge::builder()`] to create a new builder.
#[derive(Default, Clone)]
pub struct BridgeBuilder {
    /// Scheduler driving deferred work.
    scheduler: Option<Arc<dyn Scheduler>>,
    /// Settings applied on readiness.
    config: BridgeConfig,
}

// ============================================================================
// BridgeBuilder Implementation
// ============================================================================

impl BridgeBuilder {
    /// Creates a new builder with no scheduler and default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the scheduler that runs deferred work.
    ///
    /// # Arguments
    ///
    /// * `scheduler` - e.g. a [`ManualScheduler`](crate::ManualScheduler)
    ///   or [`ChannelScheduler`](crate::ChannelScheduler)
    #[inline]
    #[must_use]
    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Sets the caller URL reported to the transport.
    #[inline]
    #[must_use]
    pub fn caller_url(mut self, url: impl Into<String>) -> Self {
        self.config.caller_url = Some(url.into());
        self
    }

    /// Enables or disables transport debug output.
    #[inline]
    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Adds a policy file to load once the transport is ready.
    #[inline]
    #[must_use]
    pub fn policy_file(mut self, url: impl Into<String>) -> Self {
        self.config.policy_files.push(url.into());
        self
    }

    /// Replaces all settings at once.
    #[inline]
    #[must_use]
    pub fn config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the bridge with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if no scheduler was set
    /// - [`Error::Url`] if the caller URL is not an absolute URL
    pub fn build(self) -> Result<Bridge> {
        let scheduler = self.validate_scheduler()?;
        self.validate_caller_url()?;

        Ok(Bridge::new(self.config, scheduler))
    }
}

// ============================================================================
// Validation
// ============================================================================

impl BridgeBuilder {
    /// Validates the scheduler configuration.
    fn validate_scheduler(&self) -> Result<Arc<dyn Scheduler>> {
        self.scheduler.clone().ok_or_else(|| {
            Error::config(
                "A scheduler is required. Use .scheduler() to set it.\n\
                 Example: Bridge::builder().scheduler(Arc::new(ManualScheduler::new()))",
            )
        })
    }

    /// Validates the caller URL, if set.
    fn validate_caller_url(&self) -> Result<()> {
        if let Some(ref url) = self.config.caller_url {
            Url::parse(url)?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
