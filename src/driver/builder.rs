//! Builder pattern for driver configuration.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tabpilot::{BrowserHost, Driver, DriverOptions};
//!
//! # fn example(host: Arc<dyn BrowserHost>) -> tabpilot::Result<()> {
//! let driver = Driver::builder()
//!     .host(host)
//!     .options(DriverOptions::new().with_capture_limit(10_000))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use crate::browser::host::BrowserHost;
use crate::error::{Error, Result};

use super::core::Driver;
use super::options::DriverOptions;

// ============================================================================
// DriverBuilder
// ============================================================================

/// Builder for configuring a [`Driver`] instance.
///
/// Use [`Driver::builder()`] to create a new builder.
#[derive(Default, Clone)]
pub struct DriverBuilder {
    /// Browser host.
    host: Option<Arc<dyn BrowserHost>>,
    /// Behavior options.
    options: DriverOptions,
}

impl fmt::Debug for DriverBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverBuilder")
            .field("has_host", &self.host.is_some())
            .field("options", &self.options)
            .finish()
    }
}

// ============================================================================
// DriverBuilder Implementation
// ============================================================================

impl DriverBuilder {
    /// Creates a new driver builder with no host and default options.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the browser host.
    #[inline]
    #[must_use]
    pub fn host(mut self, host: Arc<dyn BrowserHost>) -> Self {
        self.host = Some(host);
        self
    }

    /// Replaces the options.
    #[inline]
    #[must_use]
    pub fn options(mut self, options: DriverOptions) -> Self {
        self.options = options;
        self
    }

    /// Builds the driver with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if no host is set
    /// - [`Error::Config`] if the capture limit or poll interval is zero
    pub fn build(self) -> Result<Driver> {
        let host = self.host.ok_or_else(|| {
            Error::config(
                "A browser host is required. Use .host() to set it.\n\
                 Example: Driver::builder().host(Arc::new(remote_host))",
            )
        })?;
        Self::validate_options(&self.options)?;

        Ok(Driver::new(host, self.options))
    }
}

// ============================================================================
// Validation
// ============================================================================

impl DriverBuilder {
    fn validate_options(options: &DriverOptions) -> Result<()> {
        if options.capture_limit == 0 {
            return Err(Error::config("capture_limit must be greater than zero"));
        }
        if options.wait_poll_interval.is_zero() {
            return Err(Error::config("wait_poll_interval must be greater than zero"));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
