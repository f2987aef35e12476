//! Driver tuning options.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use tabpilot::DriverOptions;
//!
//! let options = DriverOptions::new()
//!     .with_capture_limit(8_000)
//!     .with_wait_poll_interval(Duration::from_millis(250));
//!
//! assert_eq!(options.capture_limit, 8_000);
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use crate::browser::keyboard::Modifier;
use crate::capture::DEFAULT_CAPTURE_LIMIT;

// ============================================================================
// DriverOptions
// ============================================================================

/// Behavior knobs shared by every command.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverOptions {
    /// Character limit of captured views.
    pub capture_limit: usize,

    /// Delay between `waitForElement` polls.
    pub wait_poll_interval: Duration,

    /// Modifier combined with `a` to select all when clearing a field.
    pub select_all_modifier: Modifier,

    /// Advisory screenshot quality (0-100).
    pub screenshot_quality: u8,

    /// Never let two sessions on one tab overlap.
    pub serialize_tab_commands: bool,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl DriverOptions {
    /// Creates options with default settings.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            capture_limit: DEFAULT_CAPTURE_LIMIT,
            wait_poll_interval: Duration::from_millis(100),
            select_all_modifier: Modifier::platform_select_all(),
            screenshot_quality: 80,
            serialize_tab_commands: true,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl DriverOptions {
    /// Sets the capture character limit.
    #[inline]
    #[must_use]
    pub fn with_capture_limit(mut self, limit: usize) -> Self {
        self.capture_limit = limit;
        self
    }

    /// Sets the `waitForElement` poll interval.
    #[inline]
    #[must_use]
    pub fn with_wait_poll_interval(mut self, interval: Duration) -> Self {
        self.wait_poll_interval = interval;
        self
    }

    /// Sets the select-all modifier, e.g. [`Modifier::Meta`] for macOS hosts.
    #[inline]
    #[must_use]
    pub fn with_select_all_modifier(mut self, modifier: Modifier) -> Self {
        self.select_all_modifier = modifier;
        self
    }

    /// Sets the screenshot quality, clamped to 100.
    #[inline]
    #[must_use]
    pub fn with_screenshot_quality(mut self, quality: u8) -> Self {
        self.screenshot_quality = quality.min(100);
        self
    }

    /// Enables or disables per-tab command serialization.
    #[inline]
    #[must_use]
    pub fn with_serialized_tab_commands(mut self, serialize: bool) -> Self {
        self.serialize_tab_commands = serialize;
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
    fn test_defaults() {
        let options = DriverOptions::default();
        assert_eq!(options.capture_limit, 15_000);
        assert_eq!(options.wait_poll_interval, Duration::from_millis(100));
        assert_eq!(options.screenshot_quality, 80);
        assert!(options.serialize_tab_commands);
    }

    #[test]
    fn test_builder_chain() {
        let options = DriverOptions::new()
            .with_select_all_modifier(Modifier::Meta)
            .with_screenshot_quality(250)
            .with_serialized_tab_commands(false);
        assert_eq!(options.select_all_modifier, Modifier::Meta);
        assert_eq!(options.screenshot_quality, 100);
        assert!(!options.serialize_tab_commands);
    }
}
