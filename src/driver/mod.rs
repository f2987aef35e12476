//! Driver module.
//!
//! This module provides the entry point the agent talks to.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Driver`] | Dispatches actions to retrieval and control |
//! | [`DriverBuilder`] | Fluent configuration builder |
//! | [`DriverOptions`] | Capture limit, polling, keyboard and screenshot settings |

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder pattern for driver configuration.
pub mod builder;

/// Core driver implementation.
pub mod core;

/// Driver behavior options.
pub mod options;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::DriverBuilder;
pub use core::Driver;
pub use options::DriverOptions;
