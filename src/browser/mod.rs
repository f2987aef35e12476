//! Browser access.
//!
//! | Module | Description |
//! |--------|-------------|
//! | `host` | [`BrowserHost`] capability trait and [`TabInfo`] |
//! | `remote` | [`RemoteHost`]: the host over the extension bridge |
//! | `session` | Attach/detach bracketing per control verb |
//! | `resolver` | Selector to node id, attributes and box |
//! | `keyboard` | Key table, modifiers and key strokes |

// ============================================================================
// Submodules
// ============================================================================

/// Browser capability boundary.
pub mod host;

/// Key table and modifiers.
pub mod keyboard;

/// Host over the extension bridge.
pub mod remote;

/// Element resolution over the automation channel.
pub mod resolver;

/// Automation sessions.
pub mod session;

// ============================================================================
// Re-exports
// ============================================================================

pub use host::{BrowserHost, TabInfo};
pub use keyboard::{Key, KeyStroke, Modifier};
pub use remote::{RemoteHost, ScriptedPage};
pub use resolver::{BoundingBox, ElementDescriptor};
