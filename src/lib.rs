//! tabpilot - page snapshots and browser control for LLM agents.
//!
//! The crate sits between an agent orchestrator and a browser. It turns
//! loaded pages into compact text views a language model can read, and it
//! drives pages through trusted input events issued over the browser's
//! debugger channel.
//!
//! # Architecture
//!
//! - **Local end (Rust)**: the [`Driver`] receives [`Action`]s and answers
//!   with [`Content`].
//! - **Remote end (extension)**: a browser extension connects over
//!   WebSocket and performs tab queries, script injection and debugger
//!   commands on request.
//!
//! The two halves meet at the [`BrowserHost`] trait; [`RemoteHost`] is the
//! bridge implementation, and [`capture`] runs on any [`PageContext`], so
//! already-fetched HTML can be captured with a [`StaticPage`].
//!
//! # Quick Start
//!
//! ```no_run
//! use std::net::{IpAddr, Ipv4Addr};
//! use std::sync::Arc;
//!
//! use tabpilot::{Action, Driver, RemoteHost, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let (host, _ready) = RemoteHost::listen(IpAddr::V4(Ipv4Addr::LOCALHOST), 9321).await?;
//!     let driver = Driver::builder().host(Arc::new(host)).build()?;
//!
//!     let action: Action = serde_json::from_str(r#"{"name": "getActiveTabSnapshot"}"#)?;
//!     println!("{}", driver.handle(action).await.joined_text());
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`browser`] | Host boundary, bridge host, sessions, element resolution |
//! | [`capture`] | Snapshot, full-html, markdown and text views |
//! | [`dom`] | Detached HTML tree on `scraper`, with parsing and selection |
//! | [`driver`] | [`Driver`], builder and options |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Action, content, automation and bridge message types |
//! | [`transport`] | WebSocket server and connection |

// ============================================================================
// Modules
// ============================================================================

/// Browser host boundary and automation sessions.
pub mod browser;

/// Page capture engine.
pub mod capture;

/// Detached HTML tree for capture.
pub mod dom;

/// Driver, builder and options.
///
/// Use [`Driver::builder()`] to create a configured driver instance.
pub mod driver;

/// Error types and result aliases.
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// Message types: orchestrator actions, content, automation and bridge.
pub mod protocol;

/// WebSocket bridge transport.
pub mod transport;

/// Browser control verbs on [`Driver`].
mod control;

/// Tab views on [`Driver`].
mod retrieval;

#[cfg(test)]
mod testing;

// ============================================================================
// Re-exports
// ============================================================================

// Browser types
pub use browser::{BrowserHost, RemoteHost, TabInfo};

// Capture
pub use capture::page::PageContext;
pub use capture::{CaptureMode, StaticPage, capture};

// Driver types
pub use driver::{Driver, DriverBuilder, DriverOptions};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::TabId;

// Protocol types
pub use protocol::{Action, Content, ContentPart};
