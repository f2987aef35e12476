//! WebSocket bridge transport.
//!
//! The browser extension is the WebSocket client; this crate binds the
//! server and drives the extension with request/response pairs.
//!
//! ```text
//! ┌──────────────────┐                              ┌──────────────────┐
//! │  tabpilot        │         WebSocket            │  Extension       │
//! │                  │◄────────────────────────────►│  (background)    │
//! │  PendingServer   │      localhost:PORT          │                  │
//! │  → Connection    │                              │  tabs, scripting │
//! │  → RemoteHost    │                              │  debugger APIs   │
//! └──────────────────┘                              └──────────────────┘
//! ```
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | Socket I/O loop and response correlation |
//! | `server` | Binding and the READY handshake |

// ============================================================================
// Submodules
// ============================================================================

/// Socket I/O loop and response correlation.
pub mod connection;

/// Listener for the extension's connection.
pub mod server;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{Connection, ReadyData};
pub use server::PendingServer;
