//! Error types for tabpilot.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! Internal operations return [`Result<T>`] which uses [`Error`]. The
//! public control and retrieval operations on [`Driver`](crate::Driver)
//! never return an error: they fold it into a text
//! [`Content`](crate::protocol::Content) part instead.
//!
//! ```ignore
//! use tabpilot::{Result, Error};
//!
//! async fn example(session: &Session) -> Result<()> {
//!     let element = find_element(session, "#submit").await?
//!         .ok_or_else(|| Error::script_error("submit button missing"))?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionTimeout`], [`Error::ConnectionClosed`] |
//! | Protocol | [`Error::InvalidArgument`], [`Error::Protocol`], [`Error::UnknownContentType`] |
//! | Tabs | [`Error::TabNotFound`], [`Error::NoActiveTab`], [`Error::InvalidTabId`] |
//! | Automation channel | [`Error::AlreadyAttached`], [`Error::Attach`], [`Error::Command`] |
//! | Selector | [`Error::InvalidSelector`] |
//! | Execution | [`Error::ScriptError`], [`Error::RequestTimeout`] |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::WebSocket`], [`Error::Base64`], [`Error::Url`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio::sync::oneshot::error::RecvError;
use tokio_tungstenite::tungstenite::Error as WsError;

use crate::identifiers::{RequestId, TabId};

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when driver configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Bridge connection failed.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Connection timeout waiting for the extension.
    #[error("Connection timeout after {timeout_ms}ms")]
    ConnectionTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// Bridge connection closed unexpectedly.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Invalid argument in an action or command.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    /// Protocol violation or unexpected response shape.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    /// Content part with an unrecognized `type` tag.
    #[error("Unknown content part type: {tag}")]
    UnknownContentType {
        /// The unrecognized tag.
        tag: String,
    },

    // ========================================================================
    // Tab Errors
    // ========================================================================
    /// Tab not found.
    #[error("Tab not found: {tab_id}")]
    TabNotFound {
        /// The missing tab ID.
        tab_id: TabId,
    },

    /// No active tab in the current window.
    #[error("No active tab found")]
    NoActiveTab,

    /// A tab id string that is not a valid tab id.
    #[error("Invalid tab ID: {raw}")]
    InvalidTabId {
        /// The id as received.
        raw: String,
    },

    // ========================================================================
    // Automation Channel Errors
    // ========================================================================
    /// A debugger is already attached to the tab.
    ///
    /// The session manager treats this as a successful attach.
    #[error("Another debugger is already attached to tab {tab_id}")]
    AlreadyAttached {
        /// Tab the attach targeted.
        tab_id: TabId,
    },

    /// Attaching the automation channel failed.
    #[error("Failed to attach to tab {tab_id}: {message}")]
    Attach {
        /// Tab the attach targeted.
        tab_id: TabId,
        /// Reason reported by the host.
        message: String,
    },

    /// A low-level automation command failed.
    #[error("{method} failed: {message}")]
    Command {
        /// Command method, e.g. `DOM.getBoxModel`.
        method: String,
        /// Reason reported by the host.
        message: String,
    },

    // ========================================================================
    // Selector Errors
    // ========================================================================
    /// Selector could not be parsed.
    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector {
        /// The offending selector.
        selector: String,
        /// What went wrong.
        message: String,
    },

    // ========================================================================
    // Execution Errors
    // ========================================================================
    /// Script execution error in the page.
    #[error("Script error: {message}")]
    ScriptError {
        /// Error message from script execution.
        message: String,
    },

    /// Bridge request timeout.
    #[error("Request {request_id} timed out after {timeout_ms}ms")]
    RequestTimeout {
        /// The request ID that timed out.
        request_id: RequestId,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),

    /// Base64 payload could not be decoded.
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// URL could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Channel receive error.
    #[error("Channel closed")]
    ChannelClosed(#[from] RecvError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a connection timeout error.
    #[inline]
    pub fn connection_timeout(timeout_ms: u64) -> Self {
        Self::ConnectionTimeout { timeout_ms }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a tab not found error.
    #[inline]
    pub fn tab_not_found(tab_id: TabId) -> Self {
        Self::TabNotFound { tab_id }
    }

    /// Creates an invalid tab id error.
    #[inline]
    pub fn invalid_tab_id(raw: impl Into<String>) -> Self {
        Self::InvalidTabId { raw: raw.into() }
    }

    /// Creates an attach error.
    #[inline]
    pub fn attach(tab_id: TabId, message: impl Into<String>) -> Self {
        Self::Attach {
            tab_id,
            message: message.into(),
        }
    }

    /// Creates a command error.
    #[inline]
    pub fn command(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Command {
            method: method.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid selector error.
    #[inline]
    pub fn invalid_selector(selector: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.into(),
            message: message.into(),
        }
    }

    /// Creates a script error.
    #[inline]
    pub fn script_error(message: impl Into<String>) -> Self {
        Self::ScriptError {
            message: message.into(),
        }
    }

    /// Creates a request timeout error.
    #[inline]
    pub fn request_timeout(request_id: RequestId, timeout_ms: u64) -> Self {
        Self::RequestTimeout {
            request_id,
            timeout_ms,
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::ConnectionTimeout { .. } | Self::RequestTimeout { .. }
        )
    }

    /// Returns `true` if the tab already had a debugger attached.
    #[inline]
    #[must_use]
    pub fn is_already_attached(&self) -> bool {
        matches!(self, Self::AlreadyAttached { .. })
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::ConnectionTimeout { .. }
                | Self::ConnectionClosed
                | Self::WebSocket(_)
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::ErrorKind;

    #[test]
    fn test_error_display() {
        let err = Error::connection("failed to connect");
        assert_eq!(err.to_string(), "Connection failed: failed to connect");
    }

    #[test]
    fn test_no_active_tab_display() {
        assert_eq!(Error::NoActiveTab.to_string(), "No active tab found");
    }

    #[test]
    fn test_invalid_tab_id_display() {
        let err = Error::invalid_tab_id("abc");
        assert_eq!(err.to_string(), "Invalid tab ID: abc");
    }

    #[test]
    fn test_command_display() {
        let err = Error::command("DOM.getBoxModel", "Could not compute box model.");
        assert_eq!(
            err.to_string(),
            "DOM.getBoxModel failed: Could not compute box model."
        );
    }

    #[test]
    fn test_is_already_attached() {
        let tab_id = TabId::new(3).expect("valid tab id");
        assert!(Error::AlreadyAttached { tab_id }.is_already_attached());
        assert!(!Error::attach(tab_id, "denied").is_already_attached());
    }

    #[test]
    fn test_is_timeout() {
        let timeout_err = Error::ConnectionTimeout { timeout_ms: 5000 };
        let other_err = Error::connection("test");

        assert!(timeout_err.is_timeout());
        assert!(!other_err.is_timeout());
    }

    #[test]
    fn test_is_connection_error() {
        assert!(Error::connection("test").is_connection_error());
        assert!(Error::ConnectionClosed.is_connection_error());
        assert!(!Error::config("test").is_connection_error());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = IoError::new(ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
