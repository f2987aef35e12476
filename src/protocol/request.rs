//! Bridge request and response messages.
//!
//! Requests go from the local end (Rust) to the extension; responses come
//! back correlated by `id`.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::{RequestId, TabId};

use super::Command;

// ============================================================================
// Constants
// ============================================================================

/// Debugger protocol version requested on attach.
pub const DEBUGGER_PROTOCOL_VERSION: &str = "1.3";

// ============================================================================
// BridgeCommand
// ============================================================================

/// Extension API calls carried over the bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum BridgeCommand {
    /// `tabs.query`.
    #[serde(rename = "tabs.query")]
    TabsQuery {
        /// Only the active tab.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        active: Option<bool>,
        /// Only tabs of the current window.
        #[serde(
            rename = "currentWindow",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        current_window: Option<bool>,
    },

    /// `tabs.get`.
    #[serde(rename = "tabs.get")]
    TabsGet {
        /// Tab to read.
        #[serde(rename = "tabId")]
        tab_id: TabId,
    },

    /// `scripting.executeScript` in the tab's main frame.
    #[serde(rename = "scripting.executeScript")]
    ExecuteScript {
        /// Target tab.
        #[serde(rename = "tabId")]
        tab_id: TabId,
        /// Function source, called with `args`.
        script: String,
        /// Arguments passed to the function.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<Value>,
    },

    /// `debugger.attach`.
    #[serde(rename = "debugger.attach")]
    DebuggerAttach {
        /// Target tab.
        #[serde(rename = "tabId")]
        tab_id: TabId,
        /// Protocol version.
        version: String,
    },

    /// `debugger.detach`.
    #[serde(rename = "debugger.detach")]
    DebuggerDetach {
        /// Target tab.
        #[serde(rename = "tabId")]
        tab_id: TabId,
    },

    /// `debugger.sendCommand`.
    #[serde(rename = "debugger.sendCommand")]
    DebuggerSendCommand {
        /// Target tab.
        #[serde(rename = "tabId")]
        tab_id: TabId,
        /// Automation command.
        command: Command,
    },
}

impl BridgeCommand {
    /// Returns the bridge method name.
    #[must_use]
    pub fn method(&self) -> &'static str {
        match self {
            Self::TabsQuery { .. } => "tabs.query",
            Self::TabsGet { .. } => "tabs.get",
            Self::ExecuteScript { .. } => "scripting.executeScript",
            Self::DebuggerAttach { .. } => "debugger.attach",
            Self::DebuggerDetach { .. } => "debugger.detach",
            Self::DebuggerSendCommand { .. } => "debugger.sendCommand",
        }
    }

    /// `debugger.attach` at the supported protocol version.
    #[inline]
    #[must_use]
    pub fn attach(tab_id: TabId) -> Self {
        Self::DebuggerAttach {
            tab_id,
            version: DEBUGGER_PROTOCOL_VERSION.to_string(),
        }
    }
}

// ============================================================================
// Request
// ============================================================================

/// A request from local end to the extension.
///
/// # Format
///
/// ```json
/// {
///   "id": "uuid",
///   "method": "debugger.sendCommand",
///   "params": { "tabId": 1, "command": { "method": "DOM.enable" } }
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    /// Unique identifier for request/response correlation.
    pub id: RequestId,

    /// Bridge method and params.
    #[serde(flatten)]
    pub command: BridgeCommand,
}

impl Request {
    /// Creates a new request with auto-generated ID.
    #[inline]
    #[must_use]
    pub fn new(command: BridgeCommand) -> Self {
        Self {
            id: RequestId::generate(),
            command,
        }
    }
}

// ============================================================================
// Response
// ============================================================================

/// A response from the extension.
///
/// # Format
///
/// Success:
/// ```json
/// { "id": "uuid", "type": "success", "result": { ... } }
/// ```
///
/// Error:
/// ```json
/// { "id": "uuid", "type": "error", "error": "code", "message": "text" }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    /// Matches the request `id`.
    pub id: RequestId,

    /// Response type.
    #[serde(rename = "type")]
    pub response_type: ResponseType,

    /// Result data (if success).
    #[serde(default)]
    pub result: Option<Value>,

    /// Error code (if error).
    #[serde(default)]
    pub error: Option<String>,

    /// Error message (if error).
    #[serde(default)]
    pub message: Option<String>,
}

impl Response {
    /// Returns `true` if this is a success response.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.response_type == ResponseType::Success
    }

    /// Error text of an error response: the message, else the code.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        match self.response_type {
            ResponseType::Success => None,
            ResponseType::Error => Some(
                self.message
                    .clone()
                    .or_else(|| self.error.clone())
                    .unwrap_or_else(|| "unknown error".to_string()),
            ),
        }
    }

    /// Extracts the result value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the response was an error.
    pub fn into_result(self) -> Result<Value> {
        match self.error_message() {
            None => Ok(self.result.unwrap_or(Value::Null)),
            Some(message) => Err(Error::protocol(message)),
        }
    }

    /// Gets a string value from the result.
    ///
    /// Returns empty string if key not found or not a string.
    #[inline]
    #[must_use]
    pub fn get_string(&self, key: &str) -> String {
        self.result
            .as_ref()
            .and_then(|v| v.get(key))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    }
}

// ============================================================================
// ResponseType
// ============================================================================

/// Response type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Successful response.
    Success,
    /// Error response.
    Error,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::protocol::DomCommand;

    #[test]
    fn test_send_command_request_shape() {
        let tab_id = TabId::new(3).expect("valid tab id");
        let request = Request::new(BridgeCommand::DebuggerSendCommand {
            tab_id,
            command: Command::Dom(DomCommand::Enable),
        });
        let value = serde_json::to_value(&request).expect("serialize");

        assert_eq!(value["method"], "debugger.sendCommand");
        assert_eq!(
            value["params"],
            json!({"tabId": 3, "command": {"method": "DOM.enable"}})
        );
        assert!(value["id"].is_string());
    }

    #[test]
    fn test_attach_uses_protocol_version() {
        let tab_id = TabId::new(1).expect("valid tab id");
        let value = serde_json::to_value(BridgeCommand::attach(tab_id)).expect("serialize");
        assert_eq!(
            value,
            json!({"method": "debugger.attach", "params": {"tabId": 1, "version": "1.3"}})
        );
    }

    #[test]
    fn test_tabs_query_skips_unset_filters() {
        let value = serde_json::to_value(BridgeCommand::TabsQuery {
            active: Some(true),
            current_window: None,
        })
        .expect("serialize");
        assert_eq!(value, json!({"method": "tabs.query", "params": {"active": true}}));
    }

    #[test]
    fn test_success_response() {
        let json_str = r#"{
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "type": "success",
            "result": {"title": "Example"}
        }"#;

        let response: Response = serde_json::from_str(json_str).expect("parse");
        assert!(response.is_success());
        assert_eq!(response.get_string("title"), "Example");
    }

    #[test]
    fn test_error_response() {
        let json_str = r#"{
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "type": "error",
            "error": "no such tab",
            "message": "No tab with id: 9"
        }"#;

        let response: Response = serde_json::from_str(json_str).expect("parse");
        assert_eq!(response.error_message().as_deref(), Some("No tab with id: 9"));
        assert!(response.into_result().is_err());
    }
}
