//! Automation-channel command definitions organized by domain.
//!
//! Commands follow the `Domain.methodName` format of the browser's debugger
//! protocol and serialize as `{"method": ..., "params": {...}}`.
//!
//! # Command Domains
//!
//! | Domain | Commands |
//! |--------|----------|
//! | `DOM` | Document, search, node description, geometry, scroll-into-view |
//! | `Input` | Mouse and keyboard event dispatch |
//! | `Page` | Layout metrics, navigation, screenshots |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::identifiers::NodeId;

// ============================================================================
// Command Wrapper
// ============================================================================

/// All automation commands organized by domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Command {
    /// DOM domain commands.
    Dom(DomCommand),
    /// Input domain commands.
    Input(InputCommand),
    /// Page domain commands.
    Page(PageCommand),
}

impl Command {
    /// Returns the protocol method name, e.g. `DOM.getBoxModel`.
    #[must_use]
    pub fn method(&self) -> &'static str {
        match self {
            Self::Dom(cmd) => cmd.method(),
            Self::Input(cmd) => cmd.method(),
            Self::Page(cmd) => cmd.method(),
        }
    }
}

impl From<DomCommand> for Command {
    fn from(cmd: DomCommand) -> Self {
        Self::Dom(cmd)
    }
}

impl From<InputCommand> for Command {
    fn from(cmd: InputCommand) -> Self {
        Self::Input(cmd)
    }
}

impl From<PageCommand> for Command {
    fn from(cmd: PageCommand) -> Self {
        Self::Page(cmd)
    }
}

// ============================================================================
// DOM Commands
// ============================================================================

/// DOM domain commands used by element resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum DomCommand {
    /// Enable the DOM domain.
    #[serde(rename = "DOM.enable")]
    Enable,

    /// Fetch the document root. Required before searching.
    #[serde(rename = "DOM.getDocument")]
    GetDocument,

    /// Start a selector search.
    #[serde(rename = "DOM.performSearch")]
    PerformSearch {
        /// CSS selector (or plain text / XPath, per the protocol).
        query: String,
        /// Search inside user-agent shadow roots too.
        #[serde(rename = "includeUserAgentShadowDOM")]
        include_user_agent_shadow_dom: bool,
    },

    /// Read a window of search results.
    #[serde(rename = "DOM.getSearchResults")]
    GetSearchResults {
        /// Id returned by `performSearch`.
        #[serde(rename = "searchId")]
        search_id: String,
        /// Start index (inclusive).
        #[serde(rename = "fromIndex")]
        from_index: u32,
        /// End index (exclusive).
        #[serde(rename = "toIndex")]
        to_index: u32,
    },

    /// Release a search.
    #[serde(rename = "DOM.discardSearchResults")]
    DiscardSearchResults {
        /// Id returned by `performSearch`.
        #[serde(rename = "searchId")]
        search_id: String,
    },

    /// Describe a node (name and attributes).
    #[serde(rename = "DOM.describeNode")]
    DescribeNode {
        /// Target node.
        #[serde(rename = "nodeId")]
        node_id: NodeId,
    },

    /// Get the node's box model.
    #[serde(rename = "DOM.getBoxModel")]
    GetBoxModel {
        /// Target node.
        #[serde(rename = "nodeId")]
        node_id: NodeId,
    },

    /// Get the node's attributes as a flat name/value array.
    #[serde(rename = "DOM.getAttributes")]
    GetAttributes {
        /// Target node.
        #[serde(rename = "nodeId")]
        node_id: NodeId,
    },

    /// Get the node's outer HTML.
    #[serde(rename = "DOM.getOuterHTML")]
    GetOuterHtml {
        /// Target node.
        #[serde(rename = "nodeId")]
        node_id: NodeId,
    },

    /// Scroll the node into view.
    #[serde(rename = "DOM.scrollIntoViewIfNeeded")]
    ScrollIntoViewIfNeeded {
        /// Target node.
        #[serde(rename = "nodeId")]
        node_id: NodeId,
        /// Center the node in the viewport.
        #[serde(rename = "centerIfNeeded")]
        center_if_needed: bool,
    },
}

impl DomCommand {
    /// Returns the protocol method name.
    #[must_use]
    pub fn method(&self) -> &'static str {
        match self {
            Self::Enable => "DOM.enable",
            Self::GetDocument => "DOM.getDocument",
            Self::PerformSearch { .. } => "DOM.performSearch",
            Self::GetSearchResults { .. } => "DOM.getSearchResults",
            Self::DiscardSearchResults { .. } => "DOM.discardSearchResults",
            Self::DescribeNode { .. } => "DOM.describeNode",
            Self::GetBoxModel { .. } => "DOM.getBoxModel",
            Self::GetAttributes { .. } => "DOM.getAttributes",
            Self::GetOuterHtml { .. } => "DOM.getOuterHTML",
            Self::ScrollIntoViewIfNeeded { .. } => "DOM.scrollIntoViewIfNeeded",
        }
    }
}

// ============================================================================
// Input Commands
// ============================================================================

/// Input domain commands for trusted mouse and keyboard events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum InputCommand {
    /// Dispatch a mouse event.
    #[serde(rename = "Input.dispatchMouseEvent")]
    DispatchMouseEvent(MouseEvent),

    /// Dispatch a key event.
    #[serde(rename = "Input.dispatchKeyEvent")]
    DispatchKeyEvent(KeyEvent),
}

impl InputCommand {
    /// Returns the protocol method name.
    #[must_use]
    pub fn method(&self) -> &'static str {
        match self {
            Self::DispatchMouseEvent(_) => "Input.dispatchMouseEvent",
            Self::DispatchKeyEvent(_) => "Input.dispatchKeyEvent",
        }
    }
}

/// Mouse event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MouseEventType {
    /// Button down.
    MousePressed,
    /// Button up.
    MouseReleased,
    /// Pointer move.
    MouseMoved,
    /// Wheel scroll.
    MouseWheel,
}

/// Mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    /// No button.
    None,
    /// Primary button.
    Left,
    /// Middle button.
    Middle,
    /// Secondary button.
    Right,
}

/// Parameters of `Input.dispatchMouseEvent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MouseEvent {
    /// Event kind.
    #[serde(rename = "type")]
    pub kind: MouseEventType,
    /// Viewport x in CSS pixels.
    pub x: f64,
    /// Viewport y in CSS pixels.
    pub y: f64,
    /// Button for press/release.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button: Option<MouseButton>,
    /// Click count for press/release.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub click_count: Option<u32>,
    /// Horizontal wheel delta.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta_x: Option<f64>,
    /// Vertical wheel delta.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta_y: Option<f64>,
}

impl MouseEvent {
    fn at(kind: MouseEventType, x: f64, y: f64) -> Self {
        Self {
            kind,
            x,
            y,
            button: None,
            click_count: None,
            delta_x: None,
            delta_y: None,
        }
    }

    /// Left button press at a point.
    #[must_use]
    pub fn pressed(x: f64, y: f64) -> Self {
        Self {
            button: Some(MouseButton::Left),
            click_count: Some(1),
            ..Self::at(MouseEventType::MousePressed, x, y)
        }
    }

    /// Left button release at a point.
    #[must_use]
    pub fn released(x: f64, y: f64) -> Self {
        Self {
            button: Some(MouseButton::Left),
            click_count: Some(1),
            ..Self::at(MouseEventType::MouseReleased, x, y)
        }
    }

    /// Pointer move to a point.
    #[must_use]
    pub fn moved(x: f64, y: f64) -> Self {
        Self::at(MouseEventType::MouseMoved, x, y)
    }

    /// Wheel scroll at a point.
    #[must_use]
    pub fn wheel(x: f64, y: f64, delta_x: f64, delta_y: f64) -> Self {
        Self {
            delta_x: Some(delta_x),
            delta_y: Some(delta_y),
            ..Self::at(MouseEventType::MouseWheel, x, y)
        }
    }
}

/// Key event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyEventType {
    /// Key down with default text generation.
    KeyDown,
    /// Key up.
    KeyUp,
    /// Character input.
    Char,
}

/// Parameters of `Input.dispatchKeyEvent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyEvent {
    /// Event kind.
    #[serde(rename = "type")]
    pub kind: KeyEventType,
    /// Modifier bit field (Alt=1, Control=2, Meta=4, Shift=8).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifiers: Option<u8>,
    /// DOM `key` value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// DOM `code` value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Legacy virtual key code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub windows_virtual_key_code: Option<u32>,
    /// Text produced by a `char` event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl KeyEvent {
    fn keyed(kind: KeyEventType, key: &str, code: &str, key_code: u32, modifiers: u8) -> Self {
        Self {
            kind,
            modifiers: Some(modifiers),
            key: Some(key.to_string()),
            code: Some(code.to_string()),
            windows_virtual_key_code: Some(key_code),
            text: None,
        }
    }

    /// Key down.
    #[must_use]
    pub fn down(key: &str, code: &str, key_code: u32, modifiers: u8) -> Self {
        Self::keyed(KeyEventType::KeyDown, key, code, key_code, modifiers)
    }

    /// Key up.
    #[must_use]
    pub fn up(key: &str, code: &str, key_code: u32, modifiers: u8) -> Self {
        Self::keyed(KeyEventType::KeyUp, key, code, key_code, modifiers)
    }

    /// Character input carrying `text`.
    #[must_use]
    pub fn char(text: impl Into<String>) -> Self {
        Self {
            kind: KeyEventType::Char,
            modifiers: None,
            key: None,
            code: None,
            windows_virtual_key_code: None,
            text: Some(text.into()),
        }
    }
}

// ============================================================================
// Page Commands
// ============================================================================

/// Page domain commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum PageCommand {
    /// Enable the Page domain.
    #[serde(rename = "Page.enable")]
    Enable,

    /// Read viewport and content metrics.
    #[serde(rename = "Page.getLayoutMetrics")]
    GetLayoutMetrics,

    /// Navigate the tab.
    #[serde(rename = "Page.navigate")]
    Navigate {
        /// Destination URL.
        url: String,
    },

    /// Capture a screenshot.
    #[serde(rename = "Page.captureScreenshot")]
    CaptureScreenshot {
        /// Image format (`png`).
        format: String,
        /// Compression quality, advisory for PNG.
        quality: u8,
        /// Capture beyond the viewport (full page).
        #[serde(rename = "captureBeyondViewport")]
        capture_beyond_viewport: bool,
    },
}

impl PageCommand {
    /// Returns the protocol method name.
    #[must_use]
    pub fn method(&self) -> &'static str {
        match self {
            Self::Enable => "Page.enable",
            Self::GetLayoutMetrics => "Page.getLayoutMetrics",
            Self::Navigate { .. } => "Page.navigate",
            Self::CaptureScreenshot { .. } => "Page.captureScreenshot",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_perform_search_serialization() {
        let cmd = Command::Dom(DomCommand::PerformSearch {
            query: "#login".to_string(),
            include_user_agent_shadow_dom: true,
        });
        let value = serde_json::to_value(&cmd).expect("serialize");
        assert_eq!(
            value,
            json!({
                "method": "DOM.performSearch",
                "params": {"query": "#login", "includeUserAgentShadowDOM": true}
            })
        );
        assert_eq!(cmd.method(), "DOM.performSearch");
    }

    #[test]
    fn test_unit_command_has_no_params() {
        let value = serde_json::to_value(Command::Page(PageCommand::Enable)).expect("serialize");
        assert_eq!(value, json!({"method": "Page.enable"}));
    }

    #[test]
    fn test_mouse_wheel_serialization() {
        let cmd = InputCommand::DispatchMouseEvent(MouseEvent::wheel(640.0, 360.0, 0.0, 500.0));
        let value = serde_json::to_value(&cmd).expect("serialize");
        assert_eq!(value["method"], "Input.dispatchMouseEvent");
        assert_eq!(value["params"]["type"], "mouseWheel");
        assert_eq!(value["params"]["deltaY"], 500.0);
        assert!(value["params"].get("button").is_none());
    }

    #[test]
    fn test_mouse_press_has_button_and_click_count() {
        let value = serde_json::to_value(MouseEvent::pressed(10.0, 20.0)).expect("serialize");
        assert_eq!(value["type"], "mousePressed");
        assert_eq!(value["button"], "left");
        assert_eq!(value["clickCount"], 1);
    }

    #[test]
    fn test_key_event_serialization() {
        let value = serde_json::to_value(KeyEvent::down("Enter", "Enter", 13, 0)).expect("serialize");
        assert_eq!(
            value,
            json!({
                "type": "keyDown",
                "modifiers": 0,
                "key": "Enter",
                "code": "Enter",
                "windowsVirtualKeyCode": 13
            })
        );
    }

    #[test]
    fn test_command_round_trip_through_untagged_wrapper() {
        let cmd = Command::Page(PageCommand::Navigate {
            url: "https://example.com".to_string(),
        });
        let json = serde_json::to_string(&cmd).expect("serialize");
        let back: Command = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, cmd);
    }
}
