//! Wire message types.
//!
//! Three contracts live here:
//!
//! | Contract | Direction | Types |
//! |----------|-----------|-------|
//! | Orchestrator | agent → driver → agent | [`Action`], [`Content`] |
//! | Automation channel | driver → tab debugger | [`Command`] |
//! | Bridge | driver ↔ extension | [`Request`], [`Response`], [`BridgeCommand`] |
//!
//! # Command Naming
//!
//! Automation commands use the debugger protocol's `Domain.method` names
//! (`DOM.performSearch`, `Input.dispatchMouseEvent`). Bridge methods name
//! the extension API they call (`tabs.query`, `debugger.sendCommand`).
//! Action names are the tool names the agent sees (`clickElement`).

// ============================================================================
// Submodules
// ============================================================================

/// Orchestrator actions.
pub mod action;

/// Automation command definitions organized by domain.
pub mod command;

/// Multimodal content envelope.
pub mod content;

/// Bridge request and response types.
pub mod request;

// ============================================================================
// Re-exports
// ============================================================================

pub use action::{
    Action, ElementTarget, NavigateInput, PressKeyInput, ScreenshotInput, ScrollDirection,
    ScrollPageInput, TabRef, TabRefs, TypeTextInput, WaitForElementInput,
};
pub use command::{
    Command, DomCommand, InputCommand, KeyEvent, KeyEventType, MouseButton, MouseEvent,
    MouseEventType, PageCommand,
};
pub use content::{Content, ContentPart, ImageUrl};
pub use request::{BridgeCommand, Request, Response, ResponseType};
