//! Named actions issued by the agent orchestrator.
//!
//! Each action travels as `{"name": "...", "input": {...}}`. Names and
//! field spellings are a wire contract and must not change.
//!
//! | Name | Input |
//! |------|-------|
//! | `getAllTabsInfo` | none |
//! | `getActiveTabMarkdownContent` | none |
//! | `getTabMarkdownContentById` | `{id}` |
//! | `getTabMarkdownContentsByIds` | `{ids}` |
//! | `getActiveTabSnapshot` | none |
//! | `getTabSnapshotById` | `{id}` |
//! | `getTabSnapshotsByIds` | `{ids}` |
//! | `clickElement` | `{selector, tabId?}` |
//! | `typeText` | `{selector, text, clear?, tabId?}` |
//! | `scrollPage` | `{direction, amount?, tabId?}` |
//! | `scrollToElement` | `{selector, tabId?}` |
//! | `hoverElement` | `{selector, tabId?}` |
//! | `pressKey` | `{key, modifiers?, tabId?}` |
//! | `waitForElement` | `{selector, timeout?, tabId?}` |
//! | `getElementInfo` | `{selector, tabId?}` |
//! | `navigateToUrl` | `{url, tabId?}` |
//! | `takeScreenshot` | `{fullPage?, tabId?}` |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::browser::keyboard::Modifier;
use crate::error::{Error, Result};
use crate::identifiers::TabId;

// ============================================================================
// Constants
// ============================================================================

/// Default scroll distance in pixels.
pub const DEFAULT_SCROLL_AMOUNT: f64 = 500.0;

/// Default `waitForElement` timeout in milliseconds.
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 5000;

// ============================================================================
// Action
// ============================================================================

/// An orchestrator action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "name",
    content = "input",
    rename_all = "camelCase",
    try_from = "RawAction"
)]
pub enum Action {
    /// List every open tab.
    GetAllTabsInfo,
    /// Markdown view of the active tab.
    GetActiveTabMarkdownContent,
    /// Markdown view of one tab.
    GetTabMarkdownContentById(TabRef),
    /// Markdown views of several tabs.
    GetTabMarkdownContentsByIds(TabRefs),
    /// Interactive snapshot of the active tab.
    GetActiveTabSnapshot,
    /// Interactive snapshot of one tab.
    GetTabSnapshotById(TabRef),
    /// Interactive snapshots of several tabs.
    GetTabSnapshotsByIds(TabRefs),
    /// Click an element.
    ClickElement(ElementTarget),
    /// Type into an element.
    TypeText(TypeTextInput),
    /// Scroll the page.
    ScrollPage(ScrollPageInput),
    /// Scroll an element into view.
    ScrollToElement(ElementTarget),
    /// Hover over an element.
    HoverElement(ElementTarget),
    /// Press a key.
    PressKey(PressKeyInput),
    /// Poll until an element exists.
    WaitForElement(WaitForElementInput),
    /// Describe an element.
    GetElementInfo(ElementTarget),
    /// Navigate a tab.
    NavigateToUrl(NavigateInput),
    /// Screenshot a tab.
    TakeScreenshot(ScreenshotInput),
}

impl Action {
    /// Wire name of the action.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetAllTabsInfo => "getAllTabsInfo",
            Self::GetActiveTabMarkdownContent => "getActiveTabMarkdownContent",
            Self::GetTabMarkdownContentById(_) => "getTabMarkdownContentById",
            Self::GetTabMarkdownContentsByIds(_) => "getTabMarkdownContentsByIds",
            Self::GetActiveTabSnapshot => "getActiveTabSnapshot",
            Self::GetTabSnapshotById(_) => "getTabSnapshotById",
            Self::GetTabSnapshotsByIds(_) => "getTabSnapshotsByIds",
            Self::ClickElement(_) => "clickElement",
            Self::TypeText(_) => "typeText",
            Self::ScrollPage(_) => "scrollPage",
            Self::ScrollToElement(_) => "scrollToElement",
            Self::HoverElement(_) => "hoverElement",
            Self::PressKey(_) => "pressKey",
            Self::WaitForElement(_) => "waitForElement",
            Self::GetElementInfo(_) => "getElementInfo",
            Self::NavigateToUrl(_) => "navigateToUrl",
            Self::TakeScreenshot(_) => "takeScreenshot",
        }
    }
}

/// Loose wire form, so that no-argument actions accept a missing,
/// `null` or `{}` input alike.
#[derive(Deserialize)]
struct RawAction {
    name: String,
    #[serde(default)]
    input: Value,
}

impl TryFrom<RawAction> for Action {
    type Error = Error;

    fn try_from(raw: RawAction) -> Result<Self> {
        let RawAction { name, input } = raw;
        let action = match name.as_str() {
            "getAllTabsInfo" => Self::GetAllTabsInfo,
            "getActiveTabMarkdownContent" => Self::GetActiveTabMarkdownContent,
            "getTabMarkdownContentById" => Self::GetTabMarkdownContentById(parse_input(input)?),
            "getTabMarkdownContentsByIds" => {
                Self::GetTabMarkdownContentsByIds(parse_input(input)?)
            }
            "getActiveTabSnapshot" => Self::GetActiveTabSnapshot,
            "getTabSnapshotById" => Self::GetTabSnapshotById(parse_input(input)?),
            "getTabSnapshotsByIds" => Self::GetTabSnapshotsByIds(parse_input(input)?),
            "clickElement" => Self::ClickElement(parse_input(input)?),
            "typeText" => Self::TypeText(parse_input(input)?),
            "scrollPage" => Self::ScrollPage(parse_input(input)?),
            "scrollToElement" => Self::ScrollToElement(parse_input(input)?),
            "hoverElement" => Self::HoverElement(parse_input(input)?),
            "pressKey" => Self::PressKey(parse_input(input)?),
            "waitForElement" => Self::WaitForElement(parse_input(input)?),
            "getElementInfo" => Self::GetElementInfo(parse_input(input)?),
            "navigateToUrl" => Self::NavigateToUrl(parse_input(input)?),
            "takeScreenshot" => Self::TakeScreenshot(parse_input(input)?),
            other => {
                return Err(Error::invalid_argument(format!("unknown action: {other}")));
            }
        };
        Ok(action)
    }
}

fn parse_input<T: DeserializeOwned>(input: Value) -> Result<T> {
    let input = match input {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };
    Ok(serde_json::from_value(input)?)
}

// ============================================================================
// Inputs
// ============================================================================

/// A single tab reference. Ids arrive as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabRef {
    /// Tab id as a decimal string.
    pub id: String,
}

/// Several tab references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabRefs {
    /// Tab ids as decimal strings.
    pub ids: Vec<String>,
}

/// Element-targeted verb input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementTarget {
    /// CSS selector.
    pub selector: String,
    /// Target tab, active tab when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<TabId>,
}

/// `typeText` input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeTextInput {
    /// CSS selector.
    pub selector: String,
    /// Text to type.
    pub text: String,
    /// Clear the field first.
    #[serde(default)]
    pub clear: bool,
    /// Target tab.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<TabId>,
}

/// Scroll direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    /// Towards the top.
    Up,
    /// Towards the bottom.
    Down,
    /// Towards the left edge.
    Left,
    /// Towards the right edge.
    Right,
}

impl ScrollDirection {
    /// Signed wheel delta `(dx, dy)` for a distance.
    #[must_use]
    pub fn delta(self, amount: f64) -> (f64, f64) {
        match self {
            Self::Up => (0.0, -amount),
            Self::Down => (0.0, amount),
            Self::Left => (-amount, 0.0),
            Self::Right => (amount, 0.0),
        }
    }
}

impl fmt::Display for ScrollDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        };
        f.write_str(name)
    }
}

fn default_scroll_amount() -> f64 {
    DEFAULT_SCROLL_AMOUNT
}

/// `scrollPage` input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollPageInput {
    /// Direction.
    pub direction: ScrollDirection,
    /// Distance in pixels.
    #[serde(default = "default_scroll_amount")]
    pub amount: f64,
    /// Target tab.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<TabId>,
}

/// `pressKey` input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PressKeyInput {
    /// Key name or single character.
    pub key: String,
    /// Held modifiers.
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    /// Target tab.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<TabId>,
}

fn default_wait_timeout() -> u64 {
    DEFAULT_WAIT_TIMEOUT_MS
}

/// `waitForElement` input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitForElementInput {
    /// CSS selector.
    pub selector: String,
    /// Timeout in milliseconds.
    #[serde(default = "default_wait_timeout")]
    pub timeout: u64,
    /// Target tab.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<TabId>,
}

/// `navigateToUrl` input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateInput {
    /// Destination URL.
    pub url: String,
    /// Target tab.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<TabId>,
}

/// `takeScreenshot` input.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenshotInput {
    /// Capture the full scrollable page.
    #[serde(default)]
    pub full_page: bool,
    /// Target tab.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<TabId>,
}

// ============================================================================
// Tests
// ============================================================================
