//! The browser host boundary.
//!
//! Everything the driver needs from the browser goes through [`BrowserHost`]:
//! tab queries, page access for capture, and the per-tab automation channel.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::capture::page::PageContext;
use crate::error::Result;
use crate::identifiers::TabId;
use crate::protocol::Command;

// ============================================================================
// TabInfo
// ============================================================================

/// Read-only snapshot of a tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    /// Tab id.
    pub id: TabId,
    /// Page title.
    #[serde(default)]
    pub title: Option<String>,
    /// Page URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Favicon URL.
    #[serde(default)]
    pub fav_icon_url: Option<String>,
}

impl TabInfo {
    /// Creates a tab snapshot with just an id.
    #[inline]
    #[must_use]
    pub fn new(id: TabId) -> Self {
        Self {
            id,
            title: None,
            url: None,
            fav_icon_url: None,
        }
    }

    /// Sets the title.
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the URL.
    #[inline]
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Title, or `Untitled` when missing or empty.
    #[inline]
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title.as_deref().filter(|t| !t.is_empty()).unwrap_or("Untitled")
    }

    /// URL, or `No URL` when missing or empty.
    #[inline]
    #[must_use]
    pub fn display_url(&self) -> &str {
        self.url.as_deref().filter(|u| !u.is_empty()).unwrap_or("No URL")
    }
}

// ============================================================================
// BrowserHost
// ============================================================================

/// Capabilities the host browser exposes.
#[async_trait]
pub trait BrowserHost: Send + Sync {
    /// All open tabs.
    async fn all_tabs(&self) -> Result<Vec<TabInfo>>;

    /// The active tab of the current window, if any.
    async fn active_tab(&self) -> Result<Option<TabInfo>>;

    /// A single tab.
    ///
    /// Fails with [`Error::TabNotFound`](crate::Error::TabNotFound) if it
    /// does not exist.
    async fn get_tab(&self, tab_id: TabId) -> Result<TabInfo>;

    /// Page access for capture.
    async fn page(&self, tab_id: TabId) -> Result<Arc<dyn PageContext>>;

    /// Attaches the automation channel.
    ///
    /// Fails with [`Error::AlreadyAttached`](crate::Error::AlreadyAttached)
    /// if a channel is already attached.
    async fn attach(&self, tab_id: TabId) -> Result<()>;

    /// Detaches the automation channel.
    async fn detach(&self, tab_id: TabId) -> Result<()>;

    /// Sends one automation command over an attached channel.
    async fn send_command(&self, tab_id: TabId, command: Command) -> Result<Value>;
}

// ============================================================================
// Tests
// ============================================================================
