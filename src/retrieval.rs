//! Content retrieval facade.
//!
//! Resolves tab references to tabs, captures each one and stitches the
//! results into a single text part. In a batch every tab succeeds or fails
//! on its own; a failure is rendered inline where that tab's view would be.
//!
//! ```text
//! Tab 12: Inbox (https://mail.example.com/)
//!
//! <!-- Interactive elements ... -->
//!
//! ---
//!
//! Error: Invalid tab ID: abc
//! ```

// ============================================================================
// Imports
// ============================================================================

use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::browser::host::TabInfo;
use crate::capture::{CaptureMode, capture};
use crate::driver::Driver;
use crate::error::Result;
use crate::identifiers::TabId;
use crate::protocol::Content;

// ============================================================================
// Constants
// ============================================================================

/// Separator between tab blocks of a batch.
const TAB_SEPARATOR: &str = "\n\n---\n\n";

// ============================================================================
// Driver - Retrieval
// ============================================================================

impl Driver {
    /// Lists every open tab with its id, title and URL.
    pub async fn all_tabs_info(&self) -> Content {
        let tabs = match self.inner.host.all_tabs().await {
            Ok(tabs) => tabs,
            Err(e) => {
                warn!(error = %e, "Failed to list tabs");
                return Content::text(format!("Error retrieving tabs information: {e}"));
            }
        };

        if tabs.is_empty() {
            return Content::text("No tabs are currently open");
        }

        let blocks: Vec<String> = tabs
            .iter()
            .map(|tab| {
                format!(
                    "Tab ID: {}\nTitle: {}\nURL: {}\n",
                    tab.id,
                    tab.display_title(),
                    tab.display_url()
                )
            })
            .collect();
        Content::text(format!("Found {} tabs:\n\n{}", tabs.len(), blocks.join("\n")))
    }

    /// Captures one tab, the active one when `id` is `None`.
    pub async fn get_view(&self, mode: CaptureMode, id: Option<&str>) -> Content {
        match id {
            Some(id) => Content::text(self.view_by_ref(mode, id).await),
            None => self.active_view(mode).await,
        }
    }

    /// Captures several tabs concurrently, the active one when `ids` is
    /// `None`.
    pub async fn get_views(&self, mode: CaptureMode, ids: Option<&[String]>) -> Content {
        let Some(ids) = ids else {
            return self.active_view(mode).await;
        };
        if ids.is_empty() {
            return Content::text("No tab IDs provided");
        }

        debug!(%mode, tabs = ids.len(), "Capturing tab batch");
        let blocks = join_all(ids.iter().map(|id| self.view_by_ref(mode, id))).await;
        Content::text(blocks.join(TAB_SEPARATOR))
    }
}

// ============================================================================
// Helpers
// ============================================================================

impl Driver {
    async fn active_view(&self, mode: CaptureMode) -> Content {
        match self.active_tab().await {
            Ok(tab) => Content::text(self.render_tab(mode, &tab).await),
            Err(e) => Content::text(format!("Error: {e}")),
        }
    }

    /// One tab block, or an inline error for a bad or unknown reference.
    async fn view_by_ref(&self, mode: CaptureMode, raw: &str) -> String {
        let tab = match raw.parse::<TabId>() {
            Ok(tab_id) => self.inner.host.get_tab(tab_id).await,
            Err(e) => Err(e),
        };

        match tab {
            Ok(tab) => self.render_tab(mode, &tab).await,
            Err(e) => {
                warn!(tab = raw, error = %e, "Cannot resolve tab");
                format!("Error: {e}")
            }
        }
    }

    async fn render_tab(&self, mode: CaptureMode, tab: &TabInfo) -> String {
        let body = match self.capture_tab(mode, tab.id).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => mode.fallback_text().to_string(),
            Err(e) => {
                warn!(tab_id = %tab.id, %mode, error = %e, "Capture failed");
                mode.fallback_text().to_string()
            }
        };

        format!(
            "Tab {}: {} ({})\n\n{body}",
            tab.id,
            tab.display_title(),
            tab.display_url()
        )
    }

    async fn capture_tab(&self, mode: CaptureMode, tab_id: TabId) -> Result<String> {
        let page = self.inner.host.page(tab_id).await?;
        capture(page.as_ref(), mode, self.options().capture_limit).await
    }
}

// ============================================================================
// Tests
// ============================================================================
