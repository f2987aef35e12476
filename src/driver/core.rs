//! Driver coordinator and action dispatch.
//!
//! The [`Driver`] owns the browser host, the session manager and the
//! options. It is cheap to clone and safe to share across tasks.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tabpilot::{Action, BrowserHost, Driver};
//!
//! # async fn example(host: Arc<dyn BrowserHost>) -> tabpilot::Result<()> {
//! let driver = Driver::builder().host(host).build()?;
//!
//! let action: Action = serde_json::from_str(r##"{"name": "clickElement", "input": {"selector": "#login"}}"##)?;
//! let content = driver.handle(action).await;
//! println!("{}", content.joined_text());
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::browser::host::{BrowserHost, TabInfo};
use crate::browser::session::SessionManager;
use crate::capture::CaptureMode;
use crate::error::{Error, Result};
use crate::identifiers::TabId;
use crate::protocol::{Action, Content};

use super::builder::DriverBuilder;
use super::options::DriverOptions;

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for the driver.
pub(crate) struct DriverInner {
    /// Browser capabilities.
    pub host: Arc<dyn BrowserHost>,

    /// Attach/detach bookkeeping.
    pub sessions: SessionManager,

    /// Behavior options.
    pub options: DriverOptions,
}

// ============================================================================
// Driver
// ============================================================================

/// Entry point for content retrieval and browser control.
///
/// Every operation returns [`Content`]; failures are reported as text.
#[derive(Clone)]
pub struct Driver {
    /// Shared inner state.
    pub(crate) inner: Arc<DriverInner>,
}

impl fmt::Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Driver - Public API
// ============================================================================

impl Driver {
    /// Creates a configuration builder for the driver.
    #[inline]
    #[must_use]
    pub fn builder() -> DriverBuilder {
        DriverBuilder::new()
    }

    /// Behavior options in effect.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &DriverOptions {
        &self.inner.options
    }

    /// The browser host.
    #[inline]
    #[must_use]
    pub fn host(&self) -> &Arc<dyn BrowserHost> {
        &self.inner.host
    }

    /// Runs one orchestrator action.
    pub async fn handle(&self, action: Action) -> Content {
        debug!(action = action.name(), "Handling action");

        match action {
            Action::GetAllTabsInfo => self.all_tabs_info().await,
            Action::GetActiveTabMarkdownContent => self.get_view(CaptureMode::Markdown, None).await,
            Action::GetTabMarkdownContentById(input) => {
                self.get_view(CaptureMode::Markdown, Some(&input.id)).await
            }
            Action::GetTabMarkdownContentsByIds(input) => {
                self.get_views(CaptureMode::Markdown, Some(&input.ids)).await
            }
            Action::GetActiveTabSnapshot => self.get_view(CaptureMode::Snapshot, None).await,
            Action::GetTabSnapshotById(input) => {
                self.get_view(CaptureMode::Snapshot, Some(&input.id)).await
            }
            Action::GetTabSnapshotsByIds(input) => {
                self.get_views(CaptureMode::Snapshot, Some(&input.ids)).await
            }
            Action::ClickElement(input) => self.click_element(&input.selector, input.tab_id).await,
            Action::TypeText(input) => {
                self.type_text(&input.selector, &input.text, input.clear, input.tab_id)
                    .await
            }
            Action::ScrollPage(input) => {
                self.scroll_page(input.direction, input.amount, input.tab_id)
                    .await
            }
            Action::ScrollToElement(input) => {
                self.scroll_to_element(&input.selector, input.tab_id).await
            }
            Action::HoverElement(input) => self.hover_element(&input.selector, input.tab_id).await,
            Action::PressKey(input) => {
                self.press_key(&input.key, &input.modifiers, input.tab_id)
                    .await
            }
            Action::WaitForElement(input) => {
                self.wait_for_element(&input.selector, input.timeout, input.tab_id)
                    .await
            }
            Action::GetElementInfo(input) => {
                self.get_element_info(&input.selector, input.tab_id).await
            }
            Action::NavigateToUrl(input) => self.navigate_to_url(&input.url, input.tab_id).await,
            Action::TakeScreenshot(input) => {
                self.take_screenshot(input.full_page, input.tab_id).await
            }
        }
    }
}

// ============================================================================
// Driver - Internal
// ============================================================================

impl Driver {
    /// Creates a driver over a host.
    pub(crate) fn new(host: Arc<dyn BrowserHost>, options: DriverOptions) -> Self {
        let sessions = SessionManager::new(Arc::clone(&host), options.serialize_tab_commands);
        Self {
            inner: Arc::new(DriverInner {
                host,
                sessions,
                options,
            }),
        }
    }

    /// The given tab, or the active tab of the current window.
    ///
    /// # Errors
    ///
    /// [`Error::NoActiveTab`] when no tab is given and none is active.
    pub(crate) async fn resolve_tab(&self, tab_id: Option<TabId>) -> Result<TabId> {
        match tab_id {
            Some(tab_id) => Ok(tab_id),
            None => self
                .active_tab()
                .await
                .map(|tab| tab.id),
        }
    }

    pub(crate) async fn active_tab(&self) -> Result<TabInfo> {
        self.inner.host.active_tab().await?.ok_or(Error::NoActiveTab)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::protocol::{Command, InputCommand, MouseEventType};
    use crate::testing::FakeHost;

    fn driver(host: &Arc<FakeHost>) -> Driver {
        Driver::builder()
            .host(Arc::clone(host) as Arc<dyn BrowserHost>)
            .build()
            .expect("driver")
    }

    #[tokio::test]
    async fn test_resolve_tab_prefers_explicit_id() {
        let host = FakeHost::with_page(1, "<body></body>");
        let driver = driver(&host);
        let explicit = TabId::new(9).expect("valid tab id");
        assert_eq!(driver.resolve_tab(Some(explicit)).await.expect("tab"), explicit);
        assert_eq!(driver.resolve_tab(None).await.expect("tab").as_u32(), 1);
    }

    #[tokio::test]
    async fn test_no_active_tab() {
        let host = FakeHost::with_page(1, "<body></body>");
        host.set_active(None);
        let driver = driver(&host);
        let content = driver
            .handle(Action::ClickElement(crate::protocol::ElementTarget {
                selector: "#go".to_string(),
                tab_id: None,
            }))
            .await;
        assert_eq!(content.joined_text(), "Error: No active tab found");
        assert_eq!(host.attach_count(), 0);
    }

    #[tokio::test]
    async fn test_handle_parses_and_dispatches() {
        let host = FakeHost::with_page(4, "<body><h1>Hello</h1></body>");
        let driver = driver(&host);
        let action: Action =
            serde_json::from_str(r#"{"name": "getActiveTabMarkdownContent"}"#).expect("parse");
        let text = driver.handle(action).await.joined_text();
        assert!(text.starts_with("Tab 4: Tab 4 (https://example.com/4)\n\n"));
        assert!(text.contains("# Hello"));
    }

    #[tokio::test]
    async fn test_handle_scroll_uses_default_amount() {
        let host = FakeHost::with_page(2, "<body></body>");
        let driver = driver(&host);
        let action: Action =
            serde_json::from_str(r#"{"name": "scrollPage", "input": {"direction": "up"}}"#)
                .expect("parse");
        let text = driver.handle(action).await.joined_text();
        assert_eq!(text, "Successfully scrolled up by 500px");

        let wheels: Vec<_> = host
            .commands()
            .into_iter()
            .filter_map(|c| match c {
                Command::Input(InputCommand::DispatchMouseEvent(e)) => Some(e),
                _ => None,
            })
            .collect();
        assert_eq!(wheels.len(), 1);
        assert_eq!(wheels[0].kind, MouseEventType::MouseWheel);
        assert_eq!((wheels[0].delta_x, wheels[0].delta_y), (Some(0.0), Some(-500.0)));
    }
}
