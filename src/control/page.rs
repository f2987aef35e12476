//! Navigation and screenshots.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::driver::Driver;
use crate::error::Error;
use crate::identifiers::TabId;
use crate::protocol::{Content, PageCommand};

use super::Reply;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NavigateResponse {
    #[serde(default)]
    error_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScreenshotResponse {
    data: String,
}

// ============================================================================
// Driver - Page verbs
// ============================================================================

impl Driver {
    /// Navigates the tab to an absolute URL.
    pub async fn navigate_to_url(&self, url: &str, tab_id: Option<TabId>) -> Content {
        let url = url.to_string();
        self.run_verb(
            "navigateToUrl",
            tab_id,
            "Error navigating to URL",
            |session| async move {
                let target = Url::parse(&url)?;

                session.send(PageCommand::Enable).await?;
                let value = session
                    .send(PageCommand::Navigate {
                        url: target.to_string(),
                    })
                    .await?;

                let response: NavigateResponse = serde_json::from_value(value)?;
                if let Some(error_text) = response.error_text.filter(|t| !t.is_empty()) {
                    return Err(Error::command("Page.navigate", error_text));
                }

                info!(tab_id = %session.tab_id(), url = %target, "Navigated");
                Ok(Reply::Text(format!("Successfully navigated to: {url}")))
            },
        )
        .await
    }

    /// Captures the visible viewport, or the whole page when `full_page`.
    pub async fn take_screenshot(&self, full_page: bool, tab_id: Option<TabId>) -> Content {
        let quality = self.options().screenshot_quality;
        self.run_verb(
            "takeScreenshot",
            tab_id,
            "Error taking screenshot",
            |session| async move {
                session.send(PageCommand::Enable).await?;
                let value = session
                    .send(PageCommand::CaptureScreenshot {
                        format: "png".to_string(),
                        quality,
                        capture_beyond_viewport: full_page,
                    })
                    .await?;

                let response: ScreenshotResponse = serde_json::from_value(value)
                    .map_err(|e| Error::protocol(format!("unexpected screenshot reply: {e}")))?;
                let bytes = STANDARD.decode(&response.data)?;
                debug!(tab_id = %session.tab_id(), bytes = bytes.len(), full_page, "Screenshot captured");

                Ok(Reply::Content(Content::image(format!(
                    "data:image/png;base64,{}",
                    response.data
                ))))
            },
        )
        .await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use crate::control::test_support::driver;
    use crate::protocol::{Command, PageCommand};
    use crate::testing::{FakeHost, SCREENSHOT_DATA};

    #[tokio::test]
    async fn test_navigate_updates_tab() {
        let host = FakeHost::with_page(1, "<body></body>");
        let content = driver(&host)
            .navigate_to_url("https://example.org/docs", None)
            .await;

        assert_eq!(
            content.joined_text(),
            "Successfully navigated to: https://example.org/docs"
        );
        assert_eq!(host.tab_url(1).as_deref(), Some("https://example.org/docs"));
        assert_eq!(host.methods(), vec!["Page.enable", "Page.navigate"]);
        assert_eq!(host.detach_count(), 1);
    }

    #[tokio::test]
    async fn test_navigate_rejects_relative_url_without_sending() {
        let host = FakeHost::with_page(1, "<body></body>");
        let content = driver(&host).navigate_to_url("docs/page", None).await;

        assert!(
            content
                .joined_text()
                .starts_with("Error navigating to URL: Invalid URL")
        );
        assert!(host.methods().is_empty());
    }

    #[tokio::test]
    async fn test_navigate_error_text_is_failure() {
        let host = FakeHost::with_page(1, "<body></body>");
        host.fail_navigation("net::ERR_NAME_NOT_RESOLVED");
        let content = driver(&host)
            .navigate_to_url("https://nowhere.invalid/", None)
            .await;

        assert_eq!(
            content.joined_text(),
            "Error navigating to URL: Page.navigate failed: net::ERR_NAME_NOT_RESOLVED"
        );
        assert_eq!(host.tab_url(1).as_deref(), Some("https://example.com/1"));
    }

    #[tokio::test]
    async fn test_screenshot_returns_image_part() {
        let host = FakeHost::with_page(1, "<body></body>");
        let content = driver(&host).take_screenshot(true, None).await;

        let parts = content.parts();
        assert_eq!(parts.len(), 1);
        assert_eq!(
            parts[0].as_image_url(),
            Some(format!("data:image/png;base64,{SCREENSHOT_DATA}").as_str())
        );
        assert!(host.commands().iter().any(|c| matches!(
            c,
            Command::Page(PageCommand::CaptureScreenshot {
                quality: 80,
                capture_beyond_viewport: true,
                ..
            })
        )));
    }

    #[tokio::test]
    async fn test_screenshot_failure_is_text() {
        let host = FakeHost::with_page(1, "<body></body>");
        host.fail_method("Page.captureScreenshot");
        let content = driver(&host).take_screenshot(false, None).await;

        assert_eq!(
            content.joined_text(),
            "Error taking screenshot: Page.captureScreenshot failed: Target closed"
        );
    }
}
