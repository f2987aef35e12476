//! Page scrolling.

use serde::Deserialize;
use tracing::debug;

use crate::driver::Driver;
use crate::error::Error;
use crate::identifiers::TabId;
use crate::protocol::{Content, InputCommand, MouseEvent, PageCommand, ScrollDirection};

use super::Reply;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutMetrics {
    layout_viewport: LayoutViewport,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutViewport {
    client_width: f64,
    client_height: f64,
}

// ============================================================================
// Driver - Scroll
// ============================================================================

impl Driver {
    /// Scrolls the page with one wheel event at the viewport center.
    pub async fn scroll_page(
        &self,
        direction: ScrollDirection,
        amount: f64,
        tab_id: Option<TabId>,
    ) -> Content {
        self.run_verb("scrollPage", tab_id, "Error scrolling page", |session| async move {
            session.send(PageCommand::Enable).await?;
            let metrics: LayoutMetrics =
                serde_json::from_value(session.send(PageCommand::GetLayoutMetrics).await?)
                    .map_err(|e| Error::protocol(format!("unexpected layout metrics: {e}")))?;

            let x = metrics.layout_viewport.client_width / 2.0;
            let y = metrics.layout_viewport.client_height / 2.0;
            let (delta_x, delta_y) = direction.delta(amount);
            debug!(tab_id = %session.tab_id(), %direction, amount, "Scrolling page");

            session
                .send(InputCommand::DispatchMouseEvent(MouseEvent::wheel(
                    x, y, delta_x, delta_y,
                )))
                .await?;
            Ok(Reply::Text(format!(
                "Successfully scrolled {direction} by {amount}px"
            )))
        })
        .await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use crate::control::test_support::{driver, mouse_events};
    use crate::protocol::{MouseEventType, ScrollDirection};
    use crate::testing::FakeHost;

    #[tokio::test]
    async fn test_scroll_down_default_amount() {
        let host = FakeHost::with_page(1, "<body></body>");
        let content = driver(&host)
            .scroll_page(ScrollDirection::Down, 500.0, None)
            .await;

        assert_eq!(content.joined_text(), "Successfully scrolled down by 500px");
        let events = mouse_events(&host);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, MouseEventType::MouseWheel);
        assert_eq!((events[0].x, events[0].y), (640.0, 360.0));
        assert_eq!((events[0].delta_x, events[0].delta_y), (Some(0.0), Some(500.0)));
    }

    #[tokio::test]
    async fn test_scroll_left() {
        let host = FakeHost::with_page(1, "<body></body>");
        driver(&host)
            .scroll_page(ScrollDirection::Left, 120.0, None)
            .await;

        let events = mouse_events(&host);
        assert_eq!(events[0].delta_x, Some(-120.0));
        assert_eq!(events[0].delta_y, Some(0.0));
    }

    #[tokio::test]
    async fn test_scroll_failure_is_reported() {
        let host = FakeHost::with_page(1, "<body></body>");
        host.fail_method("Page.getLayoutMetrics");
        let content = driver(&host)
            .scroll_page(ScrollDirection::Up, 500.0, None)
            .await;

        assert!(content.joined_text().starts_with("Error scrolling page: "));
        assert_eq!(host.detach_count(), 1);
    }
}
