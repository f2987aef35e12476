//! Pointer verbs on a resolved element.

use tracing::debug;

use crate::driver::Driver;
use crate::identifiers::TabId;
use crate::protocol::{Content, DomCommand, InputCommand, MouseEvent};

use super::click_at;

// ============================================================================
// Driver - Element verbs
// ============================================================================

impl Driver {
    /// Clicks the center of the first element matching `selector`.
    pub async fn click_element(&self, selector: &str, tab_id: Option<TabId>) -> Content {
        self.run_element_verb(
            "clickElement",
            selector,
            tab_id,
            "Error clicking element",
            |session, element, bbox| async move {
                let (x, y) = bbox.center();
                debug!(tab_id = %session.tab_id(), x, y, "Clicking element");
                click_at(&session, (x, y)).await?;
                Ok(format!("Successfully clicked element: {}", element.selector))
            },
        )
        .await
    }

    /// Moves the pointer to the center of the element.
    pub async fn hover_element(&self, selector: &str, tab_id: Option<TabId>) -> Content {
        self.run_element_verb(
            "hoverElement",
            selector,
            tab_id,
            "Error hovering element",
            |session, element, bbox| async move {
                let (x, y) = bbox.center();
                session
                    .send(InputCommand::DispatchMouseEvent(MouseEvent::moved(x, y)))
                    .await?;
                Ok(format!("Successfully hovered over element: {}", element.selector))
            },
        )
        .await
    }

    /// Scrolls the element into the middle of the viewport.
    pub async fn scroll_to_element(&self, selector: &str, tab_id: Option<TabId>) -> Content {
        self.run_element_verb(
            "scrollToElement",
            selector,
            tab_id,
            "Error scrolling to element",
            |session, element, _| async move {
                session.send(DomCommand::Enable).await?;
                session
                    .send(DomCommand::ScrollIntoViewIfNeeded {
                        node_id: element.node_id,
                        center_if_needed: true,
                    })
                    .await?;
                Ok(format!("Successfully scrolled to element: {}", element.selector))
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
    use std::time::Duration;

    use crate::control::test_support::{driver, mouse_events};
    use crate::protocol::{Command, DomCommand, MouseButton, MouseEventType};
    use crate::testing::FakeHost;

    const PAGE: &str = r#"<body>
        <button id="login" data-box="100,200,80,40">Log in</button>
        <button id="hidden">Hidden</button>
    </body>"#;

    #[tokio::test]
    async fn test_click_presses_and_releases_at_center() {
        let host = FakeHost::with_page(1, PAGE);
        let content = driver(&host).click_element("#login", None).await;

        assert_eq!(content.joined_text(), "Successfully clicked element: #login");
        let events = mouse_events(&host);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, MouseEventType::MousePressed);
        assert_eq!(events[1].kind, MouseEventType::MouseReleased);
        assert_eq!((events[0].x, events[0].y), (140.0, 220.0));
        assert_eq!(events[0].button, Some(MouseButton::Left));
        assert_eq!(events[0].click_count, Some(1));
        assert_eq!(host.detach_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_click_still_detaches() {
        let host = FakeHost::with_page(1, PAGE);
        host.hang_method("Input.dispatchMouseEvent");
        let driver = driver(&host);

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            driver.click_element("#login", None),
        )
        .await;
        assert!(result.is_err());

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(host.attach_count(), 1);
        assert_eq!(host.detach_count(), 1);
        assert_eq!(host.attached_now(), 0);
    }

    #[tokio::test]
    async fn test_missing_element_sends_no_input() {
        let host = FakeHost::with_page(1, PAGE);
        let content = driver(&host).click_element("#nope", None).await;

        assert_eq!(
            content.joined_text(),
            "Error: Element not found or not visible: #nope"
        );
        assert!(mouse_events(&host).is_empty());
        assert_eq!(host.attach_count(), 1);
        assert_eq!(host.detach_count(), 1);
    }

    #[tokio::test]
    async fn test_element_without_box_is_not_visible() {
        let host = FakeHost::with_page(1, PAGE);
        let content = driver(&host).hover_element("#hidden", None).await;
        assert_eq!(
            content.joined_text(),
            "Error: Element not found or not visible: #hidden"
        );
    }

    #[tokio::test]
    async fn test_hover_moves_pointer() {
        let host = FakeHost::with_page(1, PAGE);
        let content = driver(&host).hover_element("#login", None).await;

        assert_eq!(content.joined_text(), "Successfully hovered over element: #login");
        let events = mouse_events(&host);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, MouseEventType::MouseMoved);
    }

    #[tokio::test]
    async fn test_scroll_to_element_centers() {
        let host = FakeHost::with_page(1, PAGE);
        let content = driver(&host).scroll_to_element("#login", None).await;

        assert_eq!(content.joined_text(), "Successfully scrolled to element: #login");
        assert!(host.commands().iter().any(|c| matches!(
            c,
            Command::Dom(DomCommand::ScrollIntoViewIfNeeded {
                center_if_needed: true,
                ..
            })
        )));
    }

    #[tokio::test]
    async fn test_channel_failure_is_reported() {
        let host = FakeHost::with_page(1, PAGE);
        host.fail_method("Input.dispatchMouseEvent");
        let content = driver(&host).click_element("#login", None).await;

        assert_eq!(
            content.joined_text(),
            "Error clicking element: Input.dispatchMouseEvent failed: Target closed"
        );
        assert_eq!(host.detach_count(), 1);
    }
}
