//! Keyboard verbs.

use tracing::debug;

use crate::browser::keyboard::{Key, KeyStroke, Modifier, Modifiers};
use crate::browser::session::Session;
use crate::driver::Driver;
use crate::error::Result;
use crate::identifiers::TabId;
use crate::protocol::{Content, InputCommand, KeyEvent};

use super::{Reply, click_at};

// ============================================================================
// Driver - Keyboard verbs
// ============================================================================

impl Driver {
    /// Focuses the element by clicking it, optionally clears it, then types
    /// `text` one character at a time.
    pub async fn type_text(
        &self,
        selector: &str,
        text: &str,
        clear: bool,
        tab_id: Option<TabId>,
    ) -> Content {
        let text = text.to_string();
        let select_all = self.options().select_all_modifier;

        self.run_element_verb(
            "typeText",
            selector,
            tab_id,
            "Error typing text",
            |session, element, bbox| async move {
                click_at(&session, bbox.center()).await?;
                if clear {
                    clear_field(&session, select_all).await?;
                }
                debug!(tab_id = %session.tab_id(), chars = text.chars().count(), "Typing text");
                for ch in text.chars() {
                    send_key(&session, KeyEvent::char(ch)).await?;
                }
                Ok(format!(
                    "Successfully typed text into element: {}",
                    element.selector
                ))
            },
        )
        .await
    }

    /// Presses and releases one key with optional modifiers.
    ///
    /// Printable keys also emit a `char` event unless Control or Meta is
    /// held.
    pub async fn press_key(
        &self,
        key: &str,
        modifiers: &[Modifier],
        tab_id: Option<TabId>,
    ) -> Content {
        let key = key.to_string();
        let modifiers = modifiers.to_vec();

        self.run_verb("pressKey", tab_id, "Error pressing key", |session| async move {
            let stroke = KeyStroke::resolve(&key);
            let held: Modifiers = modifiers.iter().copied().collect();
            press(&session, &stroke, held).await?;

            let suffix = if modifiers.is_empty() {
                String::new()
            } else {
                let names: Vec<String> = modifiers.iter().map(ToString::to_string).collect();
                format!(" with modifiers: {}", names.join(", "))
            };
            Ok(Reply::Text(format!("Successfully pressed key: {key}{suffix}")))
        })
        .await
    }
}

// ============================================================================
// Helpers
// ============================================================================

async fn send_key(session: &Session, event: KeyEvent) -> Result<()> {
    session
        .send(InputCommand::DispatchKeyEvent(event))
        .await
        .map(drop)
}

async fn press(session: &Session, stroke: &KeyStroke, held: Modifiers) -> Result<()> {
    let bits = held.bits();
    send_key(
        session,
        KeyEvent::down(&stroke.key, &stroke.code, stroke.key_code, bits),
    )
    .await?;
    if let Some(text) = stroke.text.as_ref().filter(|_| !held.suppresses_text()) {
        send_key(session, KeyEvent::char(text.as_str())).await?;
    }
    send_key(
        session,
        KeyEvent::up(&stroke.key, &stroke.code, stroke.key_code, bits),
    )
    .await
}

/// Select-all followed by Backspace.
async fn clear_field(session: &Session, select_all: Modifier) -> Result<()> {
    let bits = select_all.bit();
    send_key(session, KeyEvent::down("a", "KeyA", 65, bits)).await?;
    send_key(session, KeyEvent::up("a", "KeyA", 65, bits)).await?;

    let (key, code, key_code, _) = Key::Backspace.properties();
    send_key(session, KeyEvent::down(key, code, key_code, 0)).await?;
    send_key(session, KeyEvent::up(key, code, key_code, 0)).await
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use crate::browser::keyboard::Modifier;
    use crate::control::test_support::{driver, driver_with, key_events, mouse_events};
    use crate::driver::DriverOptions;
    use crate::protocol::KeyEventType;
    use crate::testing::FakeHost;

    const PAGE: &str = r#"<body><input id="q" data-box="0,0,200,20"></body>"#;

    #[tokio::test]
    async fn test_type_text_focuses_then_types_chars() {
        let host = FakeHost::with_page(1, PAGE);
        let content = driver(&host).type_text("#q", "héy", false, None).await;

        assert_eq!(content.joined_text(), "Successfully typed text into element: #q");
        assert_eq!(mouse_events(&host).len(), 2);
        let texts: Vec<String> = key_events(&host)
            .into_iter()
            .map(|e| {
                assert_eq!(e.kind, KeyEventType::Char);
                e.text.unwrap_or_default()
            })
            .collect();
        assert_eq!(texts, vec!["h", "é", "y"]);
    }

    #[tokio::test]
    async fn test_type_text_clear_selects_all_with_configured_modifier() {
        let host = FakeHost::with_page(1, PAGE);
        let options = DriverOptions::new().with_select_all_modifier(Modifier::Meta);
        driver_with(&host, options)
            .type_text("#q", "x", true, None)
            .await;

        let events = key_events(&host);
        assert_eq!(events.len(), 5);
        assert_eq!(events[0].kind, KeyEventType::KeyDown);
        assert_eq!(events[0].code.as_deref(), Some("KeyA"));
        assert_eq!(events[0].modifiers, Some(4));
        assert_eq!(events[2].key.as_deref(), Some("Backspace"));
        assert_eq!(events[4].text.as_deref(), Some("x"));
    }

    #[tokio::test]
    async fn test_press_enter() {
        let host = FakeHost::with_page(1, PAGE);
        let content = driver(&host).press_key("Enter", &[], None).await;

        assert_eq!(content.joined_text(), "Successfully pressed key: Enter");
        let events = key_events(&host);
        let kinds: Vec<KeyEventType> = events.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![KeyEventType::KeyDown, KeyEventType::KeyUp]);
        assert_eq!(events[0].windows_virtual_key_code, Some(13));
        assert_eq!(events[0].modifiers, Some(0));
    }

    #[tokio::test]
    async fn test_press_printable_char() {
        let host = FakeHost::with_page(1, PAGE);
        driver(&host).press_key("7", &[Modifier::Shift], None).await;

        let events = key_events(&host);
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].code.as_deref(), Some("Digit7"));
        assert_eq!(events[1].text.as_deref(), Some("7"));
    }

    #[tokio::test]
    async fn test_press_letter_with_control_has_no_char() {
        let host = FakeHost::with_page(1, PAGE);
        let content = driver(&host)
            .press_key("a", &[Modifier::Control, Modifier::Shift], None)
            .await;

        assert_eq!(
            content.joined_text(),
            "Successfully pressed key: a with modifiers: Control, Shift"
        );
        let events = key_events(&host);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].modifiers, Some(10));
        assert_eq!(events[0].code.as_deref(), Some("KeyA"));
        assert_eq!(events[0].windows_virtual_key_code, Some(65));
    }
}
