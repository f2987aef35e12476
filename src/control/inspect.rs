//! Element polling and inspection.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::time::Duration;

use serde::Deserialize;
use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

use crate::browser::resolver::{ElementDescriptor, find_element, pair_up};
use crate::browser::session::Session;
use crate::dom::Document;
use crate::driver::Driver;
use crate::error::Result;
use crate::identifiers::TabId;
use crate::protocol::{Content, DomCommand};

use super::Reply;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct AttributesResponse {
    #[serde(default)]
    attributes: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct OuterHtmlResponse {
    #[serde(rename = "outerHTML")]
    outer_html: String,
}

// ============================================================================
// Driver - Inspection
// ============================================================================

impl Driver {
    /// Polls until an element matching `selector` exists or `timeout_ms`
    /// elapses. Each poll runs in its own session.
    pub async fn wait_for_element(
        &self,
        selector: &str,
        timeout_ms: u64,
        tab_id: Option<TabId>,
    ) -> Content {
        let tab_id = match self.resolve_tab(tab_id).await {
            Ok(tab_id) => tab_id,
            Err(e) => return Content::text(format!("Error: {e}")),
        };

        let interval = self.options().wait_poll_interval;
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        let mut polls = 0u32;

        while Instant::now() < deadline {
            polls += 1;
            let found = self
                .inner
                .sessions
                .with_session(tab_id, |session| async move {
                    find_element(&session, selector).await
                })
                .await;

            match found {
                Ok(Some(_)) => {
                    debug!(tab_id = %tab_id, selector, polls, "Element appeared");
                    return Content::text(format!("Element found: {selector}"));
                }
                Ok(None) => {}
                Err(e) if e.is_timeout() => {
                    debug!(tab_id = %tab_id, selector, error = %e, "Poll timed out");
                }
                Err(e) => warn!(tab_id = %tab_id, selector, error = %e, "Poll failed"),
            }

            sleep(interval).await;
        }

        debug!(tab_id = %tab_id, selector, polls, timeout_ms, "Wait timed out");
        Content::text(format!(
            "Timeout: Element not found within {timeout_ms}ms: {selector}"
        ))
    }

    /// Describes the first element matching `selector`.
    pub async fn get_element_info(&self, selector: &str, tab_id: Option<TabId>) -> Content {
        let selector = selector.to_string();
        self.run_verb(
            "getElementInfo",
            tab_id,
            "Error getting element info",
            |session| async move {
                let Some(element) = find_element(&session, &selector).await? else {
                    return Ok(Reply::Text(format!("Error: Element not found: {selector}")));
                };

                let attributes = fresh_attributes(&session, &element).await?;
                let text = element_text(&session, &element).await;
                Ok(Reply::Text(report(&element, &attributes, &text)))
            },
        )
        .await
    }
}

// ============================================================================
// Helpers
// ============================================================================

async fn fresh_attributes(
    session: &Session,
    element: &ElementDescriptor,
) -> Result<BTreeMap<String, String>> {
    let value = session
        .send(DomCommand::GetAttributes {
            node_id: element.node_id,
        })
        .await?;
    let response: AttributesResponse = serde_json::from_value(value)?;
    Ok(pair_up(response.attributes))
}

/// Whitespace-normalized text of the element, empty if unavailable.
async fn element_text(session: &Session, element: &ElementDescriptor) -> String {
    let outer = session
        .send(DomCommand::GetOuterHtml {
            node_id: element.node_id,
        })
        .await
        .ok()
        .and_then(|v| serde_json::from_value::<OuterHtmlResponse>(v).ok());

    let Some(outer) = outer else {
        return String::new();
    };
    let doc = Document::parse_fragment(&outer.outer_html);
    doc.text_content(doc.root())
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn report(element: &ElementDescriptor, attributes: &BTreeMap<String, String>, text: &str) -> String {
    let attr = |name: &str| attributes.get(name).map(String::as_str).filter(|v| !v.is_empty());
    let or_none = |value: Option<&str>| value.unwrap_or("none").to_string();

    let (x, y, width, height) = element
        .bounding_box
        .map_or((0.0, 0.0, 0.0, 0.0), |b| (b.x, b.y, b.width, b.height));

    let mut out = format!("Element Information for: {}\n", element.selector);
    let _ = writeln!(out, "Tag: {}", element.tag_name);
    let _ = writeln!(out, "ID: {}", or_none(attr("id")));
    let _ = writeln!(out, "Class: {}", or_none(attr("class")));
    let _ = writeln!(out, "Text: {}", or_none(Some(text).filter(|t| !t.is_empty())));
    let _ = writeln!(out, "Value: {}", or_none(attr("value")));
    let _ = writeln!(out, "Visible: {}", element.bounding_box.is_some());
    let _ = writeln!(out, "Position: x={}, y={}", x.round(), y.round());
    let _ = write!(out, "Size: {}x{}", width.round(), height.round());

    for (name, label) in [
        ("href", "Link"),
        ("src", "Source"),
        ("alt", "Alt text"),
        ("title", "Title"),
        ("placeholder", "Placeholder"),
    ] {
        if let Some(value) = attr(name) {
            let _ = write!(out, "\n{label}: {value}");
        }
    }
    for status in ["disabled", "checked", "selected"] {
        if attributes.contains_key(status) {
            let _ = write!(out, "\nStatus: {status}");
        }
    }
    out
}

// ============================================================================
// Tests
// ============================================================================
