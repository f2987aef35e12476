//! Browser control verbs.
//!
//! Each verb is a [`Driver`] method that resolves the target tab, opens one
//! automation session, acts, and reports the outcome as [`Content`]. No verb
//! ever returns an error; failures become text.
//!
//! | Module | Verbs |
//! |--------|-------|
//! | `element` | `click_element`, `hover_element`, `scroll_to_element` |
//! | `keyboard` | `type_text`, `press_key` |
//! | `scroll` | `scroll_page` |
//! | `inspect` | `wait_for_element`, `get_element_info` |
//! | `page` | `navigate_to_url`, `take_screenshot` |

// ============================================================================
// Submodules
// ============================================================================

mod element;
mod inspect;
mod keyboard;
mod page;
mod scroll;

// ============================================================================
// Imports
// ============================================================================

use std::future::Future;

use tracing::warn;

use crate::browser::resolver::{BoundingBox, ElementDescriptor, find_element};
use crate::browser::session::Session;
use crate::driver::Driver;
use crate::error::Result;
use crate::identifiers::TabId;
use crate::protocol::{Content, InputCommand, MouseEvent};

// ============================================================================
// Shared plumbing
// ============================================================================

/// Verb result before it is rendered: text or a prepared envelope.
pub(crate) enum Reply {
    Text(String),
    Content(Content),
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl Driver {
    /// Resolves the tab, runs `body` in a session and renders the outcome.
    ///
    /// Errors are rendered as `{failure}: {error}`; a missing active tab as
    /// `Error: No active tab found`.
    pub(crate) async fn run_verb<F, Fut>(
        &self,
        verb: &'static str,
        tab_id: Option<TabId>,
        failure: &'static str,
        body: F,
    ) -> Content
    where
        F: FnOnce(Session) -> Fut,
        Fut: Future<Output = Result<Reply>>,
    {
        let tab_id = match self.resolve_tab(tab_id).await {
            Ok(tab_id) => tab_id,
            Err(e) => return Content::text(format!("Error: {e}")),
        };

        match self.inner.sessions.with_session(tab_id, body).await {
            Ok(Reply::Text(text)) => Content::text(text),
            Ok(Reply::Content(content)) => content,
            Err(e) => {
                warn!(verb, tab_id = %tab_id, error = %e, "Control command failed");
                Content::text(format!("{failure}: {e}"))
            }
        }
    }

    /// Like [`run_verb`](Self::run_verb) for verbs that act on a rendered
    /// element. A missing or box-less element is reported as not found.
    pub(crate) async fn run_element_verb<F, Fut>(
        &self,
        verb: &'static str,
        selector: &str,
        tab_id: Option<TabId>,
        failure: &'static str,
        act: F,
    ) -> Content
    where
        F: FnOnce(Session, ElementDescriptor, BoundingBox) -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        let selector = selector.to_string();
        self.run_verb(verb, tab_id, failure, |session| async move {
            let found = find_element(&session, &selector).await?;
            let Some((element, bbox)) =
                found.and_then(|el| el.bounding_box.map(|bbox| (el, bbox)))
            else {
                return Ok(Reply::Text(not_visible(&selector)));
            };
            act(session, element, bbox).await.map(Reply::Text)
        })
        .await
    }
}

fn not_visible(selector: &str) -> String {
    format!("Error: Element not found or not visible: {selector}")
}

/// Left click at a point: press then release.
async fn click_at(session: &Session, (x, y): (f64, f64)) -> Result<()> {
    session
        .send(InputCommand::DispatchMouseEvent(MouseEvent::pressed(x, y)))
        .await?;
    session
        .send(InputCommand::DispatchMouseEvent(MouseEvent::released(x, y)))
        .await?;
    Ok(())
}

// ============================================================================
// Test support
// ============================================================================
