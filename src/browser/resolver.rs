//! Element resolution over the automation channel.
//!
//! Resolves a CSS selector to the first matching node, its attributes and
//! its on-screen box. A descriptor is only meaningful inside the session
//! that produced it.

// ============================================================================
// Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::identifiers::NodeId;
use crate::protocol::DomCommand;

use super::session::Session;

// ============================================================================
// Types
// ============================================================================

/// Axis-aligned box in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl BoundingBox {
    /// Smallest box containing all points of a quad `[x1, y1, .., x4, y4]`.
    #[must_use]
    pub fn from_quad(quad: &[f64]) -> Option<Self> {
        if quad.len() < 8 {
            return None;
        }
        let xs = quad.iter().step_by(2).take(4);
        let ys = quad.iter().skip(1).step_by(2).take(4);
        let (min_x, max_x) = xs.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
        let (min_y, max_y) = ys.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
        Some(Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        })
    }

    /// Center point.
    #[inline]
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// A resolved element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDescriptor {
    /// Channel node handle.
    pub node_id: NodeId,
    /// Selector the element was resolved from.
    pub selector: String,
    /// Lowercase tag name.
    pub tag_name: String,
    /// Attributes.
    pub attributes: BTreeMap<String, String>,
    /// Content box, absent when the element is not rendered.
    pub bounding_box: Option<BoundingBox>,
}

impl ElementDescriptor {
    /// Attribute value, if present.
    #[inline]
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    search_id: String,
    result_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResultsResponse {
    node_ids: Vec<NodeId>,
}

#[derive(Debug, Deserialize)]
struct DescribeResponse {
    node: DescribedNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescribedNode {
    #[serde(default)]
    local_name: String,
    #[serde(default)]
    node_name: String,
    #[serde(default)]
    attributes: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct BoxModelResponse {
    model: BoxModel,
}

#[derive(Debug, Deserialize)]
struct BoxModel {
    content: Vec<f64>,
}

fn decode<T: DeserializeOwned>(method: &str, value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| Error::protocol(format!("unexpected {method} response: {e}")))
}

// ============================================================================
// Resolution
// ============================================================================

/// Finds the first element matching `selector`.
///
/// Returns `Ok(None)` when nothing matches. An element that matches but has
/// no box model is returned with `bounding_box: None`.
///
/// # Errors
///
/// Propagates channel failures.
pub async fn find_element(session: &Session, selector: &str) -> Result<Option<ElementDescriptor>> {
    session.send(DomCommand::Enable).await?;
    session.send(DomCommand::GetDocument).await?;

    let search: SearchResponse = decode(
        "DOM.performSearch",
        session
            .send(DomCommand::PerformSearch {
                query: selector.to_string(),
                include_user_agent_shadow_dom: true,
            })
            .await?,
    )?;

    if search.result_count == 0 {
        discard(session, &search.search_id).await?;
        debug!(tab_id = %session.tab_id(), selector, "No element matched");
        return Ok(None);
    }

    let results = session
        .send(DomCommand::GetSearchResults {
            search_id: search.search_id.clone(),
            from_index: 0,
            to_index: 1,
        })
        .await;
    discard(session, &search.search_id).await?;
    let results: SearchResultsResponse = decode("DOM.getSearchResults", results?)?;

    let Some(&node_id) = results.node_ids.first() else {
        return Ok(None);
    };

    let described: DescribeResponse = decode(
        "DOM.describeNode",
        session.send(DomCommand::DescribeNode { node_id }).await?,
    )?;

    let bounding_box = match session.send(DomCommand::GetBoxModel { node_id }).await {
        Ok(value) => decode::<BoxModelResponse>("DOM.getBoxModel", value)
            .ok()
            .and_then(|r| BoundingBox::from_quad(&r.model.content)),
        Err(e) => {
            debug!(tab_id = %session.tab_id(), selector, error = %e, "No box model");
            None
        }
    };

    let node = described.node;
    let tag_name = if node.local_name.is_empty() {
        node.node_name.to_lowercase()
    } else {
        node.local_name
    };

    Ok(Some(ElementDescriptor {
        node_id,
        selector: selector.to_string(),
        tag_name,
        attributes: pair_up(node.attributes),
        bounding_box,
    }))
}

async fn discard(session: &Session, search_id: &str) -> Result<()> {
    session
        .send(DomCommand::DiscardSearchResults {
            search_id: search_id.to_string(),
        })
        .await
        .map(drop)
}

/// Turns a flat `[name, value, name, value, ..]` list into a map.
pub(crate) fn pair_up(flat: Vec<String>) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    let mut iter = flat.into_iter();
    while let (Some(name), Some(value)) = (iter.next(), iter.next()) {
        map.insert(name, value);
    }
    map
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use crate::browser::host::BrowserHost;
    use crate::browser::session::SessionManager;
    use crate::identifiers::TabId;
    use crate::testing::FakeHost;

    #[test]
    fn test_bounding_box_uses_all_points() {
        let quad = [10.0, 20.0, 50.0, 18.0, 52.0, 60.0, 8.0, 62.0];
        let bbox = BoundingBox::from_quad(&quad).expect("box");
        assert_eq!(bbox.x, 8.0);
        assert_eq!(bbox.y, 18.0);
        assert_eq!(bbox.width, 44.0);
        assert_eq!(bbox.height, 44.0);
        assert_eq!(bbox.center(), (30.0, 40.0));
        assert!(BoundingBox::from_quad(&[1.0, 2.0]).is_none());
    }

    #[test]
    fn test_pair_up() {
        let map = pair_up(vec!["id".into(), "a".into(), "class".into(), "b c".into()]);
        assert_eq!(map.get("class").map(String::as_str), Some("b c"));
        assert_eq!(map.len(), 2);
    }

    async fn resolve(host: &Arc<FakeHost>, selector: &str) -> Result<Option<ElementDescriptor>> {
        let sessions = SessionManager::new(Arc::clone(host) as Arc<dyn BrowserHost>, true);
        let tab = TabId::new(1).expect("valid tab id");
        let selector = selector.to_string();
        sessions
            .with_session(tab, |s| async move { find_element(&s, &selector).await })
            .await
    }

    #[tokio::test]
    async fn test_find_first_match() {
        let host = FakeHost::with_page(
            1,
            r#"<body><a href="/a" data-box="0,0,10,10">A</a><a href="/b">B</a></body>"#,
        );
        let found = resolve(&host, "a").await.expect("resolve").expect("element");
        assert_eq!(found.tag_name, "a");
        assert_eq!(found.attribute("href"), Some("/a"));
        assert_eq!(found.bounding_box.map(|b| b.center()), Some((5.0, 5.0)));
        assert_eq!(host.open_searches(), 0);
    }

    #[tokio::test]
    async fn test_no_match_discards_search() {
        let host = FakeHost::with_page(1, "<body><p>x</p></body>");
        assert!(resolve(&host, "#missing").await.expect("resolve").is_none());
        assert_eq!(host.open_searches(), 0);
    }

    #[tokio::test]
    async fn test_missing_box_model() {
        let host = FakeHost::with_page(1, "<body><button>x</button></body>");
        let found = resolve(&host, "button").await.expect("resolve").expect("element");
        assert!(found.bounding_box.is_none());
    }

    #[tokio::test]
    async fn test_channel_errors_propagate() {
        let host = FakeHost::with_page(1, "<body></body>");
        assert!(resolve(&host, "a:hover").await.is_err());
    }
}
