//! Detached DOM tree used by the capture engine.
//!
//! A [`Document`] is a `scraper` tree whose working root is the page's
//! `<body>`. It is always a copy: pruning, attribute stripping and
//! flattening never touch the live page.
//!
//! | Module | Description |
//! |--------|-------------|
//! | `parse` | Build a document from HTML or from a serialized page tree |
//!
//! Selection uses [`scraper::Selector`] and serialization uses scraper's
//! html5ever serializer, so both behave the way a browser does.

// ============================================================================
// Submodules
// ============================================================================

/// HTML and serialized-tree parsing.
pub mod parse;

// ============================================================================
// Imports
// ============================================================================

use ego_tree::NodeRef;
use html5ever::tendril::StrTendril;
use html5ever::{Attribute, LocalName, Namespace, QualName};
use rustc_hash::FxHashMap;
use scraper::{ElementRef, Html, Node, Selector};

use crate::error::{Error, Result};

// ============================================================================
// Re-exports
// ============================================================================

pub use ego_tree::NodeId as NodeKey;
pub use parse::SerializedNode;
pub use scraper::node::Element;

// ============================================================================
// Constants
// ============================================================================

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

// ============================================================================
// Document
// ============================================================================

/// Element tree rooted at `<body>`, with computed cursors on the side.
///
/// Detached nodes stay in the arena but are unreachable from the root, so
/// every traversal starts at [`Document::root`].
#[derive(Debug, Clone)]
pub struct Document {
    html: Html,
    root: NodeKey,
    cursors: FxHashMap<NodeKey, String>,
}

impl Document {
    fn from_parts(html: Html, root: NodeKey) -> Self {
        Self {
            html,
            root,
            cursors: FxHashMap::default(),
        }
    }

    /// Creates a document holding only an empty `<body>`.
    #[must_use]
    pub fn empty_body() -> Self {
        let mut html = Html::new_document();
        let root = html
            .tree
            .root_mut()
            .append(Node::Element(new_element("html", Vec::new())))
            .append(Node::Element(new_element("body", Vec::new())))
            .id();
        Self::from_parts(html, root)
    }

    /// Root node (the `<body>` element).
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeKey {
        self.root
    }

    /// Tree node at `key`.
    #[inline]
    #[must_use]
    pub fn get(&self, key: NodeKey) -> Option<NodeRef<'_, Node>> {
        self.html.tree.get(key)
    }

    /// Element payload, if `key` is an element.
    #[inline]
    #[must_use]
    pub fn element(&self, key: NodeKey) -> Option<&Element> {
        self.get(key).and_then(|n| n.value().as_element())
    }

    /// Computed `cursor` style, if known.
    #[inline]
    #[must_use]
    pub fn cursor(&self, key: NodeKey) -> Option<&str> {
        self.cursors.get(&key).map(String::as_str)
    }

    /// Parent node.
    #[inline]
    #[must_use]
    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.get(key).and_then(|n| n.parent()).map(|p| p.id())
    }

    /// Child nodes in order.
    pub fn children(&self, key: NodeKey) -> impl DoubleEndedIterator<Item = NodeKey> + '_ {
        self.get(key)
            .into_iter()
            .flat_map(|n| n.children())
            .map(|c| c.id())
    }

    /// Element children of `key`.
    pub fn element_children(&self, key: NodeKey) -> impl Iterator<Item = NodeKey> + '_ {
        self.children(key).filter(|&c| self.element(c).is_some())
    }

    /// All nodes below `key` in document order, excluding `key`.
    #[must_use]
    pub fn descendants(&self, key: NodeKey) -> Vec<NodeKey> {
        self.get(key)
            .map(|n| n.descendants().skip(1).map(|d| d.id()).collect())
            .unwrap_or_default()
    }

    /// All elements below the root in document order.
    ///
    /// Positions in this list match `body.querySelectorAll('*')` on the page
    /// the document was copied from.
    #[must_use]
    pub fn elements(&self) -> Vec<NodeKey> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&k| self.element(k).is_some())
            .collect()
    }

    /// Nodes of the subtree at `key`, children before parents.
    #[must_use]
    pub fn post_order(&self, key: NodeKey) -> Vec<NodeKey> {
        let mut order = vec![key];
        order.extend(self.descendants(key));
        order.reverse();
        order
    }

    /// Returns `true` if `key` is still reachable from the root.
    #[must_use]
    pub fn is_attached(&self, key: NodeKey) -> bool {
        key == self.root
            || self
                .get(key)
                .is_some_and(|n| n.ancestors().any(|a| a.id() == self.root))
    }

    /// Concatenated text of the subtree.
    #[must_use]
    pub fn text_content(&self, key: NodeKey) -> String {
        self.get(key)
            .into_iter()
            .flat_map(|n| n.descendants())
            .filter_map(|d| d.value().as_text())
            .map(|t| &**t)
            .collect()
    }

    /// Returns `true` if a direct text child has non-whitespace content.
    #[must_use]
    pub fn has_direct_text(&self, key: NodeKey) -> bool {
        self.get(key).is_some_and(|n| {
            n.children()
                .filter_map(|c| c.value().as_text())
                .any(|t| !t.trim().is_empty())
        })
    }

    /// Elements matching `selector`, root included, in document order.
    #[must_use]
    pub fn select(&self, selector: &Selector) -> Vec<NodeKey> {
        self.get(self.root)
            .into_iter()
            .flat_map(|n| n.descendants())
            .filter_map(ElementRef::wrap)
            .filter(|el| selector.matches(el))
            .map(|el| el.id())
            .collect()
    }

    /// Parses `selector` and returns the matching elements.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSelector`] if the selector does not parse.
    pub fn query(&self, selector: &str) -> Result<Vec<NodeKey>> {
        let parsed =
            Selector::parse(selector).map_err(|e| Error::invalid_selector(selector, e.to_string()))?;
        Ok(self.select(&parsed))
    }

    /// Markup of the children of `key`.
    #[must_use]
    pub fn inner_html(&self, key: NodeKey) -> String {
        self.get(key)
            .and_then(ElementRef::wrap)
            .map(|el| el.inner_html())
            .unwrap_or_default()
    }

    /// Markup of `key` itself.
    #[must_use]
    pub fn outer_html(&self, key: NodeKey) -> String {
        self.get(key)
            .and_then(ElementRef::wrap)
            .map(|el| el.html())
            .unwrap_or_default()
    }
}

// ============================================================================
// Mutation
// ============================================================================

impl Document {
    /// Sets or replaces an attribute on an element.
    pub fn set_attr(&mut self, key: NodeKey, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        self.rebuild_element(key, |attrs| {
            match attrs.iter_mut().find(|a| &*a.name.local == name) {
                Some(attr) => attr.value = StrTendril::from_slice(value),
                None => attrs.push(new_attribute(&name, value)),
            }
        });
    }

    /// Keeps only attributes whose name passes `keep`.
    pub fn retain_attrs(&mut self, key: NodeKey, mut keep: impl FnMut(&str) -> bool) {
        self.rebuild_element(key, |attrs| attrs.retain(|a| keep(&a.name.local)));
    }

    /// Replaces the element at `key` with one carrying edited attributes.
    ///
    /// Rebuilding keeps scraper's cached id and class lists in step with
    /// the attributes.
    fn rebuild_element(&mut self, key: NodeKey, edit: impl FnOnce(&mut Vec<Attribute>)) {
        let Some(mut node) = self.html.tree.get_mut(key) else {
            return;
        };
        let Node::Element(el) = node.value() else {
            return;
        };
        let mut attrs: Vec<Attribute> = el
            .attrs
            .iter()
            .map(|(name, value)| Attribute {
                name: name.clone(),
                value: StrTendril::from_slice(value),
            })
            .collect();
        edit(&mut attrs);
        *el = Element::new(el.name.clone(), attrs);
    }

    /// Removes `key` (and its subtree) from the tree.
    pub fn detach(&mut self, key: NodeKey) {
        if let Some(mut node) = self.html.tree.get_mut(key) {
            node.detach();
        }
    }

    /// Replaces `key` with its own children, in place.
    pub fn unwrap_node(&mut self, key: NodeKey) {
        if self.parent(key).is_none() {
            return;
        }
        let children: Vec<NodeKey> = self.children(key).collect();
        let Some(mut node) = self.html.tree.get_mut(key) else {
            return;
        };
        for child in children {
            node.insert_id_before(child);
        }
        node.detach();
    }
}

// ============================================================================
// Construction Helpers
// ============================================================================

/// Creates an HTML element with the given attributes.
fn new_element(name: &str, attrs: Vec<Attribute>) -> Element {
    let name = QualName::new(
        None,
        Namespace::from(HTML_NAMESPACE),
        LocalName::from(name.to_ascii_lowercase()),
    );
    Element::new(name, attrs)
}

fn new_attribute(name: &str, value: &str) -> Attribute {
    Attribute {
        name: QualName::new(None, Namespace::from(""), LocalName::from(name)),
        value: StrTendril::from_slice(value),
    }
}

// ============================================================================
// Tests
// ============================================================================
