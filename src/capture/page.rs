//! The page capability the capture engine runs against.
//!
//! Capture never reaches into a browser directly. It asks a [`PageContext`]
//! for a detached copy of the body, for match counts against the live
//! document, and to tag live elements with a `data-ai-id`.

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use parking_lot::Mutex;
use scraper::Node;

use crate::dom::Document;
use crate::error::Result;

// ============================================================================
// PageContext
// ============================================================================

/// A loaded page as seen by the capture engine.
#[async_trait]
pub trait PageContext: Send + Sync {
    /// Detached copy of `<body>` with computed cursors filled in.
    async fn body(&self) -> Result<Document>;

    /// Rendered text of `<body>`.
    async fn inner_text(&self) -> Result<String>;

    /// Number of live elements matching each selector, `None` where the
    /// selector does not parse.
    async fn count_matches(&self, selectors: &[String]) -> Result<Vec<Option<usize>>>;

    /// Sets `attribute` on live elements addressed by their position in
    /// `body.querySelectorAll('*')`.
    async fn tag_elements(&self, attribute: &str, tags: &[(usize, String)]) -> Result<()>;
}

// ============================================================================
// StaticPage
// ============================================================================

/// An in-memory page backed by a [`Document`].
///
/// Used for captures of already-fetched HTML and as the page of test hosts.
#[derive(Debug)]
pub struct StaticPage {
    document: Mutex<Document>,
}

impl StaticPage {
    /// Wraps a document.
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            document: Mutex::new(document),
        }
    }

    /// Parses HTML into a page.
    #[must_use]
    pub fn from_html(html: &str) -> Self {
        Self::new(Document::parse_html(html))
    }

    /// Copy of the live document.
    #[must_use]
    pub fn snapshot(&self) -> Document {
        self.document.lock().clone()
    }
}

#[async_trait]
impl PageContext for StaticPage {
    async fn body(&self) -> Result<Document> {
        Ok(self.snapshot())
    }

    async fn inner_text(&self) -> Result<String> {
        let doc = self.document.lock();
        Ok(rendered_text(&doc))
    }

    async fn count_matches(&self, selectors: &[String]) -> Result<Vec<Option<usize>>> {
        let doc = self.document.lock();
        Ok(selectors
            .iter()
            .map(|s| doc.query(s).ok().map(|matches| matches.len()))
            .collect())
    }

    async fn tag_elements(&self, attribute: &str, tags: &[(usize, String)]) -> Result<()> {
        let mut doc = self.document.lock();
        let elements = doc.elements();
        for (index, value) in tags {
            if let Some(&key) = elements.get(*index) {
                doc.set_attr(key, attribute, value);
            }
        }
        Ok(())
    }
}

/// Approximates `innerText`: text outside skipped elements, whitespace
/// collapsed, block boundaries as line breaks.
fn rendered_text(doc: &Document) -> String {
    const HIDDEN: &[&str] = &["script", "style", "noscript", "template", "head"];
    const BLOCKS: &[&str] = &[
        "p", "div", "section", "article", "header", "footer", "nav", "main", "aside", "li", "ul",
        "ol", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "table", "br", "pre", "blockquote", "form",
    ];

    let mut lines: Vec<String> = vec![String::new()];
    let mut stack = vec![(doc.root(), false)];

    while let Some((key, closing)) = stack.pop() {
        let Some(node) = doc.get(key) else {
            continue;
        };
        match node.value() {
            Node::Element(el) => {
                if HIDDEN.contains(&el.name()) {
                    continue;
                }
                let block = BLOCKS.contains(&el.name());
                if block && lines.last().is_some_and(|l| !l.trim().is_empty()) {
                    lines.push(String::new());
                }
                if !closing {
                    if block {
                        stack.push((key, true));
                    }
                    stack.extend(doc.children(key).rev().map(|c| (c, false)));
                }
            }
            Node::Text(text) => {
                if let Some(line) = lines.last_mut() {
                    line.push_str(text);
                }
            }
            _ => {}
        }
    }

    lines
        .iter()
        .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Tests
// ============================================================================
