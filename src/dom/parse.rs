//! Building a [`Document`] from HTML or from a page-side serialized tree.

// ============================================================================
// Imports
// ============================================================================

use scraper::node::{Comment, Text};
use scraper::{Html, Node, StrTendril};
use serde::{Deserialize, Serialize};

use super::{Document, NodeKey, new_attribute, new_element};

// ============================================================================
// HTML
// ============================================================================

impl Document {
    /// Parses a full HTML document and keeps its `<body>`.
    ///
    /// The computed cursor is approximated from an inline `cursor:`
    /// declaration, since no style engine is available here.
    #[must_use]
    pub fn parse_html(html: &str) -> Self {
        let parsed = Html::parse_document(html);
        let root = parsed.root_element();
        let body = root
            .children()
            .find(|n| n.value().as_element().is_some_and(|el| el.name() == "body"))
            .map_or_else(|| root.id(), |n| n.id());

        let mut doc = Self::from_parts(parsed, body);
        doc.cursors = doc
            .elements()
            .into_iter()
            .filter_map(|key| {
                let style = doc.element(key)?.attr("style")?;
                inline_cursor(style).map(|cursor| (key, cursor))
            })
            .collect();
        doc
    }

    /// Parses an HTML fragment in `<body>` context.
    #[must_use]
    pub fn parse_fragment(html: &str) -> Self {
        Self::parse_html(&format!("<body>{html}</body>"))
    }
}

/// Extracts the value of a `cursor` declaration from an inline style.
fn inline_cursor(style: &str) -> Option<String> {
    style.split(';').find_map(|decl| {
        let (prop, value) = decl.split_once(':')?;
        prop.trim()
            .eq_ignore_ascii_case("cursor")
            .then(|| value.trim().trim_end_matches("!important").trim().to_ascii_lowercase())
    })
}

// ============================================================================
// Serialized Page Tree
// ============================================================================

/// Node of the JSON tree produced by the in-page serialization script.
///
/// ```json
/// {"tag": "button", "attrs": [["id", "go"]], "cursor": "pointer",
///  "children": [{"text": "Go"}]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SerializedNode {
    /// An element.
    Element {
        /// Tag name.
        tag: String,
        /// Attributes in source order.
        #[serde(default)]
        attrs: Vec<(String, String)>,
        /// Computed cursor style.
        #[serde(default)]
        cursor: Option<String>,
        /// Child nodes.
        #[serde(default)]
        children: Vec<SerializedNode>,
    },
    /// A text node.
    Text {
        /// Text content.
        text: String,
    },
    /// A comment node.
    Comment {
        /// Comment content.
        comment: String,
    },
}

impl Document {
    /// Builds a document from a serialized `<body>` tree.
    ///
    /// A non-element root yields an empty body containing that node.
    #[must_use]
    pub fn from_serialized(root: SerializedNode) -> Self {
        let mut doc = Self::empty_body();
        let body = doc.root();

        match root {
            SerializedNode::Element {
                tag,
                attrs,
                cursor,
                children,
            } => {
                let html = doc.parent(body);
                doc.detach(body);
                let Some(html) = html else {
                    return doc;
                };
                let key = doc.append(html, element_node(&tag, &attrs));
                doc.root = key;
                doc.set_cursor(key, cursor);
                for child in children {
                    append_serialized(&mut doc, key, child);
                }
            }
            other => append_serialized(&mut doc, body, other),
        }
        doc
    }

    fn append(&mut self, parent: NodeKey, node: Node) -> NodeKey {
        match self.html.tree.get_mut(parent) {
            Some(mut parent) => parent.append(node).id(),
            None => self.html.tree.orphan(node).id(),
        }
    }

    fn set_cursor(&mut self, key: NodeKey, cursor: Option<String>) {
        if let Some(cursor) = cursor.filter(|c| !c.is_empty()) {
            self.cursors.insert(key, cursor.to_ascii_lowercase());
        }
    }
}

fn element_node(tag: &str, attrs: &[(String, String)]) -> Node {
    let attrs = attrs
        .iter()
        .map(|(name, value)| new_attribute(&name.to_ascii_lowercase(), value))
        .collect();
    Node::Element(new_element(tag, attrs))
}

fn append_serialized(doc: &mut Document, parent: NodeKey, node: SerializedNode) {
    match node {
        SerializedNode::Element {
            tag,
            attrs,
            cursor,
            children,
        } => {
            let key = doc.append(parent, element_node(&tag, &attrs));
            doc.set_cursor(key, cursor);
            for child in children {
                append_serialized(doc, key, child);
            }
        }
        SerializedNode::Text { text } => {
            doc.append(
                parent,
                Node::Text(Text {
                    text: shared(&text),
                }),
            );
        }
        SerializedNode::Comment { comment } => {
            doc.append(
                parent,
                Node::Comment(Comment {
                    comment: shared(&comment),
                }),
            );
        }
    }
}

/// Text in the form scraper's tree stores.
fn shared(text: &str) -> StrTendril {
    StrTendril::from_slice(text)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_parse_html_keeps_body() {
        let doc = Document::parse_html(
            r#"<html><head><title>t</title></head>
               <body class="page"><p id="x">Hi <b>there</b></p><!-- note --></body></html>"#,
        );
        let root = doc.element(doc.root()).expect("root element");
        assert_eq!(root.name(), "body");
        assert_eq!(root.attr("class"), Some("page"));

        let names: Vec<_> = doc
            .elements()
            .into_iter()
            .filter_map(|k| doc.element(k).map(|e| e.name().to_string()))
            .collect();
        assert_eq!(names, vec!["p", "b"]);
        assert!(doc.children(doc.root()).any(|k| {
            doc.get(k)
                .and_then(|n| n.value().as_comment().map(|c| c.trim() == "note"))
                .unwrap_or(false)
        }));
    }

    #[test]
    fn test_attribute_order_is_stable() {
        let html = r#"<input type="password" placeholder="Password" value="v" title="t">"#;
        for _ in 0..50 {
            let doc = Document::parse_fragment(html);
            assert_eq!(doc.inner_html(doc.root()), html);
        }
    }

    #[test]
    fn test_inline_cursor() {
        let doc = Document::parse_html(
            r#"<body><div style="color: red; CURSOR: Pointer !important">x</div></body>"#,
        );
        let div = doc.elements()[0];
        assert_eq!(doc.cursor(div), Some("pointer"));
    }

    #[test]
    fn test_parse_fragment() {
        let doc = Document::parse_fragment(r#"<a href="/x">Link <i>text</i></a>"#);
        let a = doc.elements()[0];
        assert_eq!(doc.element(a).map(|e| e.name()), Some("a"));
        assert_eq!(doc.text_content(a), "Link text");
        assert_eq!(doc.element(doc.root()).map(|e| e.name()), Some("body"));
    }

    #[test]
    fn test_from_serialized() {
        let tree: SerializedNode = serde_json::from_value(json!({
            "tag": "BODY",
            "attrs": [["class", "page"]],
            "children": [
                {"tag": "button", "attrs": [["id", "go"]], "cursor": "pointer",
                 "children": [{"text": "Go"}]},
                {"comment": "c"}
            ]
        }))
        .expect("valid tree");
        let doc = Document::from_serialized(tree);
        assert_eq!(doc.element(doc.root()).map(|e| e.name()), Some("body"));

        let button = doc.elements()[0];
        assert_eq!(doc.element(button).and_then(|e| e.id()), Some("go"));
        assert_eq!(doc.cursor(button), Some("pointer"));
        assert_eq!(doc.text_content(button), "Go");
        assert_eq!(doc.children(doc.root()).count(), 2);
        assert_eq!(doc.query("body.page > #go").map(|m| m.len()).ok(), Some(1));
        assert_eq!(
            doc.inner_html(doc.root()),
            r#"<button id="go">Go</button><!--c-->"#
        );
    }
}
