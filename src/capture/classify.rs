//! Element classification: skipped, text-bearing, interactive.

// ============================================================================
// Imports
// ============================================================================

use rustc_hash::FxHashSet;

use crate::dom::{Document, Element, NodeKey};

// ============================================================================
// Constants
// ============================================================================

/// Tags removed wholesale, subtree included, before classification.
pub const SKIP_TAGS: &[&str] = &[
    "script", "style", "link", "meta", "noscript", "svg", "path", "rect", "circle", "polygon",
    "iframe", "canvas", "video", "audio",
];

/// Tags that are interactive by nature.
pub const INTERACTIVE_TAGS: &[&str] = &[
    "a", "button", "input", "select", "textarea", "details", "summary", "label", "option",
    "fieldset", "legend",
];

/// ARIA roles that make an element interactive.
pub const INTERACTIVE_ROLES: &[&str] = &[
    "button", "link", "checkbox", "radio", "tab", "menuitem", "slider", "switch", "textbox",
    "combobox",
];

/// Computed cursors that signal an interactive element.
pub const INTERACTIVE_CURSORS: &[&str] = &[
    "pointer", "grab", "grabbing", "text", "copy", "zoom-in", "zoom-out",
];

/// Inline handlers that make an element interactive.
const HANDLER_ATTRIBUTES: &[&str] = &["onclick", "onkeydown", "onmousedown"];

// ============================================================================
// Predicates
// ============================================================================

/// Returns `true` if the element is in the skip set.
#[inline]
#[must_use]
pub fn is_skipped(el: &Element) -> bool {
    SKIP_TAGS.contains(&el.name())
}

/// Returns `true` if the element, with its computed `cursor`, is
/// interactive.
///
/// Disabled elements and `input[type=hidden]` never are.
#[must_use]
pub fn is_interactive(el: &Element, cursor: Option<&str>) -> bool {
    if el.attr("disabled").is_some() {
        return false;
    }
    if el.name() == "input"
        && el
            .attr("type")
            .is_some_and(|t| t.eq_ignore_ascii_case("hidden"))
    {
        return false;
    }

    if INTERACTIVE_TAGS.contains(&el.name()) {
        return true;
    }
    if el.attr("role").is_some_and(|role| INTERACTIVE_ROLES.contains(&role)) {
        return true;
    }
    if cursor.is_some_and(|cursor| INTERACTIVE_CURSORS.contains(&cursor)) {
        return true;
    }
    if HANDLER_ATTRIBUTES.iter().any(|h| el.attr(h).is_some()) {
        return true;
    }
    matches!(
        el.attr("contenteditable"),
        Some("" | "true" | "plaintext-only")
    )
}

// ============================================================================
// Classification
// ============================================================================

/// Text-bearing and interactive sets of one document.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    text_bearing: FxHashSet<NodeKey>,
    interactive: FxHashSet<NodeKey>,
    /// Interactive elements in document order.
    interactive_order: Vec<NodeKey>,
}

impl Classification {
    /// Classifies every element below the root. Skip-set subtrees are ignored.
    #[must_use]
    pub fn of(doc: &Document) -> Self {
        let mut class = Self::default();
        let mut stack: Vec<NodeKey> = doc.children(doc.root()).rev().collect();

        while let Some(key) = stack.pop() {
            let Some(el) = doc.element(key) else {
                continue;
            };
            if is_skipped(el) {
                continue;
            }
            if doc.has_direct_text(key) {
                class.text_bearing.insert(key);
            }
            if is_interactive(el, doc.cursor(key)) {
                class.interactive.insert(key);
                class.interactive_order.push(key);
            }
            stack.extend(doc.children(key).rev());
        }
        class
    }

    /// Returns `true` if the element has direct text.
    #[inline]
    #[must_use]
    pub fn is_text_bearing(&self, key: NodeKey) -> bool {
        self.text_bearing.contains(&key)
    }

    /// Returns `true` if the element is interactive.
    #[inline]
    #[must_use]
    pub fn is_interactive(&self, key: NodeKey) -> bool {
        self.interactive.contains(&key)
    }

    /// Returns `true` if the element is kept on its own merit.
    #[inline]
    #[must_use]
    pub fn is_significant(&self, key: NodeKey) -> bool {
        self.is_text_bearing(key) || self.is_interactive(key)
    }

    /// Interactive elements in document order.
    #[inline]
    #[must_use]
    pub fn interactive(&self) -> &[NodeKey] {
        &self.interactive_order
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn interactive(html: &str) -> bool {
        let doc = Document::parse_fragment(html);
        let key = doc.elements()[0];
        doc.element(key)
            .is_some_and(|el| is_interactive(el, doc.cursor(key)))
    }

    #[test]
    fn test_interactive_tags() {
        assert!(interactive("<button>x</button>"));
        assert!(interactive(r#"<a href="/">x</a>"#));
        assert!(!interactive("<div>x</div>"));
    }

    #[test]
    fn test_exclusions() {
        assert!(!interactive("<button disabled>x</button>"));
        assert!(!interactive(r#"<input type="hidden" name="csrf">"#));
        assert!(!interactive(r#"<div role="button" disabled>x</div>"#));
    }

    #[test]
    fn test_roles_handlers_and_editable() {
        assert!(interactive(r#"<div role="checkbox"></div>"#));
        assert!(!interactive(r#"<div role="presentation"></div>"#));
        assert!(interactive(r#"<div onclick="go()"></div>"#));
        assert!(interactive(r#"<div contenteditable="true"></div>"#));
        assert!(!interactive(r#"<div contenteditable="false"></div>"#));
    }

    #[test]
    fn test_cursor() {
        assert!(interactive(r#"<span style="cursor: pointer">x</span>"#));
        assert!(!interactive(r#"<span style="cursor: default">x</span>"#));
    }

    #[test]
    fn test_classification_skips_subtrees() {
        let doc = Document::parse_html(
            r#"<body><p>text</p><noscript><button>hidden</button></noscript><a>go</a></body>"#,
        );
        let class = Classification::of(&doc);
        assert_eq!(class.interactive().len(), 1);
        let a = class.interactive()[0];
        assert_eq!(doc.element(a).map(|e| e.name()), Some("a"));
        assert!(class.is_text_bearing(a));
    }
}
