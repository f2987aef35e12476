//! Tree-shaping passes over a detached [`Document`].
//!
//! All passes walk bottom-up, so a parent sees its children's final state.

// ============================================================================
// Imports
// ============================================================================

use crate::dom::{Document, NodeKey};

use super::classify::{Classification, is_skipped};

// ============================================================================
// Constants
// ============================================================================

/// Attributes kept on snapshot elements.
pub const SNAPSHOT_ATTRIBUTES: &[&str] = &[
    "value",
    "placeholder",
    "type",
    "src",
    "alt",
    "title",
    "aria-label",
    "role",
    "data-ai-id",
    "id",
    "class",
];

/// Attributes kept on full-html elements.
pub const FULL_HTML_ATTRIBUTES: &[&str] = &["href", "value", "placeholder", "type", "role"];

/// Containers that collapse when nested one inside another.
const GENERIC_CONTAINERS: &[&str] = &[
    "div", "section", "article", "main", "aside", "header", "footer", "nav", "span",
];

// ============================================================================
// Passes
// ============================================================================

/// Removes every skip-set element with its subtree. Returns the number removed.
pub fn remove_skipped(doc: &mut Document) -> usize {
    let skipped: Vec<NodeKey> = doc
        .elements()
        .into_iter()
        .filter(|&k| doc.element(k).is_some_and(is_skipped))
        .collect();

    let mut removed = 0;
    for key in skipped {
        if doc.is_attached(key) {
            doc.detach(key);
            removed += 1;
        }
    }
    removed
}

/// Keeps an element iff it is text-bearing, interactive, or has a kept
/// descendant. The root always stays. Returns the number removed.
pub fn retain(doc: &mut Document, class: &Classification) -> usize {
    let root = doc.root();
    let mut removed = 0;

    for key in doc.post_order(root) {
        if key == root || doc.element(key).is_none() {
            continue;
        }
        let keep = class.is_significant(key) || doc.element_children(key).next().is_some();
        if !keep {
            doc.detach(key);
            removed += 1;
        }
    }
    removed
}

/// Drops every attribute not in `allowed`.
pub fn strip_attributes(doc: &mut Document, allowed: &[&str]) {
    for key in doc.elements() {
        doc.retain_attrs(key, |name| allowed.contains(&name));
    }
}

/// Removes elements left without element children or text, unless
/// interactive. Returns the number removed.
pub fn remove_empty(doc: &mut Document, class: &Classification) -> usize {
    let root = doc.root();
    let mut removed = 0;

    for key in doc.post_order(root) {
        if key == root || doc.element(key).is_none() || class.is_interactive(key) {
            continue;
        }
        let empty = doc.element_children(key).next().is_none() && !doc.has_direct_text(key);
        if empty {
            doc.detach(key);
            removed += 1;
        }
    }
    removed
}

/// Collapses a generic container whose only content is one generic
/// container child, splicing the child's children into the parent.
pub fn flatten_containers(doc: &mut Document) -> usize {
    let root = doc.root();
    let mut collapsed = 0;

    for key in doc.post_order(root) {
        if !is_generic(doc, key) {
            continue;
        }
        let element_children: Vec<NodeKey> = doc.element_children(key).collect();
        let &[only] = element_children.as_slice() else {
            continue;
        };
        if !is_generic(doc, only) || doc.has_direct_text(key) {
            continue;
        }

        let whitespace: Vec<NodeKey> = doc.children(key).filter(|&c| c != only).collect();
        for node in whitespace {
            doc.detach(node);
        }
        doc.unwrap_node(only);
        collapsed += 1;
    }
    collapsed
}

fn is_generic(doc: &Document, key: NodeKey) -> bool {
    doc.element(key)
        .is_some_and(|el| GENERIC_CONTAINERS.contains(&el.name()))
}

// ============================================================================
// Tests
// ============================================================================
