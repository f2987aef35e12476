//! Interactive-elements summary block.

// ============================================================================
// Imports
// ============================================================================

use std::fmt::Write as _;

use crate::dom::{Document, NodeKey};

// ============================================================================
// Constants
// ============================================================================

/// Opening line of the summary comment.
pub const SUMMARY_MARKER: &str = "INTERACTIVE ELEMENTS SUMMARY";

/// Longest text or value quoted in a description.
const MAX_QUOTED_CHARS: usize = 50;

// ============================================================================
// InteractiveElement
// ============================================================================

/// One entry of the summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractiveElement {
    /// Selector that resolves to exactly this element.
    pub selector: String,
    /// Short human-readable description.
    pub description: String,
}

// ============================================================================
// Description
// ============================================================================

/// Describes an element: tag, input type, then the first available of
/// text, value, placeholder, alt, title and aria-label.
#[must_use]
pub fn describe(doc: &Document, key: NodeKey) -> String {
    let Some(el) = doc.element(key) else {
        return String::new();
    };

    let mut description = el.name().to_string();
    if el.name() == "input" {
        let input_type = el.attr("type").filter(|t| !t.is_empty()).unwrap_or("text");
        let _ = write!(description, "[type=\"{input_type}\"]");
    }

    let text = collapse_whitespace(&doc.text_content(key));
    let non_empty = |name: &str| el.attr(name).map(str::trim).filter(|v| !v.is_empty());

    if !text.is_empty() {
        let _ = write!(description, " \"{}\"", shorten(&text));
    } else if let Some(value) = non_empty("value") {
        let _ = write!(description, " value=\"{}\"", shorten(value));
    } else if let Some(placeholder) = non_empty("placeholder") {
        let _ = write!(description, " placeholder=\"{placeholder}\"");
    } else if let Some(alt) = non_empty("alt") {
        let _ = write!(description, " alt=\"{alt}\"");
    } else if let Some(title) = non_empty("title") {
        let _ = write!(description, " title=\"{title}\"");
    } else if let Some(label) = non_empty("aria-label") {
        let _ = write!(description, " aria-label=\"{label}\"");
    }

    comment_safe(description)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn shorten(text: &str) -> String {
    if text.chars().count() <= MAX_QUOTED_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(MAX_QUOTED_CHARS).collect();
    format!("{}...", cut.trim_end())
}

/// Breaks up `--` so a description cannot close the summary comment.
fn comment_safe(mut text: String) -> String {
    while text.contains("--") {
        text = text.replace("--", "- -");
    }
    text
}

// ============================================================================
// Rendering
// ============================================================================

/// Renders the summary comment, or an empty string when there is nothing
/// to list.
#[must_use]
pub fn render(elements: &[InteractiveElement]) -> String {
    if elements.is_empty() {
        return String::new();
    }

    let mut out = format!("<!-- {SUMMARY_MARKER}\n");
    out.push_str("The following interactive elements are available on this page:\n");
    for (index, element) in elements.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} - {}",
            index + 1,
            element.selector,
            element.description
        );
    }
    out.push_str("Use these selectors to interact with elements via browser control tools.\n");
    out.push_str("-->");
    out
}

// ============================================================================
// Tests
// ============================================================================
