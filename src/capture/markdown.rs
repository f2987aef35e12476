//! HTML to Markdown conversion.
//!
//! Uses `htmd`, whose defaults give ATX headings and fenced code blocks.
//! If conversion fails, plain text is pulled out with `scraper` instead.

// ============================================================================
// Imports
// ============================================================================

use htmd::HtmlToMarkdown;
use scraper::Html;
use tracing::warn;

// ============================================================================
// Functions
// ============================================================================

/// Converts an HTML fragment to Markdown.
#[must_use]
pub fn to_markdown(html: &str) -> String {
    let converter = HtmlToMarkdown::builder()
        .skip_tags(vec!["script", "style", "noscript", "iframe", "template"])
        .build();

    match converter.convert(html) {
        Ok(markdown) => clean_markdown(&markdown),
        Err(e) => {
            warn!(error = %e, "Markdown conversion failed, falling back to text");
            plain_text(html)
        }
    }
}

/// Collapses runs of blank lines to a single blank line and trims the ends.
fn clean_markdown(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());
    let mut pending_blank = false;

    for line in markdown.lines() {
        if line.trim().is_empty() {
            pending_blank = true;
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
            if pending_blank {
                out.push('\n');
            }
        }
        pending_blank = false;
        out.push_str(line.trim_end());
    }
    out
}

/// Whitespace-normalized text of a fragment.
fn plain_text(html: &str) -> String {
    Html::parse_fragment(html)
        .root_element()
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// Tests
// ============================================================================
