//! Whitespace minification and hard truncation.

// ============================================================================
// Imports
// ============================================================================

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

// ============================================================================
// Patterns
// ============================================================================

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!--[\s\S]*?-->").expect("valid comment pattern"));

static INTER_TAG_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">\s+<").expect("valid inter-tag pattern"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("valid whitespace pattern"));

// ============================================================================
// Functions
// ============================================================================

/// Removes every HTML comment.
#[must_use]
pub fn strip_comments(html: &str) -> Cow<'_, str> {
    COMMENT.replace_all(html, "")
}

/// Collapses inter-tag whitespace, trims, and squeezes whitespace runs.
#[must_use]
pub fn minify(html: &str) -> String {
    let joined = INTER_TAG_SPACE.replace_all(html, "><");
    WHITESPACE_RUN.replace_all(joined.trim(), " ").into_owned()
}

/// Cuts `text` to at most `limit` characters, on a char boundary.
#[must_use]
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

// ============================================================================
// Tests
// ============================================================================
