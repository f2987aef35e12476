//! Page capture engine.
//!
//! Turns a loaded page into a compact text view for a language model.
//!
//! | Mode | Output |
//! |------|--------|
//! | [`CaptureMode::Snapshot`] | Pruned HTML prefixed by an interactive-elements summary |
//! | [`CaptureMode::FullHtml`] | Pruned, flattened HTML with a small attribute allow-list |
//! | [`CaptureMode::Markdown`] | The full-html tree converted to Markdown |
//! | [`CaptureMode::Text`] | Rendered body text |
//!
//! Every mode is cut to a character limit. The capture works on a detached
//! copy; the only live mutation is tagging elements with `data-ai-id`.

// ============================================================================
// Submodules
// ============================================================================

pub mod classify;
pub mod markdown;
pub mod minify;
pub mod page;
pub mod prune;
pub mod selectors;
pub mod summary;

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use tracing::debug;

use crate::dom::Document;
use crate::error::Result;

use self::classify::Classification;
use self::minify::{minify, strip_comments, truncate_chars};
use self::page::PageContext;
use self::prune::{FULL_HTML_ATTRIBUTES, SNAPSHOT_ATTRIBUTES};
use self::selectors::Survey;
use self::summary::InteractiveElement;

// ============================================================================
// Re-exports
// ============================================================================

pub use page::StaticPage;

// ============================================================================
// Constants
// ============================================================================

/// Default character limit of a capture.
pub const DEFAULT_CAPTURE_LIMIT: usize = 15_000;

// ============================================================================
// CaptureMode
// ============================================================================

/// What kind of view to capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureMode {
    /// Interactive snapshot with selector summary.
    Snapshot,
    /// Pruned HTML.
    FullHtml,
    /// Markdown rendering of the pruned HTML.
    Markdown,
    /// Rendered text.
    Text,
}

impl CaptureMode {
    /// Text shown when the capture fails or comes back empty.
    #[inline]
    #[must_use]
    pub const fn fallback_text(self) -> &'static str {
        match self {
            Self::Snapshot => "No snapshot created",
            Self::FullHtml | Self::Markdown | Self::Text => "No content found",
        }
    }
}

impl fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Snapshot => "snapshot",
            Self::FullHtml => "full-html",
            Self::Markdown => "markdown",
            Self::Text => "text",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Capture
// ============================================================================

/// Captures `page` in `mode`, cut to at most `limit` characters.
///
/// # Errors
///
/// Propagates failures of the page capability.
pub async fn capture(page: &dyn PageContext, mode: CaptureMode, limit: usize) -> Result<String> {
    let output = match mode {
        CaptureMode::Snapshot => {
            let snapshot = interactive_snapshot(page).await?;
            let summary = summary::render(&snapshot.elements);
            let html = snapshot.document.inner_html(snapshot.document.root());
            minify(&format!("{summary}\n{}", strip_comments(&html)))
        }
        CaptureMode::FullHtml => {
            let doc = pruned_tree(page).await?;
            minify(&strip_comments(&doc.inner_html(doc.root())))
        }
        CaptureMode::Markdown => {
            let doc = pruned_tree(page).await?;
            markdown::to_markdown(&doc.inner_html(doc.root()))
        }
        CaptureMode::Text => page.inner_text().await?,
    };

    let chars = output.chars().count();
    if chars > limit {
        debug!(%mode, chars, limit, "Truncating capture");
    }
    Ok(truncate_chars(&output, limit).to_string())
}

/// Pruned body plus its interactive elements.
struct Snapshot {
    document: Document,
    elements: Vec<InteractiveElement>,
}

async fn interactive_snapshot(page: &dyn PageContext) -> Result<Snapshot> {
    let mut doc = page.body().await?;
    let survey = Survey::of(&doc);

    prune::remove_skipped(&mut doc);
    let class = Classification::of(&doc);

    let assigned = selectors::assign(page, &mut doc, class.interactive(), &survey).await?;
    let elements: Vec<InteractiveElement> = assigned
        .into_iter()
        .map(|(key, selector)| InteractiveElement {
            description: summary::describe(&doc, key),
            selector,
        })
        .collect();

    let removed = prune::retain(&mut doc, &class);
    prune::strip_attributes(&mut doc, SNAPSHOT_ATTRIBUTES);
    let emptied = prune::remove_empty(&mut doc, &class);

    debug!(
        interactive = elements.len(),
        removed, emptied, "Built interactive snapshot"
    );

    Ok(Snapshot {
        document: doc,
        elements,
    })
}

async fn pruned_tree(page: &dyn PageContext) -> Result<Document> {
    let mut doc = page.body().await?;

    prune::remove_skipped(&mut doc);
    let class = Classification::of(&doc);
    prune::retain(&mut doc, &class);
    prune::strip_attributes(&mut doc, FULL_HTML_ATTRIBUTES);
    prune::remove_empty(&mut doc, &class);
    let flattened = prune::flatten_containers(&mut doc);

    debug!(flattened, "Built pruned tree");
    Ok(doc)
}

// ============================================================================
// Tests
// ============================================================================
