//! Stable selector assignment for interactive elements.
//!
//! Priority per element:
//!
//! 1. `#id`, when the id is a plain identifier matching one live element
//! 2. `tag.c1.c2` (first two classes), when it matches one live element
//! 3. `[data-ai-id="..."]`, reusing a unique existing value or tagging the
//!    live element with a fresh `ai-interactive-N`

// ============================================================================
// Imports
// ============================================================================

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::dom::{Document, NodeKey};
use crate::error::Result;

use super::page::PageContext;

// ============================================================================
// Constants
// ============================================================================

/// Attribute carrying synthesized element ids.
pub const AI_ID_ATTRIBUTE: &str = "data-ai-id";

/// Prefix of synthesized element ids.
pub const AI_ID_PREFIX: &str = "ai-interactive-";

// ============================================================================
// Identifiers
// ============================================================================

/// Returns `true` if `s` can be written unescaped as a CSS identifier,
/// e.g. after `#` or `.`.
#[must_use]
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let first = match chars.next() {
        Some('-') => match chars.next() {
            Some(c) if c.is_ascii_digit() => return false,
            Some(c) if is_name_char(c) => c,
            _ => return false,
        },
        Some(c) => c,
        None => return false,
    };
    !first.is_ascii_digit() && is_name_char(first) && chars.all(is_name_char)
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

// ============================================================================
// Survey
// ============================================================================

/// Facts about the unpruned copy that selector assignment needs later.
#[derive(Debug, Clone, Default)]
pub struct Survey {
    /// Position of each element in `body.querySelectorAll('*')`.
    positions: FxHashMap<NodeKey, usize>,
    /// Occurrences of each existing `data-ai-id` value.
    existing_ids: FxHashMap<String, usize>,
}

impl Survey {
    /// Surveys a freshly copied body. Must run before any pruning.
    #[must_use]
    pub fn of(doc: &Document) -> Self {
        let mut survey = Self::default();
        for (position, key) in doc.elements().into_iter().enumerate() {
            survey.positions.insert(key, position);
            if let Some(value) = doc.element(key).and_then(|el| el.attr(AI_ID_ATTRIBUTE)) {
                *survey.existing_ids.entry(value.to_string()).or_default() += 1;
            }
        }
        survey
    }
}

// ============================================================================
// Assignment
// ============================================================================

struct Candidates {
    id: Option<String>,
    class: Option<String>,
}

fn candidates(doc: &Document, key: NodeKey) -> Candidates {
    let Some(el) = doc.element(key) else {
        return Candidates {
            id: None,
            class: None,
        };
    };

    let id = el
        .id()
        .filter(|id| is_identifier(id))
        .map(|id| format!("#{id}"));

    // Source order, as `classList` reports it.
    let classes: Vec<&str> = el
        .attr("class")
        .unwrap_or_default()
        .split_ascii_whitespace()
        .take(2)
        .collect();
    let class = (!classes.is_empty() && classes.iter().all(|c| is_identifier(c)))
        .then(|| format!("{}.{}", el.name(), classes.join(".")));

    Candidates { id, class }
}

/// Assigns a selector to each element of `interactive`, in order.
///
/// Generated `data-ai-id` values are written to both `doc` and the live
/// page. Returns `(element, selector)` pairs.
///
/// # Errors
///
/// Fails only if the page cannot be queried or tagged.
pub async fn assign(
    page: &dyn PageContext,
    doc: &mut Document,
    interactive: &[NodeKey],
    survey: &Survey,
) -> Result<Vec<(NodeKey, String)>> {
    let candidates: Vec<Candidates> = interactive.iter().map(|&k| candidates(doc, k)).collect();

    let queries: Vec<String> = candidates
        .iter()
        .flat_map(|c| c.id.iter().chain(c.class.iter()).cloned())
        .collect();
    let counts: FxHashMap<String, Option<usize>> = if queries.is_empty() {
        FxHashMap::default()
    } else {
        let counts = page.count_matches(&queries).await?;
        queries.into_iter().zip(counts).collect()
    };
    let unique = |selector: &Option<String>| {
        selector
            .as_ref()
            .filter(|s| counts.get(*s).copied().flatten() == Some(1))
            .cloned()
    };

    let mut claimed: FxHashSet<String> = survey.existing_ids.keys().cloned().collect();
    let mut reused: FxHashSet<String> = FxHashSet::default();
    let mut tags = Vec::new();
    let mut assigned = Vec::with_capacity(interactive.len());

    for (index, (&key, candidate)) in interactive.iter().zip(&candidates).enumerate() {
        if let Some(selector) = unique(&candidate.id).or_else(|| unique(&candidate.class)) {
            assigned.push((key, selector));
            continue;
        }

        let existing = doc
            .element(key)
            .and_then(|el| el.attr(AI_ID_ATTRIBUTE))
            .filter(|v| survey.existing_ids.get(*v) == Some(&1) && !reused.contains(*v))
            .map(str::to_string);

        let value = match existing {
            Some(value) => {
                reused.insert(value.clone());
                value
            }
            None => {
                let mut n = index;
                while claimed.contains(&format!("{AI_ID_PREFIX}{n}")) {
                    n += 1;
                }
                let value = format!("{AI_ID_PREFIX}{n}");
                claimed.insert(value.clone());
                if let Some(&position) = survey.positions.get(&key) {
                    tags.push((position, value.clone()));
                }
                doc.set_attr(key, AI_ID_ATTRIBUTE, &value);
                value
            }
        };
        assigned.push((key, format!("[{AI_ID_ATTRIBUTE}=\"{value}\"]")));
    }

    if !tags.is_empty() {
        debug!(count = tags.len(), "Tagging live elements");
        page.tag_elements(AI_ID_ATTRIBUTE, &tags).await?;
    }

    Ok(assigned)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::capture::classify::Classification;
    use crate::capture::page::StaticPage;

    async fn run(html: &str) -> (StaticPage, Vec<String>) {
        let page = StaticPage::from_html(html);
        let mut doc = page.body().await.expect("body");
        let survey = Survey::of(&doc);
        let class = Classification::of(&doc);
        let interactive = class.interactive().to_vec();
        let assigned = assign(&page, &mut doc, &interactive, &survey)
            .await
            .expect("assign");
        (page, assigned.into_iter().map(|(_, s)| s).collect())
    }

    #[tokio::test]
    async fn test_priority_order() {
        let (_, selectors) = run(
            r#"<body>
                <button id="save">Save</button>
                <a class="nav link extra">Home</a>
                <a class="nav">One</a><a class="nav">Two</a>
            </body>"#,
        )
        .await;
        assert_eq!(
            selectors,
            vec![
                "#save",
                "a.nav.link",
                r#"[data-ai-id="ai-interactive-2"]"#,
                r#"[data-ai-id="ai-interactive-3"]"#,
            ]
        );
    }

    #[tokio::test]
    async fn test_duplicate_and_invalid_ids_fall_through() {
        let (_, selectors) = run(
            r#"<body><button id="x">1</button><button id="x">2</button><button id="1st">3</button></body>"#,
        )
        .await;
        assert!(selectors.iter().all(|s| s.starts_with("[data-ai-id=")));
    }

    #[tokio::test]
    async fn test_existing_ai_ids_never_collide() {
        let (_, selectors) = run(
            r#"<body>
                <span data-ai-id="ai-interactive-0">label</span>
                <button>a</button>
                <button data-ai-id="keep-me">b</button>
            </body>"#,
        )
        .await;
        assert_eq!(
            selectors,
            vec![r#"[data-ai-id="ai-interactive-1"]"#, r#"[data-ai-id="keep-me"]"#]
        );
    }

    #[tokio::test]
    async fn test_generated_selectors_resolve_on_live_page() {
        let (page, selectors) = run(
            r#"<body><div><a>1</a><a>2</a></div><p><input><input></p></body>"#,
        )
        .await;
        let live = page.snapshot();
        for selector in &selectors {
            let matches = live.query(selector).expect("valid selector");
            assert_eq!(matches.len(), 1, "{selector}");
        }
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("login"));
        assert!(is_identifier("_x-1"));
        assert!(is_identifier("-a"));
        assert!(!is_identifier("1a"));
        assert!(!is_identifier("-1"));
        assert!(!is_identifier("a b"));
        assert!(!is_identifier("a:b"));
        assert!(!is_identifier(""));
    }
}
