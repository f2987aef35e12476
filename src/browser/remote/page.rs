//! Page access through injected scripts.
//!
//! Each [`PageContext`] call runs one `scripting.executeScript` in the tab's
//! main frame. The scripts are self-contained functions; their arguments
//! travel as JSON.

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::trace;

use crate::capture::page::PageContext;
use crate::dom::{Document, SerializedNode};
use crate::error::{Error, Result};
use crate::identifiers::TabId;

use super::RemoteHost;

// ============================================================================
// Scripts
// ============================================================================

/// Serializes `<body>` with each element's computed cursor.
const SERIALIZE_BODY: &str = r"() => {
  const walk = (node) => {
    switch (node.nodeType) {
      case Node.TEXT_NODE:
        return { text: node.nodeValue };
      case Node.COMMENT_NODE:
        return { comment: node.nodeValue };
      case Node.ELEMENT_NODE: {
        const children = [];
        for (const child of node.childNodes) {
          const out = walk(child);
          if (out) children.push(out);
        }
        return {
          tag: node.localName,
          attrs: Array.from(node.attributes, (a) => [a.name, a.value]),
          cursor: getComputedStyle(node).cursor,
          children,
        };
      }
      default:
        return null;
    }
  };
  return document.body ? walk(document.body) : null;
}";

const INNER_TEXT: &str = r"() => (document.body ? document.body.innerText : '')";

/// Live match count per selector, `null` for selectors that throw.
const COUNT_MATCHES: &str = r"(selectors) => selectors.map((s) => {
  try {
    return document.querySelectorAll(s).length;
  } catch (e) {
    return null;
  }
})";

const TAG_ELEMENTS: &str = r"(attribute, tags) => {
  const all = document.body ? document.body.querySelectorAll('*') : [];
  for (const [index, value] of tags) {
    const el = all[index];
    if (el) el.setAttribute(attribute, value);
  }
  return true;
}";

// ============================================================================
// ScriptedPage
// ============================================================================

/// A live tab seen through the bridge's script injection.
pub struct ScriptedPage {
    host: RemoteHost,
    tab_id: TabId,
}

impl ScriptedPage {
    pub(crate) fn new(host: RemoteHost, tab_id: TabId) -> Self {
        Self { host, tab_id }
    }

    async fn run(&self, name: &'static str, script: &str, args: Vec<Value>) -> Result<Value> {
        trace!(tab_id = %self.tab_id, script = name, "Executing page script");
        self.host.execute_script(self.tab_id, script, args).await
    }
}

#[async_trait]
impl PageContext for ScriptedPage {
    async fn body(&self) -> Result<Document> {
        let value = self.run("serializeBody", SERIALIZE_BODY, Vec::new()).await?;
        let root: Option<SerializedNode> = serde_json::from_value(value)?;
        Ok(root.map_or_else(Document::empty_body, Document::from_serialized))
    }

    async fn inner_text(&self) -> Result<String> {
        match self.run("innerText", INNER_TEXT, Vec::new()).await? {
            Value::String(text) => Ok(text),
            Value::Null => Ok(String::new()),
            other => Err(Error::script_error(format!("innerText returned {other}"))),
        }
    }

    async fn count_matches(&self, selectors: &[String]) -> Result<Vec<Option<usize>>> {
        let value = self
            .run("countMatches", COUNT_MATCHES, vec![json!(selectors)])
            .await?;
        let counts: Vec<Option<usize>> = serde_json::from_value(value)?;
        if counts.len() != selectors.len() {
            return Err(Error::script_error(format!(
                "expected {} counts, got {}",
                selectors.len(),
                counts.len()
            )));
        }
        Ok(counts)
    }

    async fn tag_elements(&self, attribute: &str, tags: &[(usize, String)]) -> Result<()> {
        self.run("tagElements", TAG_ELEMENTS, vec![json!(attribute), json!(tags)])
            .await
            .map(drop)
    }
}
