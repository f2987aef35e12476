//! In-memory browser host for tests.
//!
//! Tabs are [`StaticPage`]s. Automation commands are answered from the
//! page's document with scraper's selector matching, and every call is
//! recorded. An element's box comes from a `data-box="x,y,w,h"` attribute;
//! elements without one have no box model.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::{Value, json};

use crate::browser::host::{BrowserHost, TabInfo};
use crate::capture::page::{PageContext, StaticPage};
use crate::dom::{Document, NodeKey};
use crate::error::{Error, Result};
use crate::identifiers::{NodeId, TabId};
use crate::protocol::{Command, DomCommand, PageCommand};

// ============================================================================
// Types
// ============================================================================

/// How `attach` responds.
#[derive(Debug, Clone, Default)]
pub(crate) enum AttachBehavior {
    #[default]
    Attach,
    AlreadyAttached,
    Fail(String),
}

/// A valid PNG signature, base64 encoded.
pub(crate) const SCREENSHOT_DATA: &str = "iVBORw0KGgo=";

struct FakeTab {
    info: TabInfo,
    page: Arc<StaticPage>,
}

#[derive(Default)]
struct State {
    tabs: Vec<FakeTab>,
    active: Option<TabId>,
    attach: AttachBehavior,
    fail_detach: bool,
    fail_tabs: bool,
    failing_method: Option<String>,
    hanging_method: Option<String>,
    navigation_error: Option<String>,
    unreadable: FxHashSet<TabId>,
    attached_now: usize,
    attach_count: usize,
    detach_count: usize,
    commands: Vec<(TabId, Command)>,
    nodes: Vec<(TabId, NodeKey)>,
    searches: FxHashMap<String, (TabId, Vec<NodeKey>)>,
    next_search: usize,
}

impl State {
    fn tab(&self, tab_id: TabId) -> Result<&FakeTab> {
        self.tabs
            .iter()
            .find(|t| t.info.id == tab_id)
            .ok_or_else(|| Error::tab_not_found(tab_id))
    }

    fn node(&self, tab_id: TabId, node_id: NodeId) -> Result<NodeKey> {
        usize::try_from(node_id.as_i64() - 1)
            .ok()
            .and_then(|i| self.nodes.get(i))
            .filter(|(tab, _)| *tab == tab_id)
            .map(|(_, key)| *key)
            .ok_or_else(|| Error::command("DOM", format!("No node with given id: {node_id}")))
    }

    fn register(&mut self, tab_id: TabId, key: NodeKey) -> NodeId {
        self.nodes.push((tab_id, key));
        NodeId::new(self.nodes.len() as i64)
    }
}

/// Test double for [`BrowserHost`].
pub(crate) struct FakeHost {
    state: Mutex<State>,
}

// ============================================================================
// Setup and inspection
// ============================================================================

impl FakeHost {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State::default()),
        })
    }

    /// One active tab titled `Tab {id}` at `https://example.com/{id}`.
    pub(crate) fn with_page(id: u32, html: &str) -> Arc<Self> {
        let host = Self::new();
        host.add_tab(id, &format!("Tab {id}"), &format!("https://example.com/{id}"), html);
        host.set_active(Some(id));
        host
    }

    pub(crate) fn add_tab(&self, id: u32, title: &str, url: &str, html: &str) {
        let Some(tab_id) = TabId::new(id) else {
            return;
        };
        self.state.lock().tabs.push(FakeTab {
            info: TabInfo::new(tab_id).with_title(title).with_url(url),
            page: Arc::new(StaticPage::from_html(html)),
        });
    }

    pub(crate) fn set_active(&self, id: Option<u32>) {
        self.state.lock().active = id.and_then(TabId::new);
    }

    pub(crate) fn set_attach_behavior(&self, behavior: AttachBehavior) {
        self.state.lock().attach = behavior;
    }

    pub(crate) fn fail_detach(&self, fail: bool) {
        self.state.lock().fail_detach = fail;
    }

    pub(crate) fn fail_tab_queries(&self, fail: bool) {
        self.state.lock().fail_tabs = fail;
    }

    /// Makes every command with this method fail.
    pub(crate) fn fail_method(&self, method: &str) {
        self.state.lock().failing_method = Some(method.to_string());
    }

    /// Makes every command with this method stay pending forever.
    pub(crate) fn hang_method(&self, method: &str) {
        self.state.lock().hanging_method = Some(method.to_string());
    }

    pub(crate) fn fail_navigation(&self, error_text: &str) {
        self.state.lock().navigation_error = Some(error_text.to_string());
    }

    /// Makes the page of a tab unreadable, like a privileged page.
    pub(crate) fn make_unreadable(&self, id: u32) {
        if let Some(tab_id) = TabId::new(id) {
            self.state.lock().unreadable.insert(tab_id);
        }
    }

    pub(crate) fn attach_count(&self) -> usize {
        self.state.lock().attach_count
    }

    pub(crate) fn detach_count(&self) -> usize {
        self.state.lock().detach_count
    }

    pub(crate) fn attached_now(&self) -> usize {
        self.state.lock().attached_now
    }

    pub(crate) fn open_searches(&self) -> usize {
        self.state.lock().searches.len()
    }

    /// Commands sent so far, in order.
    pub(crate) fn commands(&self) -> Vec<Command> {
        self.state.lock().commands.iter().map(|(_, c)| c.clone()).collect()
    }

    pub(crate) fn methods(&self) -> Vec<&'static str> {
        self.state.lock().commands.iter().map(|(_, c)| c.method()).collect()
    }

    /// Current live document of a tab.
    pub(crate) fn live(&self, id: u32) -> Option<Document> {
        let tab_id = TabId::new(id)?;
        let state = self.state.lock();
        state.tab(tab_id).ok().map(|t| t.page.snapshot())
    }

    pub(crate) fn tab_url(&self, id: u32) -> Option<String> {
        let tab_id = TabId::new(id)?;
        let state = self.state.lock();
        state.tab(tab_id).ok().and_then(|t| t.info.url.clone())
    }
}

// ============================================================================
// Command handling
// ============================================================================

impl FakeHost {
    fn answer(state: &mut State, tab_id: TabId, command: &Command) -> Result<Value> {
        let doc = state.tab(tab_id)?.page.snapshot();

        match command {
            Command::Dom(dom) => Self::answer_dom(state, tab_id, &doc, dom),
            Command::Input(_) => Ok(json!({})),
            Command::Page(page) => Self::answer_page(state, tab_id, page),
        }
    }

    fn answer_dom(
        state: &mut State,
        tab_id: TabId,
        doc: &Document,
        command: &DomCommand,
    ) -> Result<Value> {
        match command {
            DomCommand::Enable | DomCommand::ScrollIntoViewIfNeeded { .. } => Ok(json!({})),
            DomCommand::GetDocument => {
                let root = state.register(tab_id, doc.root());
                Ok(json!({"root": {"nodeId": root, "nodeName": "BODY"}}))
            }
            DomCommand::PerformSearch { query, .. } => {
                let matches = doc
                    .query(query)
                    .map_err(|e| Error::command("DOM.performSearch", e.to_string()))?;
                let search_id = format!("search-{}", state.next_search);
                state.next_search += 1;
                let count = matches.len();
                state.searches.insert(search_id.clone(), (tab_id, matches));
                Ok(json!({"searchId": search_id, "resultCount": count}))
            }
            DomCommand::GetSearchResults {
                search_id,
                from_index,
                to_index,
            } => {
                let keys: Vec<NodeKey> = state
                    .searches
                    .get(search_id)
                    .map(|(_, keys)| {
                        keys.iter()
                            .skip(*from_index as usize)
                            .take(to_index.saturating_sub(*from_index) as usize)
                            .copied()
                            .collect()
                    })
                    .ok_or_else(|| Error::command("DOM.getSearchResults", "unknown search"))?;
                let ids: Vec<NodeId> = keys.into_iter().map(|k| state.register(tab_id, k)).collect();
                Ok(json!({"nodeIds": ids}))
            }
            DomCommand::DiscardSearchResults { search_id } => {
                state.searches.remove(search_id);
                Ok(json!({}))
            }
            DomCommand::DescribeNode { node_id } => {
                let key = state.node(tab_id, *node_id)?;
                let el = doc
                    .element(key)
                    .ok_or_else(|| Error::command("DOM.describeNode", "not an element"))?;
                Ok(json!({"node": {
                    "nodeId": node_id,
                    "nodeName": el.name().to_uppercase(),
                    "localName": el.name(),
                    "attributes": flat_attributes(doc, key),
                }}))
            }
            DomCommand::GetAttributes { node_id } => {
                let key = state.node(tab_id, *node_id)?;
                Ok(json!({"attributes": flat_attributes(doc, key)}))
            }
            DomCommand::GetBoxModel { node_id } => {
                let key = state.node(tab_id, *node_id)?;
                let bbox = doc
                    .element(key)
                    .and_then(|el| el.attr("data-box"))
                    .and_then(parse_box)
                    .ok_or_else(|| {
                        Error::command("DOM.getBoxModel", "Could not compute box model.")
                    })?;
                let [x, y, w, h] = bbox;
                Ok(json!({"model": {
                    "content": [x, y, x + w, y, x + w, y + h, x, y + h],
                    "width": w,
                    "height": h,
                }}))
            }
            DomCommand::GetOuterHtml { node_id } => {
                let key = state.node(tab_id, *node_id)?;
                Ok(json!({"outerHTML": doc.outer_html(key)}))
            }
        }
    }

    fn answer_page(state: &mut State, tab_id: TabId, command: &PageCommand) -> Result<Value> {
        match command {
            PageCommand::Enable => Ok(json!({})),
            PageCommand::GetLayoutMetrics => Ok(json!({
                "layoutViewport": {"pageX": 0, "pageY": 0, "clientWidth": 1280, "clientHeight": 720}
            })),
            PageCommand::Navigate { url } => {
                if let Some(error_text) = state.navigation_error.clone() {
                    return Ok(json!({"frameId": "main", "errorText": error_text}));
                }
                if let Some(tab) = state.tabs.iter_mut().find(|t| t.info.id == tab_id) {
                    tab.info.url = Some(url.clone());
                }
                Ok(json!({"frameId": "main", "loaderId": "l1"}))
            }
            PageCommand::CaptureScreenshot { .. } => Ok(json!({"data": SCREENSHOT_DATA})),
        }
    }
}

fn flat_attributes(doc: &Document, key: NodeKey) -> Vec<String> {
    doc.element(key)
        .map(|el| {
            el.attrs()
                .flat_map(|(name, value)| [name.to_string(), value.to_string()])
                .collect()
        })
        .unwrap_or_default()
}

fn parse_box(raw: &str) -> Option<[f64; 4]> {
    let values: Vec<f64> = raw
        .split(',')
        .map(|v| v.trim().parse().ok())
        .collect::<Option<_>>()?;
    values.try_into().ok()
}

// ============================================================================
// BrowserHost
// ============================================================================

#[async_trait]
impl BrowserHost for FakeHost {
    async fn all_tabs(&self) -> Result<Vec<TabInfo>> {
        let state = self.state.lock();
        if state.fail_tabs {
            return Err(Error::connection("bridge unavailable"));
        }
        Ok(state.tabs.iter().map(|t| t.info.clone()).collect())
    }

    async fn active_tab(&self) -> Result<Option<TabInfo>> {
        let state = self.state.lock();
        if state.fail_tabs {
            return Err(Error::connection("bridge unavailable"));
        }
        Ok(state
            .active
            .and_then(|id| state.tab(id).ok())
            .map(|t| t.info.clone()))
    }

    async fn get_tab(&self, tab_id: TabId) -> Result<TabInfo> {
        let state = self.state.lock();
        state.tab(tab_id).map(|t| t.info.clone())
    }

    async fn page(&self, tab_id: TabId) -> Result<Arc<dyn PageContext>> {
        let state = self.state.lock();
        if state.unreadable.contains(&tab_id) {
            return Err(Error::script_error("Cannot access contents of the page"));
        }
        let page: Arc<dyn PageContext> = state.tab(tab_id)?.page.clone();
        Ok(page)
    }

    async fn attach(&self, tab_id: TabId) -> Result<()> {
        let mut state = self.state.lock();
        state.tab(tab_id)?;
        state.attach_count += 1;
        match state.attach.clone() {
            AttachBehavior::Attach => {
                state.attached_now += 1;
                Ok(())
            }
            AttachBehavior::AlreadyAttached => {
                state.attached_now += 1;
                Err(Error::AlreadyAttached { tab_id })
            }
            AttachBehavior::Fail(message) => Err(Error::attach(tab_id, message)),
        }
    }

    async fn detach(&self, _tab_id: TabId) -> Result<()> {
        let mut state = self.state.lock();
        state.detach_count += 1;
        state.attached_now = state.attached_now.saturating_sub(1);
        if state.fail_detach {
            return Err(Error::command("debugger.detach", "Debugger is not attached"));
        }
        Ok(())
    }

    async fn send_command(&self, tab_id: TabId, command: Command) -> Result<Value> {
        {
            let mut state = self.state.lock();
            state.commands.push((tab_id, command.clone()));
            if state.failing_method.as_deref() == Some(command.method()) {
                return Err(Error::command(command.method(), "Target closed"));
            }
            if state.hanging_method.as_deref() != Some(command.method()) {
                return Self::answer(&mut state, tab_id, &command);
            }
        }
        std::future::pending().await
    }
}
