//! Automation session management.
//!
//! A session wraps one attach/detach cycle of a tab's automation channel.
//! [`SessionManager::with_session`] guarantees the channel is released
//! exactly once, whatever the body does and even when the caller drops the
//! session future, and optionally serializes all sessions of one tab.

// ============================================================================
// Imports
// ============================================================================

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, warn};

use crate::error::Result;
use crate::identifiers::TabId;
use crate::protocol::Command;

use super::host::BrowserHost;

// ============================================================================
// Session
// ============================================================================

/// Handle to an attached automation channel.
///
/// Only valid inside the [`SessionManager::with_session`] body that
/// produced it.
#[derive(Clone)]
pub struct Session {
    host: Arc<dyn BrowserHost>,
    tab_id: TabId,
}

impl Session {
    /// Tab this session is bound to.
    #[inline]
    #[must_use]
    pub fn tab_id(&self) -> TabId {
        self.tab_id
    }

    /// Sends a command and returns its raw result.
    ///
    /// # Errors
    ///
    /// Propagates host and channel failures.
    pub async fn send(&self, command: impl Into<Command>) -> Result<Value> {
        let command = command.into();
        debug!(tab_id = %self.tab_id, method = command.method(), "Sending command");
        self.host.send_command(self.tab_id, command).await
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("tab_id", &self.tab_id)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Lease
// ============================================================================

/// Per-tab locks, present while a session on the tab is open or queued.
type LockMap = Mutex<FxHashMap<TabId, Arc<AsyncMutex<()>>>>;

/// Release duty of one session: the tab's lock slot and, once attach has
/// started, the detach.
///
/// Dropped before [`Lease::release`] ran, the session future was cancelled;
/// detach then runs on a spawned task.
struct Lease {
    host: Arc<dyn BrowserHost>,
    locks: Arc<LockMap>,
    tab_id: TabId,
    slot: Option<OwnedMutexGuard<()>>,
    needs_detach: bool,
}

impl Lease {
    fn new(host: Arc<dyn BrowserHost>, locks: Arc<LockMap>, tab_id: TabId) -> Self {
        Self {
            host,
            locks,
            tab_id,
            slot: None,
            needs_detach: false,
        }
    }

    async fn release(mut self) {
        if self.needs_detach {
            self.needs_detach = false;
            detach(self.host.as_ref(), self.tab_id).await;
        }
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        let slot = self.slot.take();
        let locks = Arc::clone(&self.locks);
        let tab_id = self.tab_id;

        if !self.needs_detach {
            drop(slot);
            forget_idle(&locks, tab_id);
            return;
        }

        warn!(tab_id = %tab_id, "Session cancelled, detaching in background");
        let host = Arc::clone(&self.host);
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    detach(host.as_ref(), tab_id).await;
                    drop(slot);
                    forget_idle(&locks, tab_id);
                });
            }
            Err(_) => {
                warn!(tab_id = %tab_id, "No runtime left to detach on");
                drop(slot);
                forget_idle(&locks, tab_id);
            }
        }
    }
}

async fn detach(host: &dyn BrowserHost, tab_id: TabId) {
    if let Err(e) = host.detach(tab_id).await {
        warn!(tab_id = %tab_id, error = %e, "Failed to detach");
    }
}

fn forget_idle(locks: &LockMap, tab_id: TabId) {
    let mut locks = locks.lock();
    if locks.get(&tab_id).is_some_and(|l| Arc::strong_count(l) == 1) {
        locks.remove(&tab_id);
    }
}

// ============================================================================
// SessionManager
// ============================================================================

/// Opens and releases sessions on a [`BrowserHost`].
pub struct SessionManager {
    host: Arc<dyn BrowserHost>,
    locks: Arc<LockMap>,
    serialize: bool,
}

impl SessionManager {
    /// Creates a manager. With `serialize` set, sessions on the same tab
    /// never overlap.
    #[must_use]
    pub fn new(host: Arc<dyn BrowserHost>, serialize: bool) -> Self {
        Self {
            host,
            locks: Arc::new(Mutex::new(FxHashMap::default())),
            serialize,
        }
    }

    /// The underlying host.
    #[inline]
    #[must_use]
    pub fn host(&self) -> &Arc<dyn BrowserHost> {
        &self.host
    }

    /// Runs `body` inside an attached session on `tab_id`.
    ///
    /// An already-attached channel counts as attached. Detach is attempted
    /// exactly once after the body, and also after a failed attach or a
    /// cancelled session. Detach failures are logged and never replace the
    /// body's outcome.
    ///
    /// # Errors
    ///
    /// Returns the attach error, or whatever `body` returns.
    pub async fn with_session<F, Fut, T>(&self, tab_id: TabId, body: F) -> Result<T>
    where
        F: FnOnce(Session) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut lease = Lease::new(Arc::clone(&self.host), Arc::clone(&self.locks), tab_id);
        if self.serialize {
            lease.slot = Some(self.lock_for(tab_id).lock_owned().await);
        }

        lease.needs_detach = true;
        let outcome = match self.host.attach(tab_id).await {
            Ok(()) => self.run(tab_id, body).await,
            Err(e) if e.is_already_attached() => {
                debug!(tab_id = %tab_id, "Channel already attached");
                self.run(tab_id, body).await
            }
            Err(e) => Err(e),
        };

        lease.release().await;
        outcome
    }

    async fn run<F, Fut, T>(&self, tab_id: TabId, body: F) -> Result<T>
    where
        F: FnOnce(Session) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let session = Session {
            host: Arc::clone(&self.host),
            tab_id,
        };
        body(session).await
    }

    fn lock_for(&self, tab_id: TabId) -> Arc<AsyncMutex<()>> {
        Arc::clone(self.locks.lock().entry(tab_id).or_default())
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("serialize", &self.serialize)
            .field("open_tabs", &self.locks.lock().len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
