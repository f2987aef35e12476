//! [`BrowserHost`] over the extension bridge.
//!
//! Every host capability is one bridge request:
//!
//! | Capability | Bridge method |
//! |------------|---------------|
//! | `all_tabs`, `active_tab` | `tabs.query` |
//! | `get_tab` | `tabs.get` |
//! | `page` | `scripting.executeScript` (per page call) |
//! | `attach` / `detach` | `debugger.attach` / `debugger.detach` |
//! | `send_command` | `debugger.sendCommand` |
//!
//! Error responses are mapped onto the crate's error taxonomy: an attach
//! refused because a debugger is already present becomes
//! [`Error::AlreadyAttached`], a missing tab [`Error::TabNotFound`], and a
//! failed automation command [`Error::Command`].

// ============================================================================
// Submodules
// ============================================================================

/// Page access through injected scripts.
pub mod page;

// ============================================================================
// Imports
// ============================================================================

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::capture::page::PageContext;
use crate::error::{Error, Result};
use crate::identifiers::TabId;
use crate::protocol::{BridgeCommand, Command, Request};
use crate::transport::{Connection, PendingServer, ReadyData};

use super::host::{BrowserHost, TabInfo};

pub use page::ScriptedPage;

// ============================================================================
// RemoteHost
// ============================================================================

/// The browser as reached through the extension's WebSocket connection.
#[derive(Clone)]
pub struct RemoteHost {
    connection: Connection,
}

impl RemoteHost {
    /// Wraps an established connection.
    #[inline]
    #[must_use]
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    /// Binds `ip:port`, waits for the extension and completes the handshake.
    ///
    /// # Errors
    ///
    /// Binding, accept and handshake failures of [`PendingServer`].
    pub async fn listen(ip: IpAddr, port: u16) -> Result<(Self, ReadyData)> {
        let server = PendingServer::bind(ip, port).await?;
        info!(url = %server.ws_url(), "Waiting for the extension");
        let (connection, ready) = server.accept().await?;
        Ok((Self::new(connection), ready))
    }

    /// The underlying connection.
    #[inline]
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Closes the bridge.
    pub fn shutdown(&self) {
        self.connection.shutdown();
    }

    /// Sends one bridge command and returns its result, or the error
    /// message of an error response.
    async fn call(&self, command: BridgeCommand) -> std::result::Result<Value, CallError> {
        let method = command.method();
        let response = self.connection.send(Request::new(command)).await?;
        match response.error_message() {
            None => Ok(response.result.unwrap_or(Value::Null)),
            Some(message) => {
                debug!(method, %message, "Bridge call refused");
                Err(CallError::Refused(message))
            }
        }
    }

    pub(crate) async fn execute_script(
        &self,
        tab_id: TabId,
        script: &str,
        args: Vec<Value>,
    ) -> Result<Value> {
        self.call(BridgeCommand::ExecuteScript {
            tab_id,
            script: script.to_string(),
            args,
        })
        .await
        .map_err(|e| e.into_error(Error::script_error))
    }

    async fn query_tabs(&self, active_only: bool) -> Result<Vec<TabInfo>> {
        let command = if active_only {
            BridgeCommand::TabsQuery {
                active: Some(true),
                current_window: Some(true),
            }
        } else {
            BridgeCommand::TabsQuery {
                active: None,
                current_window: None,
            }
        };
        let value = self.call(command).await.map_err(|e| e.into_error(Error::protocol))?;
        Ok(parse_tabs(value))
    }
}

// ============================================================================
// Error mapping
// ============================================================================

/// Outcome of a failed bridge call before it is given a domain meaning.
enum CallError {
    /// The transport failed.
    Transport(Error),
    /// The extension answered with an error message.
    Refused(String),
}

impl From<Error> for CallError {
    fn from(error: Error) -> Self {
        Self::Transport(error)
    }
}

impl CallError {
    fn into_error(self, refused: impl FnOnce(String) -> Error) -> Error {
        match self {
            Self::Transport(error) => error,
            Self::Refused(message) => refused(message),
        }
    }
}

fn is_already_attached(message: &str) -> bool {
    message.to_ascii_lowercase().contains("already attached")
}

fn is_missing_tab(message: &str) -> bool {
    message.to_ascii_lowercase().contains("no tab with id")
}

/// Tabs the extension reported, skipping entries without a usable id.
fn parse_tabs(value: Value) -> Vec<TabInfo> {
    let Value::Array(items) = value else {
        warn!(value = %value, "Tab list is not an array");
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| {
            let id = item.get("id").cloned().unwrap_or(Value::Null);
            match serde_json::from_value(item) {
                Ok(tab) => Some(tab),
                Err(e) => {
                    warn!(tab_id = %id, error = %e, "Skipping malformed tab");
                    None
                }
            }
        })
        .collect()
}

// ============================================================================
// BrowserHost
// ============================================================================

#[async_trait]
impl BrowserHost for RemoteHost {
    async fn all_tabs(&self) -> Result<Vec<TabInfo>> {
        self.query_tabs(false).await
    }

    async fn active_tab(&self) -> Result<Option<TabInfo>> {
        Ok(self.query_tabs(true).await?.into_iter().next())
    }

    async fn get_tab(&self, tab_id: TabId) -> Result<TabInfo> {
        let value = self
            .call(BridgeCommand::TabsGet { tab_id })
            .await
            .map_err(|e| {
                e.into_error(|message| {
                    if is_missing_tab(&message) {
                        Error::tab_not_found(tab_id)
                    } else {
                        Error::protocol(message)
                    }
                })
            })?;
        if value.is_null() {
            return Err(Error::tab_not_found(tab_id));
        }
        Ok(serde_json::from_value(value)?)
    }

    async fn page(&self, tab_id: TabId) -> Result<Arc<dyn PageContext>> {
        Ok(Arc::new(ScriptedPage::new(self.clone(), tab_id)))
    }

    async fn attach(&self, tab_id: TabId) -> Result<()> {
        self.call(BridgeCommand::attach(tab_id))
            .await
            .map(drop)
            .map_err(|e| {
                e.into_error(|message| {
                    if is_already_attached(&message) {
                        Error::AlreadyAttached { tab_id }
                    } else {
                        Error::attach(tab_id, message)
                    }
                })
            })
    }

    async fn detach(&self, tab_id: TabId) -> Result<()> {
        self.call(BridgeCommand::DebuggerDetach { tab_id })
            .await
            .map(drop)
            .map_err(|e| e.into_error(|message| Error::command("debugger.detach", message)))
    }

    async fn send_command(&self, tab_id: TabId, command: Command) -> Result<Value> {
        let method = command.method();
        self.call(BridgeCommand::DebuggerSendCommand { tab_id, command })
            .await
            .map_err(|e| {
                let error = e.into_error(|message| Error::command(method, message));
                if error.is_connection_error() {
                    warn!(tab_id = %tab_id, method, error = %error, "Bridge lost during command");
                }
                error
            })
    }
}

// ============================================================================
// Tests
// ============================================================================
