//! WebSocket connection and I/O loop.
//!
//! The connection spawns one tokio task that owns the socket. It writes
//! outgoing requests and routes each incoming response to its waiting
//! caller by request id.
//!
//! The extension never initiates requests of its own; any text frame that is
//! not a response is logged and dropped.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::{from_str, to_string};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::RequestId;
use crate::protocol::{Request, Response};

// ============================================================================
// Constants
// ============================================================================

/// Default timeout for one bridge request.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum in-flight requests before new ones are rejected.
const MAX_PENDING_REQUESTS: usize = 100;

/// Timeout for the READY handshake.
const READY_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Types
// ============================================================================

/// Request id to waiting caller.
type CorrelationMap = FxHashMap<RequestId, oneshot::Sender<Result<Response>>>;

/// What the extension reports in its READY message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyData {
    /// Extension version string, empty if not reported.
    pub extension_version: String,
    /// Browser user agent, empty if not reported.
    pub user_agent: String,
}

/// Internal commands for the I/O loop.
enum LoopCommand {
    Send {
        request: Request,
        response_tx: oneshot::Sender<Result<Response>>,
    },
    /// Drop a timed-out correlation entry.
    Forget(RequestId),
    Shutdown,
}

// ============================================================================
// Connection
// ============================================================================

/// WebSocket link to the browser extension.
///
/// Cheap to clone; clones share the same socket task.
#[derive(Clone)]
pub struct Connection {
    command_tx: mpsc::UnboundedSender<LoopCommand>,
    correlation: Arc<Mutex<CorrelationMap>>,
}

impl Connection {
    /// Wraps an accepted WebSocket stream and spawns its I/O loop.
    pub(crate) fn new(ws_stream: WebSocketStream<TcpStream>) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let correlation = Arc::new(Mutex::new(CorrelationMap::default()));

        tokio::spawn(Self::run_loop(
            ws_stream,
            command_rx,
            Arc::clone(&correlation),
        ));

        Self {
            command_tx,
            correlation,
        }
    }

    /// Waits for the READY message the extension sends right after
    /// connecting, under the nil request id.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionTimeout`] if READY is not received within 30s
    /// - [`Error::ConnectionClosed`] if the socket closes first
    pub async fn wait_ready(&self) -> Result<ReadyData> {
        let (tx, rx) = oneshot::channel();
        self.correlation.lock().insert(RequestId::ready(), tx);

        let response = timeout(READY_TIMEOUT, rx)
            .await
            .map_err(|_| Error::connection_timeout(READY_TIMEOUT.as_millis() as u64))???;

        let ready = ReadyData {
            extension_version: response.get_string("version"),
            user_agent: response.get_string("userAgent"),
        };
        debug!(version = %ready.extension_version, "READY handshake completed");
        Ok(ready)
    }

    /// Sends a request and waits up to 30s for its response.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the connection is closed
    /// - [`Error::RequestTimeout`] if no response arrives in time
    /// - [`Error::Protocol`] if too many requests are pending
    pub async fn send(&self, request: Request) -> Result<Response> {
        self.send_with_timeout(request, DEFAULT_REQUEST_TIMEOUT)
            .await
    }

    /// Sends a request with a custom response timeout.
    ///
    /// # Errors
    ///
    /// As [`send`](Self::send).
    pub async fn send_with_timeout(
        &self,
        request: Request,
        request_timeout: Duration,
    ) -> Result<Response> {
        let request_id = request.id;

        {
            let pending = self.correlation.lock().len();
            if pending >= MAX_PENDING_REQUESTS {
                warn!(pending, max = MAX_PENDING_REQUESTS, "Too many pending requests");
                return Err(Error::protocol(format!(
                    "Too many pending requests: {pending}/{MAX_PENDING_REQUESTS}"
                )));
            }
        }

        let (response_tx, response_rx) = oneshot::channel();
        self.command_tx
            .send(LoopCommand::Send {
                request,
                response_tx,
            })
            .map_err(|_| Error::ConnectionClosed)?;

        match timeout(request_timeout, response_rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(Error::ConnectionClosed),
            Err(_) => {
                let _ = self.command_tx.send(LoopCommand::Forget(request_id));
                Err(Error::request_timeout(
                    request_id,
                    request_timeout.as_millis() as u64,
                ))
            }
        }
    }

    /// Number of requests awaiting a response.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.correlation.lock().len()
    }

    /// Closes the socket. Pending requests fail with
    /// [`Error::ConnectionClosed`].
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(LoopCommand::Shutdown);
    }

    async fn run_loop(
        ws_stream: WebSocketStream<TcpStream>,
        mut command_rx: mpsc::UnboundedReceiver<LoopCommand>,
        correlation: Arc<Mutex<CorrelationMap>>,
    ) {
        let (mut ws_write, mut ws_read) = ws_stream.split();

        loop {
            tokio::select! {
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            Self::route_response(&text, &correlation);
                        }
                        Some(Ok(Message::Close(_))) => {
                            debug!("WebSocket closed by extension");
                            break;
                        }
                        Some(Err(e)) => {
                            error!(error = %e, "WebSocket error");
                            break;
                        }
                        None => {
                            debug!("WebSocket stream ended");
                            break;
                        }
                        // Binary, Ping, Pong
                        _ => {}
                    }
                }

                command = command_rx.recv() => {
                    match command {
                        Some(LoopCommand::Send { request, response_tx }) => {
                            let request_id = request.id;
                            let json = match to_string(&request) {
                                Ok(json) => json,
                                Err(e) => {
                                    let _ = response_tx.send(Err(Error::Json(e)));
                                    continue;
                                }
                            };

                            correlation.lock().insert(request_id, response_tx);
                            if let Err(e) = ws_write.send(Message::Text(json.into())).await
                                && let Some(tx) = correlation.lock().remove(&request_id)
                            {
                                let _ = tx.send(Err(Error::connection(e.to_string())));
                            }
                            trace!(%request_id, method = request.command.method(), "Request sent");
                        }
                        Some(LoopCommand::Forget(request_id)) => {
                            correlation.lock().remove(&request_id);
                            debug!(%request_id, "Removed timed-out correlation");
                        }
                        Some(LoopCommand::Shutdown) => {
                            debug!("Shutdown requested");
                            let _ = ws_write.close().await;
                            break;
                        }
                        None => {
                            debug!("Command channel closed");
                            break;
                        }
                    }
                }
            }
        }

        let pending: Vec<_> = correlation.lock().drain().collect();
        if !pending.is_empty() {
            debug!(count = pending.len(), "Failing pending requests on shutdown");
        }
        for (_, tx) in pending {
            let _ = tx.send(Err(Error::ConnectionClosed));
        }
        debug!("I/O loop terminated");
    }

    fn route_response(text: &str, correlation: &Mutex<CorrelationMap>) {
        match from_str::<Response>(text) {
            Ok(response) => {
                let tx = correlation.lock().remove(&response.id);
                match tx {
                    Some(tx) => {
                        let _ = tx.send(Ok(response));
                    }
                    None => warn!(id = %response.id, "Response for unknown request"),
                }
            }
            Err(e) => warn!(error = %e, text, "Unparseable message from extension"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::identifiers::TabId;
    use crate::protocol::BridgeCommand;

    fn request() -> Request {
        Request::new(BridgeCommand::TabsGet {
            tab_id: TabId::new(1).expect("tab"),
        })
    }

    #[test]
    fn test_constants() {
        assert_eq!(DEFAULT_REQUEST_TIMEOUT.as_secs(), 30);
        assert_eq!(MAX_PENDING_REQUESTS, 100);
        assert_eq!(READY_TIMEOUT.as_secs(), 30);
    }

    #[test]
    fn test_route_response_resolves_waiter() {
        let correlation = Mutex::new(CorrelationMap::default());
        let request = request();
        let (tx, mut rx) = oneshot::channel();
        correlation.lock().insert(request.id, tx);

        let text = format!(r#"{{"id":"{}","type":"success","result":{{"id":1}}}}"#, request.id);
        Connection::route_response(&text, &correlation);

        let response = rx.try_recv().expect("delivered").expect("ok");
        assert!(response.is_success());
        assert!(correlation.lock().is_empty());
    }

    #[test]
    fn test_route_response_ignores_unknown_and_garbage() {
        let correlation = Mutex::new(CorrelationMap::default());
        let (tx, mut rx) = oneshot::channel();
        correlation.lock().insert(RequestId::ready(), tx);

        let other = RequestId::generate();
        Connection::route_response(
            &format!(r#"{{"id":"{other}","type":"success"}}"#),
            &correlation,
        );
        Connection::route_response("not json", &correlation);

        assert!(rx.try_recv().is_err());
        assert_eq!(correlation.lock().len(), 1);
    }
}
