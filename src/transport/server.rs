//! WebSocket server the browser extension connects to.
//!
//! # Connection Flow
//!
//! 1. Bind to a local address (`port` 0 picks a free port)
//! 2. The extension is pointed at [`PendingServer::ws_url`]
//! 3. The extension connects and sends READY under the nil request id
//! 4. The returned [`Connection`] is ready for bridge requests

// ============================================================================
// Imports
// ============================================================================

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::connection::{Connection, ReadyData};

// ============================================================================
// Constants
// ============================================================================

/// How long to wait for the extension to connect.
const ACCEPT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// PendingServer
// ============================================================================

/// A bound listener still waiting for the extension.
///
/// # Example
///
/// ```ignore
/// use std::net::{IpAddr, Ipv4Addr};
/// use tabpilot::transport::PendingServer;
///
/// let server = PendingServer::bind(IpAddr::V4(Ipv4Addr::LOCALHOST), 0).await?;
/// println!("point the extension at {}", server.ws_url());
/// let (connection, ready) = server.accept().await?;
/// ```
pub struct PendingServer {
    listener: TcpListener,
    addr: SocketAddr,
}

impl PendingServer {
    /// Binds to `ip:port`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if binding fails.
    pub async fn bind(ip: IpAddr, port: u16) -> Result<Self> {
        let listener = TcpListener::bind(SocketAddr::new(ip, port)).await?;
        let addr = listener.local_addr()?;

        debug!(%addr, "Bridge server bound");
        Ok(Self { listener, addr })
    }

    /// Port the server is bound to.
    #[inline]
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Bound socket address.
    #[inline]
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// `ws://{addr}` URL for the extension.
    #[inline]
    #[must_use]
    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Accepts the extension's connection and completes the READY
    /// handshake.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionTimeout`] if nothing connects within 30s
    /// - [`Error::Connection`] if the WebSocket upgrade fails
    /// - any error of [`Connection::wait_ready`]
    pub async fn accept(self) -> Result<(Connection, ReadyData)> {
        let (stream, peer) = timeout(ACCEPT_TIMEOUT, self.listener.accept())
            .await
            .map_err(|_| Error::connection_timeout(ACCEPT_TIMEOUT.as_millis() as u64))??;
        debug!(%peer, "TCP connection accepted");

        let ws_stream = tokio_tungstenite::accept_async(stream)
            .await
            .map_err(|e| Error::connection(format!("WebSocket upgrade failed: {e}")))?;

        let connection = Connection::new(ws_stream);
        let ready = connection.wait_ready().await?;
        info!(port = self.addr.port(), version = %ready.extension_version, "Extension connected");

        Ok((connection, ready))
    }
}

// ============================================================================
// Tests
// ============================================================================
