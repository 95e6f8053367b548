//! tokio-tungstenite transport.
//!
//! Ping and pong frames are answered by tungstenite itself and never surface
//! as events. A close frame from the peer ends the transport.
//!
//! `wss://` URLs are served by rustls with the webpki root store. The `ring`
//! provider is installed on first connect unless the host installed one.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Once;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, trace};

use crate::error::{Error, Result};

use super::{Connector, Payload, Transport, TransportEvent};

// ============================================================================
// Types
// ============================================================================

/// Client-side WebSocket stream.
type ClientStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ============================================================================
// WsConnector
// ============================================================================

/// Connector opening WebSocket client connections.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn Transport>> {
        install_crypto_provider();

        let (stream, response) = connect_async(url).await?;

        debug!(status = %response.status(), "WebSocket handshake completed");

        Ok(Box::new(WsTransport::new(stream)))
    }
}

// ============================================================================
// WsTransport
// ============================================================================

/// An open WebSocket client connection.
pub struct WsTransport {
    stream: ClientStream,
}

impl WsTransport {
    /// Wraps an established client stream.
    #[inline]
    #[must_use]
    pub fn new(stream: ClientStream) -> Self {
        Self { stream }
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn next_event(&mut self) -> TransportEvent {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    return TransportEvent::Message(Payload::Text(text.as_str().to_owned()));
                }

                Some(Ok(Message::Binary(bytes))) => {
                    return TransportEvent::Message(Payload::Binary(bytes.to_vec()));
                }

                Some(Ok(Message::Close(frame))) => {
                    debug!(?frame, "Close frame received");
                    // Flushes the queued close reply
                    if let Err(e) = self.stream.close(None).await {
                        trace!(error = %e, "Close reply not sent");
                    }
                    return TransportEvent::Closed;
                }

                Some(Ok(other)) => {
                    trace!(kind = ?frame_kind(&other), "Control frame ignored");
                }

                Some(Err(e)) => return TransportEvent::Error(e.into()),

                None => return TransportEvent::Closed,
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.stream.close(None).await.map_err(close_error)
    }
}

/// Maps a failed close request, folding "already closed" into one variant.
fn close_error(error: WsError) -> Error {
    match error {
        WsError::ConnectionClosed | WsError::AlreadyClosed => Error::ConnectionClosed,
        other => other.into(),
    }
}

/// Installs the process-wide rustls provider once.
fn install_crypto_provider() {
    static INSTALL: Once = Once::new();

    INSTALL.call_once(|| {
        // Err means the host already installed its own provider
        if rustls::crypto::ring::default_provider()
            .install_default()
            .is_err()
        {
            debug!("Keeping the host's rustls crypto provider");
        }
    });
}

/// Short name of a frame for tracing.
fn frame_kind(message: &Message) -> &'static str {
    match message {
        Message::Text(_) => "text",
        Message::Binary(_) => "binary",
        Message::Ping(_) => "ping",
        Message::Pong(_) => "pong",
        Message::Close(_) => "close",
        Message::Frame(_) => "frame",
    }
}

// ============================================================================
// Tests
// ============================================================================
