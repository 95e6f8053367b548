//! WebSocket transport layer.
//!
//! This module isolates the socket from the reconnect state machine so the
//! state machine only ever sees a small set of events.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐  connect(url)   ┌──────────────┐
//! │ StreamConnection │────────────────►│  Connector   │
//! │   (run loop)     │                 └──────┬───────┘
//! │                  │  next_event()          │ creates
//! │                  │◄────────────────┌──────▼───────┐      WebSocket
//! │                  │  close()        │  Transport   │◄───────────────► server
//! │                  │────────────────►└──────────────┘
//! └──────────────────┘
//! ```
//!
//! A successful [`Connector::connect`] is the *open* event; afterwards the
//! transport yields [`TransportEvent::Message`], [`TransportEvent::Error`]
//! and finally [`TransportEvent::Closed`].
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `websocket` | tokio-tungstenite implementation |

// ============================================================================
// Submodules
// ============================================================================

/// tokio-tungstenite connector and transport.
pub mod websocket;

#[cfg(test)]
pub(crate) mod mock;

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;

use crate::error::{Error, Result};

// ============================================================================
// Re-exports
// ============================================================================

pub use websocket::{WsConnector, WsTransport};

// ============================================================================
// Payload
// ============================================================================

/// Body of an inbound data frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Text frame.
    Text(String),
    /// Binary frame.
    Binary(Vec<u8>),
}

impl Payload {
    /// Converts the payload to a string.
    ///
    /// Binary payloads are decoded as UTF-8, invalid sequences replaced by
    /// `U+FFFD`.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Binary(bytes) => match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
            },
        }
    }

    /// Returns the payload length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Text(text) => text.len(),
            Self::Binary(bytes) => bytes.len(),
        }
    }

    /// Returns `true` if the payload is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// TransportEvent
// ============================================================================

/// Events produced by an open transport.
#[derive(Debug)]
pub enum TransportEvent {
    /// A data frame arrived.
    Message(Payload),
    /// The transport failed. A [`TransportEvent::Closed`] may or may not follow.
    Error(Error),
    /// The transport is closed. No further events follow.
    Closed,
}

// ============================================================================
// Traits
// ============================================================================

/// Opens transports to a URL.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Opens a new transport.
    ///
    /// # Errors
    ///
    /// Any error is treated by the stream as an error event on the attempt,
    /// followed by a close.
    async fn connect(&self, url: &str) -> Result<Box<dyn Transport>>;
}

/// One open connection.
#[async_trait]
pub trait Transport: Send {
    /// Waits for the next event.
    ///
    /// Must be cancel-safe: the stream polls it inside `tokio::select!`.
    async fn next_event(&mut self) -> TransportEvent;

    /// Requests the connection to close.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the connection is already gone,
    /// or another error if the close frame could not be sent.
    async fn close(&mut self) -> Result<()>;
}

// ============================================================================
// Tests
// ============================================================================
