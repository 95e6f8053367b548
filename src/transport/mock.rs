//! Scripted in-memory transport for state machine tests.
//!
//! Each successful connect hands the test a [`MockPeer`] that plays the
//! server side: it pushes events into the transport and observes whether
//! the stream requested a close.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::{Error, Result};

use super::{Connector, Payload, Transport, TransportEvent};

// ============================================================================
// MockConnector
// ============================================================================

/// Connector whose attempts are driven by the test.
pub(crate) struct MockConnector {
    peers: mpsc::UnboundedSender<MockPeer>,
    attempts: Arc<AtomicUsize>,
    refuse: Arc<AtomicBool>,
    hang_close: Arc<AtomicBool>,
}

impl MockConnector {
    /// Creates a connector and the receiver of one peer per accepted attempt.
    pub(crate) fn new() -> (Self, MockServer) {
        let (peers_tx, peers_rx) = mpsc::unbounded_channel();
        let attempts = Arc::new(AtomicUsize::new(0));
        let refuse = Arc::new(AtomicBool::new(false));
        let hang_close = Arc::new(AtomicBool::new(false));

        let connector = Self {
            peers: peers_tx,
            attempts: Arc::clone(&attempts),
            refuse: Arc::clone(&refuse),
            hang_close: Arc::clone(&hang_close),
        };
        let server = MockServer {
            peers: peers_rx,
            attempts,
            refuse,
            hang_close,
        };

        (connector, server)
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, _url: &str) -> Result<Box<dyn Transport>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if self.refuse.load(Ordering::SeqCst) {
            return Err(Error::connection("connection refused"));
        }

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let close_requested = Arc::new(AtomicBool::new(false));

        let peer = MockPeer {
            events: events_tx,
            close_requested: Arc::clone(&close_requested),
        };
        self.peers
            .send(peer)
            .map_err(|_| Error::connection("mock server dropped"))?;

        Ok(Box::new(MockTransport {
            events: events_rx,
            close_requested,
            hang_close: Arc::clone(&self.hang_close),
        }))
    }
}

// ============================================================================
// MockServer
// ============================================================================

/// Test-side view of the connector.
pub(crate) struct MockServer {
    peers: mpsc::UnboundedReceiver<MockPeer>,
    attempts: Arc<AtomicUsize>,
    refuse: Arc<AtomicBool>,
    hang_close: Arc<AtomicBool>,
}

impl MockServer {
    /// Waits for the next accepted attempt.
    pub(crate) async fn accept(&mut self) -> MockPeer {
        self.peers.recv().await.expect("connector dropped")
    }

    /// Returns the next accepted attempt if one is already queued.
    pub(crate) fn try_accept(&mut self) -> Option<MockPeer> {
        self.peers.try_recv().ok()
    }

    /// Number of connect calls so far, refused ones included.
    pub(crate) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Makes subsequent connects fail.
    pub(crate) fn set_refuse(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }

    /// Makes close requests hang until the stream's close timeout.
    pub(crate) fn set_hang_close(&self, hang: bool) {
        self.hang_close.store(hang, Ordering::SeqCst);
    }
}

// ============================================================================
// MockPeer
// ============================================================================

/// Server side of one mock attempt.
pub(crate) struct MockPeer {
    events: mpsc::UnboundedSender<TransportEvent>,
    close_requested: Arc<AtomicBool>,
}

impl MockPeer {
    /// Sends a text frame. Silently lost if the stream let go of the transport.
    pub(crate) fn send_text(&self, text: &str) {
        let _ = self
            .events
            .send(TransportEvent::Message(Payload::Text(text.to_owned())));
    }

    /// Sends a binary frame.
    pub(crate) fn send_binary(&self, bytes: &[u8]) {
        let _ = self
            .events
            .send(TransportEvent::Message(Payload::Binary(bytes.to_vec())));
    }

    /// Reports a transport error.
    pub(crate) fn fail(&self, message: &str) {
        let _ = self
            .events
            .send(TransportEvent::Error(Error::connection(message)));
    }

    /// Closes the connection from the server side.
    pub(crate) fn close(&self) {
        let _ = self.events.send(TransportEvent::Closed);
    }

    /// Whether the stream asked this transport to close.
    pub(crate) fn close_requested(&self) -> bool {
        self.close_requested.load(Ordering::SeqCst)
    }

    /// Whether the stream still holds this transport.
    pub(crate) fn is_held(&self) -> bool {
        !self.events.is_closed()
    }
}

// ============================================================================
// MockTransport
// ============================================================================

struct MockTransport {
    events: mpsc::UnboundedReceiver<TransportEvent>,
    close_requested: Arc<AtomicBool>,
    hang_close: Arc<AtomicBool>,
}

#[async_trait]
impl Transport for MockTransport {
    async fn next_event(&mut self) -> TransportEvent {
        self.events.recv().await.unwrap_or(TransportEvent::Closed)
    }

    async fn close(&mut self) -> Result<()> {
        if self.close_requested.swap(true, Ordering::SeqCst) {
            return Err(Error::ConnectionClosed);
        }
        if self.hang_close.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        Ok(())
    }
}
