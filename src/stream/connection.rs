//! Stream connection and reconnect loop.
//!
//! # Event Loop
//!
//! [`StreamConnection::start`] spawns one tokio task per stream. The task
//! repeats connect → open → receive* → close cycles and `select!`s, in every
//! phase, on the stop command channel:
//!
//! ```text
//!            ┌────────────┐ connected ┌──────┐ close / error ┌────────┐
//!  start ───►│ Connecting │──────────►│ Open │──────────────►│ Closed │
//!            └─────┬──────┘           └──┬───┘               └───┬────┘
//!                  │ connect error       │ stop                  │ active && reconnect
//!                  └──────────► Closed   └──► close, exit        └──► sleep(delay) ──► Connecting
//! ```
//!
//! The close branch is the single place where reconnecting is decided. A
//! transport error only requests a close and then joins that branch, so one
//! attempt never schedules more than one reconnect.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep, timeout};
use tracing::{Instrument, debug, info_span, trace, warn};

use crate::error::{Error, Result};
use crate::host::{Logger, Sink, StreamRecord};
use crate::identifiers::StreamId;
use crate::transport::{Connector, Payload, Transport, TransportEvent, WsConnector};

use super::config::StreamConfig;
use super::handle::{StreamCommand, StreamHandle};
use super::state::{ConnectionState, SharedState};

// ============================================================================
// Constants
// ============================================================================

/// Logged whenever an attempt ends.
const CLOSED_MESSAGE: &str = "WebSocket connection closed";

// ============================================================================
// AttemptEnd
// ============================================================================

/// How one connect attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttemptEnd {
    /// The transport closed or failed; reconnect may follow.
    Closed,
    /// The stream was stopped during the attempt.
    Stopped,
}

// ============================================================================
// StreamConnection
// ============================================================================

/// A WebSocket stream feeding a host pipeline.
///
/// Owns at most one transport at a time, the reconnect policy and the stop
/// command channel. Only reachable through the [`StreamHandle`] returned by
/// [`start`](Self::start).
pub struct StreamConnection {
    /// Immutable stream configuration.
    config: StreamConfig,
    /// Opens one transport per attempt.
    connector: Arc<dyn Connector>,
    /// Host pipeline.
    sink: Arc<dyn Sink>,
    /// Host logger.
    logger: Arc<dyn Logger>,
    /// State shared with handles.
    shared: Arc<SharedState>,
    /// Commands from handles.
    command_rx: mpsc::UnboundedReceiver<StreamCommand>,
    /// Set to `true` when the task exits. Dropped unset if it panics.
    finished: watch::Sender<bool>,
}

impl StreamConnection {
    /// Starts streaming from `config.url` into `sink`.
    ///
    /// Returns immediately; the first connect attempt runs in the
    /// background. Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] / [`Error::Url`] if the URL is missing or malformed
    /// - [`Error::Runtime`] if no tokio runtime is available
    pub fn start(
        config: StreamConfig,
        sink: impl Sink,
        logger: impl Logger,
    ) -> Result<StreamHandle> {
        Self::start_with_connector(config, WsConnector, sink, logger)
    }

    /// Starts a stream over a custom [`Connector`].
    ///
    /// # Errors
    ///
    /// Same as [`start`](Self::start).
    pub fn start_with_connector(
        config: StreamConfig,
        connector: impl Connector,
        sink: impl Sink,
        logger: impl Logger,
    ) -> Result<StreamHandle> {
        config.validate()?;

        let runtime = Handle::try_current().map_err(|e| {
            Error::runtime(format!("Stream must start inside a tokio runtime: {e}"))
        })?;

        let id = StreamId::generate();
        let shared = Arc::new(SharedState::new());
        let logger: Arc<dyn Logger> = Arc::new(logger);
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (finished_tx, finished_rx) = watch::channel(false);
        let span = info_span!("stream", stream_id = %id, url = %config.url);

        let connection = Self {
            config,
            connector: Arc::new(connector),
            sink: Arc::new(sink),
            logger: Arc::clone(&logger),
            shared: Arc::clone(&shared),
            command_rx,
            finished: finished_tx,
        };

        let task = runtime.spawn(connection.run().instrument(span.clone()));

        Ok(StreamHandle::new(
            id,
            command_tx,
            shared,
            task,
            finished_rx,
            logger,
            span,
        ))
    }

    /// Connection loop: one iteration per attempt.
    async fn run(mut self) {
        debug!("Stream task started");

        while self.shared.is_active() {
            match self.connect_once().await {
                AttemptEnd::Stopped => break,
                AttemptEnd::Closed => {}
            }

            self.shared.set_state(ConnectionState::Closed);
            self.logger.info(CLOSED_MESSAGE);

            if !self.should_reconnect() {
                break;
            }

            debug!(
                delay_ms = self.config.reconnect_delay.as_millis() as u64,
                "Reconnect scheduled"
            );

            if !self.wait_reconnect_delay().await {
                break;
            }
        }

        self.shared.set_state(ConnectionState::Closed);
        debug!(attempts = self.shared.attempts(), "Stream task finished");
        self.finished.send_replace(true);
    }

    /// Reconnect decision, evaluated once per ended attempt.
    fn should_reconnect(&self) -> bool {
        if !self.shared.is_active() {
            debug!("Stream stopped, not reconnecting");
            return false;
        }
        if !self.config.reconnect {
            debug!("Reconnect disabled, stream finished");
            return false;
        }
        true
    }

    /// Waits out the reconnect delay.
    ///
    /// Returns `false` if the stream was stopped meanwhile.
    async fn wait_reconnect_delay(&mut self) -> bool {
        tokio::select! {
            biased;

            command = self.command_rx.recv() => {
                self.on_stop(command);
                false
            }

            () = sleep(self.config.reconnect_delay) => self.shared.is_active(),
        }
    }

    /// Runs one attempt from connect to close.
    async fn connect_once(&mut self) -> AttemptEnd {
        let attempt = self.shared.begin_attempt();
        debug!(attempt, "Connecting");

        let connect_timeout = self.config.connect_timeout;
        let connected = tokio::select! {
            biased;

            command = self.command_rx.recv() => {
                self.on_stop(command);
                return AttemptEnd::Stopped;
            }

            result = timeout(connect_timeout, self.connector.connect(&self.config.url)) => {
                result.unwrap_or_else(|_| {
                    Err(Error::connection_timeout(connect_timeout.as_millis() as u64))
                })
            }
        };

        let mut transport = match connected {
            Ok(transport) => transport,
            Err(e) => {
                self.logger.error(&format!("WebSocket error: {e}"));
                return AttemptEnd::Closed;
            }
        };

        self.shared.set_state(ConnectionState::Open);
        self.logger
            .info(&format!("Connected to WebSocket at {}", self.config.url));

        loop {
            let event = tokio::select! {
                biased;

                command = self.command_rx.recv() => {
                    self.on_stop(command);
                    None
                }

                event = transport.next_event() => Some(event),
            };

            match event {
                None => {
                    close_transport(transport.as_mut(), self.config.close_timeout).await;
                    self.shared.set_state(ConnectionState::Closed);
                    self.logger.info(CLOSED_MESSAGE);
                    return AttemptEnd::Stopped;
                }

                Some(TransportEvent::Message(payload)) => self.deliver(payload),

                Some(TransportEvent::Error(e)) => {
                    self.logger.error(&format!("WebSocket error: {e}"));
                    close_transport(transport.as_mut(), self.config.close_timeout).await;
                    return AttemptEnd::Closed;
                }

                Some(TransportEvent::Closed) => {
                    debug!(attempt, "Transport closed");
                    return AttemptEnd::Closed;
                }
            }
        }
    }

    /// Hands one frame to the sink as a single-record batch.
    fn deliver(&self, payload: Payload) {
        if !self.shared.is_active() {
            trace!(len = payload.len(), "Frame after stop dropped");
            return;
        }

        trace!(len = payload.len(), "Frame received");
        self.sink.emit(vec![StreamRecord::new(payload.into_text())]);
    }

    /// Handles the outcome of `command_rx.recv()`.
    ///
    /// `None` means every handle was dropped, which stops the stream too.
    fn on_stop(&self, command: Option<StreamCommand>) {
        match command {
            Some(StreamCommand::Stop) => debug!("Stop command received"),
            None => {
                self.shared.deactivate();
                debug!("All handles dropped, stopping");
            }
        }
    }
}

/// Requests a close, bounded by `close_timeout`.
async fn close_transport(transport: &mut dyn Transport, close_timeout: Duration) {
    match timeout(close_timeout, transport.close()).await {
        Ok(Ok(())) => debug!("Close requested"),
        Ok(Err(Error::ConnectionClosed)) => trace!("Transport already closed"),
        Ok(Err(e)) => debug!(error = %e, "Close request failed"),
        Err(_) => warn!(
            timeout_ms = close_timeout.as_millis() as u64,
            "Close request timed out"
        ),
    }
}

// ============================================================================
// Tests
// ============================================================================
