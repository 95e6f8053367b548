//! Handle to a running stream.
//!
//! The handle is the host's only way to stop a stream. It is cheap to clone;
//! all clones control the same stream, and dropping the last clone without
//! calling [`StreamHandle::stop`] stops the stream as well.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{Span, debug, error};

use crate::host::Logger;
use crate::identifiers::StreamId;

use super::state::{ConnectionState, SharedState};

// ============================================================================
// Constants
// ============================================================================

/// Logged once the stream has been torn down by the host.
const STOPPED_MESSAGE: &str = "WebSocket stream stopped";

// ============================================================================
// StreamCommand
// ============================================================================

/// Commands for the connection task.
#[derive(Debug)]
pub(crate) enum StreamCommand {
    /// Stop the stream: close the transport, cancel any pending reconnect.
    Stop,
}

// ============================================================================
// StreamHandle
// ============================================================================

/// Handle to a started stream.
///
/// # Thread Safety
///
/// `StreamHandle` is `Send + Sync`; `stop` may be called from any task.
#[derive(Clone)]
pub struct StreamHandle {
    /// Stream identifier, also recorded on the task span.
    id: StreamId,
    /// Channel to the connection task.
    command_tx: mpsc::UnboundedSender<StreamCommand>,
    /// Lifecycle state shared with the task.
    shared: Arc<SharedState>,
    /// Connection task, joined by the first `stop`.
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
    /// Turns `true` when the connection task exits.
    finished: watch::Receiver<bool>,
    /// Host logger.
    logger: Arc<dyn Logger>,
    /// Span of the connection task.
    span: Span,
}

impl StreamHandle {
    /// Wraps a freshly spawned connection task.
    pub(crate) fn new(
        id: StreamId,
        command_tx: mpsc::UnboundedSender<StreamCommand>,
        shared: Arc<SharedState>,
        task: JoinHandle<()>,
        finished: watch::Receiver<bool>,
        logger: Arc<dyn Logger>,
        span: Span,
    ) -> Self {
        Self {
            id,
            command_tx,
            shared,
            task: Arc::new(Mutex::new(Some(task))),
            finished,
            logger,
            span,
        }
    }

    /// Returns the stream identifier.
    #[inline]
    #[must_use]
    pub fn id(&self) -> StreamId {
        self.id
    }

    /// Returns `true` until the stream is stopped.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.shared.is_active()
    }

    /// Returns the state of the current connect attempt.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    /// Returns the number of connect attempts started so far.
    #[inline]
    #[must_use]
    pub fn attempts(&self) -> u64 {
        self.shared.attempts()
    }

    /// Returns `true` once the connection task has exited.
    ///
    /// This happens after `stop`, or after a close with reconnect disabled.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        // A closed channel means the task is gone without signalling
        *self.finished.borrow() || self.finished.has_changed().is_err()
    }

    /// Requests the stream to stop without waiting for it.
    ///
    /// Clears the active flag, so no reconnect is scheduled from now on and
    /// no frame read after this call is delivered. A frame already being
    /// handed to the sink may still complete; use [`stop`](Self::stop) for
    /// the strict guarantee.
    ///
    /// Returns `true` if this call initiated the stop.
    pub fn request_stop(&self) -> bool {
        if !self.shared.deactivate() {
            return false;
        }

        debug!(stream_id = %self.id, "Stop requested");

        // The task may already be gone (reconnect disabled)
        let _ = self.command_tx.send(StreamCommand::Stop);
        true
    }

    /// Stops the stream and waits for its connection task to finish.
    ///
    /// Once this returns, the sink receives no further records, the
    /// transport close has been requested and no reconnect attempt is
    /// pending. This holds for every clone calling it, concurrently or not.
    /// Only the first call logs the stop.
    pub async fn stop(&self) {
        self.request_stop();

        let task = self.task.lock().take();
        match task {
            Some(task) => {
                if let Err(e) = task.await {
                    self.span
                        .in_scope(|| error!(error = %e, "Stream task ended abnormally"));
                }
                self.span.in_scope(|| self.logger.info(STOPPED_MESSAGE));
            }
            None => self.wait_finished().await,
        }
    }

    /// Waits until the connection task has exited.
    async fn wait_finished(&self) {
        let mut finished = self.finished.clone();
        // Err: sender dropped, so the task is gone as well
        let _ = finished.wait_for(|done| *done).await;
    }
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .field("state", &self.state())
            .field("attempts", &self.attempts())
            .finish()
    }
}
