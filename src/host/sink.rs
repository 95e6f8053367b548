//! Downstream consumer of emitted records.
//!
//! The stream calls [`Sink::emit`] once per inbound message with a
//! single-element batch, on the connection task, in arrival order.

// ============================================================================
// Imports
// ============================================================================

use tokio::sync::mpsc;
use tracing::debug;

use super::record::StreamRecord;

// ============================================================================
// Sink
// ============================================================================

/// Host pipeline accepting emitted records.
///
/// `emit` runs synchronously on the connection task. It must not block
/// for long: the next frame is not read until it returns.
pub trait Sink: Send + Sync + 'static {
    /// Accepts an ordered batch of records.
    fn emit(&self, batch: Vec<StreamRecord>);
}

impl<F> Sink for F
where
    F: Fn(Vec<StreamRecord>) + Send + Sync + 'static,
{
    fn emit(&self, batch: Vec<StreamRecord>) {
        self(batch);
    }
}

// ============================================================================
// ChannelSink
// ============================================================================

/// Sink forwarding batches into an unbounded tokio channel.
///
/// Unbounded so that delivery never waits on the consumer.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Vec<StreamRecord>>,
}

impl ChannelSink {
    /// Creates a sink and the receiver the host reads batches from.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Vec<StreamRecord>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Wraps an existing sender.
    #[inline]
    #[must_use]
    pub fn from_sender(tx: mpsc::UnboundedSender<Vec<StreamRecord>>) -> Self {
        Self { tx }
    }
}

impl Sink for ChannelSink {
    fn emit(&self, batch: Vec<StreamRecord>) {
        if self.tx.send(batch).is_err() {
            debug!("Sink receiver dropped, batch discarded");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use parking_lot::Mutex;

    #[test]
    fn test_closure_sink() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let sink = move |batch: Vec<StreamRecord>| seen_clone.lock().extend(batch);

        sink.emit(vec![StreamRecord::new("a")]);
        sink.emit(vec![StreamRecord::new("b")]);

        assert_eq!(
            *seen.lock(),
            vec![StreamRecord::new("a"), StreamRecord::new("b")]
        );
    }

    #[tokio::test]
    async fn test_channel_sink_forwards_batches() {
        let (sink, mut rx) = ChannelSink::new();
        sink.emit(vec![StreamRecord::new("hello")]);

        let batch = rx.recv().await.expect("batch");
        assert_eq!(batch, vec![StreamRecord::new("hello")]);
    }

    #[test]
    fn test_channel_sink_tolerates_dropped_receiver() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);

        // Should not panic
        sink.emit(vec![StreamRecord::new("lost")]);
    }
}
