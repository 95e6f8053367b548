//! Diagnostic output contract.
//!
//! The host's logger sees the same lines the original trigger node printed
//! (`Connected to WebSocket at ...`, `WebSocket connection closed`, ...).
//! Finer-grained detail goes straight to `tracing` inside the connection
//! task and never reaches this trait.

// ============================================================================
// Imports
// ============================================================================

use tracing::{error, info};

// ============================================================================
// Logger
// ============================================================================

/// Fire-and-forget diagnostic sink.
pub trait Logger: Send + Sync + 'static {
    /// Logs an informational line.
    fn info(&self, message: &str);

    /// Logs an error line.
    fn error(&self, message: &str);
}

// ============================================================================
// TracingLogger
// ============================================================================

/// [`Logger`] forwarding to `tracing` events.
///
/// Events are emitted inside the stream's span, so they carry its
/// `stream_id` and `url` fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, message: &str) {
        info!("{message}");
    }

    fn error(&self, message: &str) {
        error!("{message}");
    }
}

// ============================================================================
// Tests
// ============================================================================
