//! Contracts with the host pipeline.
//!
//! A stream talks to its host through exactly two collaborators:
//!
//! | Type | Role |
//! |------|------|
//! | [`Sink`] | Receives every inbound message as a [`StreamRecord`] batch |
//! | [`Logger`] | Receives human-readable diagnostics, no behavioral effect |
//!
//! Stock implementations are provided for both: closures and
//! [`ChannelSink`] for the sink, [`TracingLogger`] for the logger.

// ============================================================================
// Submodules
// ============================================================================

/// Diagnostic output contract.
pub mod logger;

/// Emitted record type.
pub mod record;

/// Downstream consumer contract.
pub mod sink;

// ============================================================================
// Re-exports
// ============================================================================

pub use logger::{Logger, TracingLogger};
pub use record::StreamRecord;
pub use sink::{ChannelSink, Sink};
