//! WebSocket Stream - continuous WebSocket ingestion for pipelines.
//!
//! This library keeps a WebSocket client connected to a URL and forwards
//! every inbound frame, as text, to a host pipeline. Dropped connections
//! are retried on a fixed delay until the host stops the stream.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  start(config, sink, logger)  ┌──────────────────┐
//! │ Host pipeline│──────────────────────────────►│ StreamConnection │
//! │              │◄──── StreamHandle ────────────│  (tokio task)    │
//! │   Sink       │◄──── emit([record]) ──────────│                  │◄──── WebSocket
//! │   Logger     │◄──── info / error ────────────│                  │
//! └──────────────┘                               └──────────────────┘
//! ```
//!
//! Key guarantees:
//!
//! - At most one live socket per stream at any instant
//! - Frames of one connection reach the sink in arrival order
//! - One reconnect per closed connection, after a fixed delay, forever
//! - Nothing reaches the sink once [`StreamHandle::stop`] has returned
//!
//! # Quick Start
//!
//! ```no_run
//! use websocket_stream::{StreamConfig, StreamConnection, StreamRecord, TracingLogger};
//!
//! #[tokio::main]
//! async fn main() -> websocket_stream::Result<()> {
//!     let config = StreamConfig::new("ws://localhost:8080");
//!     let sink = |batch: Vec<StreamRecord>| {
//!         for record in batch {
//!             println!("{}", record.message);
//!         }
//!     };
//!
//!     let handle = StreamConnection::start(config, sink, TracingLogger)?;
//!
//!     tokio::signal::ctrl_c().await?;
//!     handle.stop().await;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`stream`] | Connection task, handle, configuration |
//! | [`host`] | [`Sink`] and [`Logger`] contracts |
//! | [`transport`] | WebSocket transport seam |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | [`StreamId`] |

// ============================================================================
// Modules
// ============================================================================

/// Error types and result aliases.
pub mod error;

/// Contracts with the host pipeline.
pub mod host;

/// Type-safe identifiers.
pub mod identifiers;

/// The reconnecting stream.
pub mod stream;

/// WebSocket transport layer.
///
/// Exposed so hosts can plug in their own [`transport::Connector`].
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Stream types
pub use stream::{ConnectionState, StreamConfig, StreamConnection, StreamHandle};

// Host contracts
pub use host::{ChannelSink, Logger, Sink, StreamRecord, TracingLogger};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::StreamId;
