//! The reconnecting WebSocket stream.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`StreamConnection`] | Spawns and runs the connection task |
//! | [`StreamHandle`] | Stops a running stream, exposes its state |
//! | [`StreamConfig`] | URL, reconnect flag and timings |
//! | [`ConnectionState`] | State of the current connect attempt |
//!
//! # Example
//!
//! ```no_run
//! use websocket_stream::{ChannelSink, StreamConfig, StreamConnection, TracingLogger};
//!
//! # async fn example() -> websocket_stream::Result<()> {
//! let (sink, mut records) = ChannelSink::new();
//! let handle = StreamConnection::start(
//!     StreamConfig::new("wss://example.com/feed"),
//!     sink,
//!     TracingLogger,
//! )?;
//!
//! while let Some(batch) = records.recv().await {
//!     for record in batch {
//!         println!("{}", record.message);
//!     }
//! #   break;
//! }
//!
//! handle.stop().await;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Stream configuration and host parameter parsing.
pub mod config;

/// Connection task and reconnect loop.
pub mod connection;

/// Handle returned to the host.
pub mod handle;

/// Lifecycle state shared between task and handles.
pub mod state;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::StreamConfig;
pub use connection::StreamConnection;
pub use handle::StreamHandle;
pub use state::ConnectionState;
