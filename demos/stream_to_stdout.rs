//! Prints every message of a WebSocket stream to stdout.
//!
//! Usage:
//!
//! ```bash
//! cargo run --example stream_to_stdout -- ws://localhost:8080 [--no-reconnect] [--debug]
//! ```
//!
//! Press Ctrl+C to stop the stream.

// ============================================================================
// Imports
// ============================================================================

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use websocket_stream::{StreamConfig, StreamConnection, StreamRecord, TracingLogger};

// ============================================================================
// Types
// ============================================================================

/// Command-line arguments.
#[derive(Debug, Clone)]
struct Args {
    url: String,
    reconnect: bool,
    debug: bool,
}

impl Args {
    fn parse() -> Result<Self> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let url = args
            .iter()
            .find(|a| !a.starts_with("--"))
            .cloned()
            .context("missing WebSocket URL argument")?;

        Ok(Self {
            url,
            reconnect: !args.iter().any(|a| a == "--no-reconnect"),
            debug: args.iter().any(|a| a == "--debug"),
        })
    }
}

// ============================================================================
// Functions
// ============================================================================

fn init_logging(debug: bool) {
    let filter = if debug {
        "websocket_stream=debug"
    } else {
        "websocket_stream=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse()?;
    init_logging(args.debug);

    let config = StreamConfig::new(args.url).with_reconnect(args.reconnect);
    let sink = |batch: Vec<StreamRecord>| {
        for record in batch {
            println!("{}", record.message);
        }
    };

    let handle = StreamConnection::start(config, sink, TracingLogger)?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;

    handle.stop().await;
    Ok(())
}
