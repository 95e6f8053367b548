//! Stream configuration.
//!
//! Provides a type-safe interface for the two host parameters of a stream
//! (`url`, `reconnect`) plus the timing knobs of the reconnect loop.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use websocket_stream::StreamConfig;
//!
//! let config = StreamConfig::new("wss://example.com/feed")
//!     .with_reconnect(true)
//!     .with_reconnect_delay(Duration::from_millis(1000));
//!
//! config.validate()?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// URL used when the host leaves the parameter unset.
pub const DEFAULT_URL: &str = "ws://localhost:8080";

/// Fixed delay between a close and the next connect attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(1000);

/// Upper bound on one connect handshake.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound on the close request sent by `stop`.
pub const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// StreamConfig
// ============================================================================

/// Configuration of one stream.
///
/// Immutable once the stream is started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    /// WebSocket URL (`ws://` or `wss://`).
    pub url: String,

    /// Reconnect after the connection closes or errors out.
    pub reconnect: bool,

    /// Delay before each reconnect attempt. No backoff is applied.
    pub reconnect_delay: Duration,

    /// Maximum time one connect handshake may take.
    pub connect_timeout: Duration,

    /// Maximum time spent requesting a close on `stop` or after an error.
    pub close_timeout: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self::new(DEFAULT_URL)
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl StreamConfig {
    /// Creates a configuration with reconnect enabled.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reconnect: true,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            close_timeout: DEFAULT_CLOSE_TIMEOUT,
        }
    }

    /// Reads the host's node parameters.
    ///
    /// Recognized keys: `url`, `reconnect`, `reconnectDelayMs`. Missing keys
    /// fall back to the node defaults.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] if a key has the wrong type
    /// - [`Error::Config`] / [`Error::Url`] if the result fails [`validate`](Self::validate)
    pub fn from_parameters(parameters: &Value) -> Result<Self> {
        let parameters = NodeParameters::deserialize(parameters)?;

        let mut config = Self::new(parameters.url).with_reconnect(parameters.reconnect);
        if let Some(delay_ms) = parameters.reconnect_delay_ms {
            config = config.with_reconnect_delay(Duration::from_millis(delay_ms));
        }

        config.validate()?;
        Ok(config)
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl StreamConfig {
    /// Enables or disables reconnecting.
    #[inline]
    #[must_use]
    pub fn with_reconnect(mut self, reconnect: bool) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Sets the delay before each reconnect attempt.
    #[inline]
    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Sets the connect handshake timeout.
    #[inline]
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the close request timeout.
    #[inline]
    #[must_use]
    pub fn with_close_timeout(mut self, timeout: Duration) -> Self {
        self.close_timeout = timeout;
        self
    }
}

// ============================================================================
// Validation
// ============================================================================

impl StreamConfig {
    /// Checks that the URL is present and usable by the WebSocket client.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the URL is blank or not `ws`/`wss`
    /// - [`Error::Url`] if the URL does not parse
    pub fn validate(&self) -> Result<()> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(Error::config(
                "WebSocket URL is required.\n\
                 Example: StreamConfig::new(\"wss://example.com\")",
            ));
        }

        let parsed = Url::parse(url)?;
        match parsed.scheme() {
            "ws" | "wss" => Ok(()),
            other => Err(Error::config(format!(
                "Unsupported URL scheme '{other}', expected ws or wss"
            ))),
        }
    }
}

// ============================================================================
// NodeParameters
// ============================================================================

/// Raw node parameters as the host hands them over.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeParameters {
    #[serde(default = "default_url")]
    url: String,
    #[serde(default = "default_reconnect")]
    reconnect: bool,
    #[serde(default)]
    reconnect_delay_ms: Option<u64>,
}

fn default_url() -> String {
    DEFAULT_URL.to_string()
}

const fn default_reconnect() -> bool {
    true
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_new_defaults() {
        let config = StreamConfig::new("ws://x");
        assert_eq!(config.url, "ws://x");
        assert!(config.reconnect);
        assert_eq!(config.reconnect_delay, Duration::from_millis(1000));
        assert_eq!(config.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
        assert_eq!(config.close_timeout, DEFAULT_CLOSE_TIMEOUT);
    }

    #[test]
    fn test_default_uses_node_url() {
        assert_eq!(StreamConfig::default().url, DEFAULT_URL);
    }

    #[test]
    fn test_builder_methods() {
        let config = StreamConfig::new("ws://x")
            .with_reconnect(false)
            .with_reconnect_delay(Duration::from_millis(10))
            .with_connect_timeout(Duration::from_secs(1))
            .with_close_timeout(Duration::from_secs(2));

        assert!(!config.reconnect);
        assert_eq!(config.reconnect_delay, Duration::from_millis(10));
        assert_eq!(config.connect_timeout, Duration::from_secs(1));
        assert_eq!(config.close_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_validate_accepts_ws_and_wss() {
        assert!(StreamConfig::new("ws://localhost:8080").validate().is_ok());
        assert!(StreamConfig::new("wss://example.com/feed").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_url() {
        let err = StreamConfig::new("   ").validate().unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("URL is required"));
    }

    #[test]
    fn test_validate_rejects_unparseable_url() {
        let err = StreamConfig::new("not a url").validate().unwrap_err();
        assert!(matches!(err, Error::Url(_)));
        assert!(err.is_config_error());
    }

    #[test]
    fn test_validate_rejects_http_scheme() {
        let err = StreamConfig::new("http://example.com").validate().unwrap_err();
        assert!(err.to_string().contains("http"));
    }

    #[test]
    fn test_from_parameters_full() {
        let config = StreamConfig::from_parameters(&json!({
            "url": "wss://example.com",
            "reconnect": false,
            "reconnectDelayMs": 250
        }))
        .expect("valid parameters");

        assert_eq!(config.url, "wss://example.com");
        assert!(!config.reconnect);
        assert_eq!(config.reconnect_delay, Duration::from_millis(250));
    }

    #[test]
    fn test_from_parameters_defaults() {
        let config = StreamConfig::from_parameters(&json!({})).expect("defaults");
        assert_eq!(config, StreamConfig::default());
    }

    #[test]
    fn test_from_parameters_wrong_type() {
        let err = StreamConfig::from_parameters(&json!({ "reconnect": "yes" })).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_from_parameters_empty_url() {
        let err = StreamConfig::from_parameters(&json!({ "url": "" })).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
