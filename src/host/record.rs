//! Records handed to the host pipeline.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// StreamRecord
// ============================================================================

/// One inbound WebSocket message, forwarded opaquely as text.
///
/// Serializes to the JSON item the pipeline consumes:
///
/// ```json
/// { "message": "..." }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamRecord {
    /// Payload of the frame, decoded as text.
    pub message: String,
}

impl StreamRecord {
    /// Creates a record from a message.
    #[inline]
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the record as a JSON item.
    #[must_use]
    pub fn to_json(&self) -> Value {
        serde_json::json!({ "message": self.message })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_json_shape() {
        let record = StreamRecord::new("hello");
        assert_eq!(record.to_json(), serde_json::json!({ "message": "hello" }));
    }

    #[test]
    fn test_serialize_matches_to_json() {
        let record = StreamRecord::new("{\"nested\":true}");
        let serialized = serde_json::to_value(&record).expect("serialize");
        assert_eq!(serialized, record.to_json());
    }
}
