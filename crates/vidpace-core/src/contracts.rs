//! Wire shapes exchanged between contexts.
//!
//! Serialized with camelCase field names and an `action` tag:
//!
//! ```json
//! { "action": "setSpeed", "speed": 1.75 }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Command message sent from the popup to a page context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ContextMessage {
    /// Apply `speed` in the receiving page.
    SetSpeed { speed: f64 },
}

impl ContextMessage {
    /// Decode a raw message. Unknown actions and malformed payloads yield `None`.
    pub fn parse(raw: &Value) -> Option<Self> {
        serde_json::from_value(raw.clone()).ok()
    }
}

/// Acknowledgement sent back to the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextReply {
    pub success: bool,
}

impl ContextReply {
    /// A successful acknowledgement.
    pub const fn ok() -> Self {
        Self { success: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_set_speed() {
        let message = ContextMessage::parse(&json!({ "action": "setSpeed", "speed": 2 }));
        assert_eq!(message, Some(ContextMessage::SetSpeed { speed: 2.0 }));
    }

    #[test]
    fn test_parse_rejects_unknown_and_malformed() {
        assert!(ContextMessage::parse(&json!({ "action": "getSpeed" })).is_none());
        assert!(ContextMessage::parse(&json!({ "action": "setSpeed", "speed": "fast" })).is_none());
        assert!(ContextMessage::parse(&json!({ "speed": 2 })).is_none());
    }

    #[test]
    fn test_wire_format() {
        let encoded = serde_json::to_value(ContextMessage::SetSpeed { speed: 1.5 }).unwrap();
        assert_eq!(encoded, json!({ "action": "setSpeed", "speed": 1.5 }));
        assert_eq!(
            serde_json::to_value(ContextReply::ok()).unwrap(),
            json!({ "success": true })
        );
    }
}
