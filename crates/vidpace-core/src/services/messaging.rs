//! Message command source.

use serde_json::Value;
use tracing::debug;

use crate::contracts::{ContextMessage, ContextReply};
use crate::services::{SpeedController, SpeedOrigin};

/// Handle a raw message addressed to this context.
///
/// Well-formed `setSpeed` messages are acknowledged on receipt even when
/// the controller rejects the speed. Anything else gets no reply.
pub fn handle_message(controller: &SpeedController, raw: &Value) -> Option<ContextReply> {
    let Some(message) = ContextMessage::parse(raw) else {
        debug!(%raw, "Ignoring unrecognised message");
        return None;
    };
    match message {
        ContextMessage::SetSpeed { speed } => {
            controller.set_speed(speed, SpeedOrigin::Message);
            Some(ContextReply::ok())
        }
    }
}
