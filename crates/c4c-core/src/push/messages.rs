use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::mining::errors::PayloadError;
use crate::mining::types::MiningStatusUpdate;
use crate::mining::validation::parse_mining_status;

/// Server -> client message: a named event with a JSON payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerFrame {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

/// What the push channel reports to its consumer.
///
/// `Connected` and `Disconnected` come from the socket lifecycle.
/// `ConnectError` is raised for a failed handshake or sent by the server;
/// the rest come from server frames.
#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    Connected,
    Disconnected { reason: String },
    ConnectError { message: String },
    Error { message: String },
    MiningStatus(MiningStatusUpdate),
}

impl ServerFrame {
    /// Decode into a [`PushEvent`]. Unknown events yield `Ok(None)`.
    pub fn into_event(self) -> Result<Option<PushEvent>, PayloadError> {
        match self.event.as_str() {
            "miningStatus" => Ok(Some(PushEvent::MiningStatus(parse_mining_status(
                &self.data,
            )?))),
            "error" => Ok(Some(PushEvent::Error {
                message: frame_message(&self.data),
            })),
            "connect_error" => Ok(Some(PushEvent::ConnectError {
                message: frame_message(&self.data),
            })),
            _ => Ok(None),
        }
    }
}

fn frame_message(data: &Value) -> String {
    match data {
        Value::String(message) => message.clone(),
        other => other
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| "unknown push error".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frame(value: Value) -> ServerFrame {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_mining_status_frame_decodes() {
        let event = frame(json!({
            "event": "miningStatus",
            "data": {
                "miningColleges": [],
                "activeSessions": [{ "college": 7, "isActive": true, "remainingHours": 12, "currentTokens": 4.2 }],
                "wallets": []
            }
        }))
        .into_event()
        .unwrap();

        match event {
            Some(PushEvent::MiningStatus(update)) => {
                assert_eq!(update.active_sessions[0].current_tokens, 4.2);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_error_frames() {
        assert_eq!(
            frame(json!({ "event": "error", "data": { "message": "boom" } }))
                .into_event()
                .unwrap(),
            Some(PushEvent::Error {
                message: "boom".to_string()
            })
        );
        assert_eq!(
            frame(json!({ "event": "connect_error", "data": "Authentication error" }))
                .into_event()
                .unwrap(),
            Some(PushEvent::ConnectError {
                message: "Authentication error".to_string()
            })
        );
    }

    #[test]
    fn test_unknown_event_is_ignored() {
        assert_eq!(frame(json!({ "event": "chat" })).into_event().unwrap(), None);
    }

    #[test]
    fn test_malformed_status_payload_is_error() {
        assert!(
            frame(json!({ "event": "miningStatus", "data": [1, 2] }))
                .into_event()
                .is_err()
        );
    }
}
