//! Room service wire protocol.
//!
//! Shared by the room server and the remote sync client so both sides agree
//! on route shapes and WebSocket message framing.

use serde::{Deserialize, Serialize};

use crate::asset::Asset;

/// Route prefix for the room API.
pub const API_PREFIX: &str = "/api/v1";

/// Messages pushed by the server over a room WebSocket.
///
/// Serialized as JSON with an internally-tagged `"type"` discriminator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum RoomMessage {
    /// Full ordered collection for `room`, sent on connect and after every
    /// change.
    #[serde(rename = "snapshot")]
    Snapshot { room: String, assets: Vec<Asset> },

    /// The server could not serve the subscription.
    #[serde(rename = "error")]
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_is_tagged() {
        let msg = RoomMessage::Snapshot {
            room: "team-x".into(),
            assets: vec![],
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "snapshot");
        assert_eq!(json["room"], "team-x");
        assert!(json["assets"].as_array().unwrap().is_empty());
    }

    #[test]
    fn error_message_parses() {
        let msg: RoomMessage =
            serde_json::from_str(r#"{"type":"error","message":"boom"}"#).unwrap();
        assert_eq!(msg, RoomMessage::Error { message: "boom".into() });
    }
}
