use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Messages a participant sends to the broker. Session descriptions and
/// candidates are opaque payloads; the broker never looks inside them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    Join { room_id: String },
    Offer { room_id: String, sdp: Value },
    Answer { room_id: String, sdp: Value },
    IceCandidate { room_id: String, candidate: Value },
    Leave,
}

/// Events the broker sends to a participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// First into the room; the receiver is the session's Initiator.
    Created,
    /// The room has two members; sent to both of them.
    Ready,
    Offer { sdp: Value },
    Answer { sdp: Value },
    IceCandidate { candidate: Value },
    PeerLeft,
    RoomFull,
    InvalidRoom,
    /// A negotiation message could not be routed; sent to the sender only.
    InvalidRoute,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn client_events_use_kebab_case_tags() {
        let msg: ClientMessage =
            serde_json::from_value(json!({"event": "join", "roomId": "alpha"})).unwrap();
        assert!(matches!(msg, ClientMessage::Join { room_id } if room_id == "alpha"));

        let msg: ClientMessage = serde_json::from_value(json!({
            "event": "ice-candidate",
            "roomId": "alpha",
            "candidate": {"candidate": "candidate:0 1 UDP ..."}
        }))
        .unwrap();
        assert!(matches!(msg, ClientMessage::IceCandidate { .. }));

        let msg: ClientMessage = serde_json::from_value(json!({"event": "leave"})).unwrap();
        assert!(matches!(msg, ClientMessage::Leave));
    }

    #[test]
    fn server_events_round_trip() {
        let json = serde_json::to_value(&ServerMessage::PeerLeft).unwrap();
        assert_eq!(json, json!({"event": "peer-left"}));

        let json = serde_json::to_value(&ServerMessage::Offer { sdp: json!({"type": "offer"}) })
            .unwrap();
        assert_eq!(json, json!({"event": "offer", "sdp": {"type": "offer"}}));
    }
}
