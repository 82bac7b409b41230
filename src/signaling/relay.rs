use crate::room::RoomRegistry;
use crate::signaling::messages::ServerMessage;
use crate::types::{ChannelMap, ConnectionId};
use crate::utils::{Error, Result};
use log::debug;
use metrics::increment_counter;
use serde_json::Value;
use std::sync::Arc;

/// A negotiation message in flight between the two members of a room.
/// Payloads are opaque; the relay forwards them untouched.
#[derive(Debug, Clone)]
pub enum NegotiationMessage {
    Offer(Value),
    Answer(Value),
    Candidate(Value),
}

impl NegotiationMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            NegotiationMessage::Offer(_) => "offer",
            NegotiationMessage::Answer(_) => "answer",
            NegotiationMessage::Candidate(_) => "ice-candidate",
        }
    }

    fn into_event(self) -> ServerMessage {
        match self {
            NegotiationMessage::Offer(sdp) => ServerMessage::Offer { sdp },
            NegotiationMessage::Answer(sdp) => ServerMessage::Answer { sdp },
            NegotiationMessage::Candidate(candidate) => ServerMessage::IceCandidate { candidate },
        }
    }
}

/// Stateless pass-through between the two members of a room: the message goes
/// to the sender's counterpart, never back to the sender, never across rooms.
pub struct NegotiationRelay {
    registry: Arc<RoomRegistry>,
    channels: ChannelMap,
}

impl NegotiationRelay {
    pub fn new(registry: Arc<RoomRegistry>, channels: ChannelMap) -> Self {
        Self { registry, channels }
    }

    pub async fn relay(
        &self,
        sender: &ConnectionId,
        room_id: &str,
        message: NegotiationMessage,
    ) -> Result<()> {
        let peer = self.registry.counterpart(sender, room_id).ok_or_else(|| {
            Error::Route(format!(
                "{} has no counterpart in room {}",
                sender, room_id
            ))
        })?;

        let channel = {
            let channels = self.channels.read().await;
            channels.get(&peer).cloned()
        };
        let channel = channel
            .ok_or_else(|| Error::Route(format!("peer {} has no active channel", peer)))?;

        debug!("Relaying {} from {} to {}", message.kind(), sender, peer);
        increment_counter!("paircall_messages_relayed");
        channel.send(&message.into_event()).await
    }
}
