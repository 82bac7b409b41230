use crate::room::{JoinOutcome, LeaveNotice, RoomRegistry};
use crate::signaling::channel::SignalingChannel;
use crate::signaling::messages::{ClientMessage, ServerMessage};
use crate::signaling::relay::{NegotiationMessage, NegotiationRelay};
use crate::types::{ChannelMap, ConnectionId};
use crate::utils::{Error, Result};
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Dispatches every inbound client message: membership changes go to the
/// registry, negotiation traffic to the relay, and the resulting events back
/// out through the participants' signaling channels.
pub struct MessageHandler {
    registry: Arc<RoomRegistry>,
    relay: NegotiationRelay,
    channels: ChannelMap,
}

impl MessageHandler {
    pub fn new(registry: Arc<RoomRegistry>) -> Self {
        let channels: ChannelMap = Arc::new(RwLock::new(HashMap::new()));
        Self {
            relay: NegotiationRelay::new(registry.clone(), channels.clone()),
            registry,
            channels,
        }
    }

    pub async fn register(&self, connection_id: ConnectionId, channel: Arc<dyn SignalingChannel>) {
        let mut channels = self.channels.write().await;
        channels.insert(connection_id, channel);
    }

    pub async fn handle_message(
        &self,
        connection_id: &ConnectionId,
        message: ClientMessage,
    ) -> Result<()> {
        match message {
            ClientMessage::Join { room_id } => self.handle_join(connection_id, &room_id).await,
            ClientMessage::Offer { room_id, sdp } => {
                self.relay_or_report(connection_id, &room_id, NegotiationMessage::Offer(sdp))
                    .await
            }
            ClientMessage::Answer { room_id, sdp } => {
                self.relay_or_report(connection_id, &room_id, NegotiationMessage::Answer(sdp))
                    .await
            }
            ClientMessage::IceCandidate { room_id, candidate } => {
                self.relay_or_report(
                    connection_id,
                    &room_id,
                    NegotiationMessage::Candidate(candidate),
                )
                .await
            }
            ClientMessage::Leave => {
                if let Some(notice) = self.registry.leave(connection_id) {
                    self.notify_departure(&notice).await;
                }
                Ok(())
            }
        }
    }

    /// Connection-level teardown: drops the channel and leaves the room. Safe
    /// to call after an explicit leave; the registry side is idempotent.
    pub async fn handle_disconnect(&self, connection_id: &ConnectionId) -> Result<()> {
        {
            let mut channels = self.channels.write().await;
            channels.remove(connection_id);
        }
        if let Some(notice) = self.registry.leave(connection_id) {
            self.notify_departure(&notice).await;
        }
        Ok(())
    }

    async fn handle_join(&self, connection_id: &ConnectionId, room_id: &str) -> Result<()> {
        let (prior, outcome) = self.registry.join(connection_id, room_id);
        if let Some(notice) = prior {
            self.notify_departure(&notice).await;
        }

        match outcome {
            JoinOutcome::Created => self.send_to(connection_id, &ServerMessage::Created).await,
            JoinOutcome::Ready { members } => {
                for member in &members {
                    self.send_to(member, &ServerMessage::Ready).await;
                }
            }
            JoinOutcome::Full => self.send_to(connection_id, &ServerMessage::RoomFull).await,
            JoinOutcome::InvalidRoom => {
                self.send_to(connection_id, &ServerMessage::InvalidRoom).await
            }
        }
        Ok(())
    }

    /// Relay a negotiation message; a routing failure is reported to the
    /// sender only and never tears anything down.
    async fn relay_or_report(
        &self,
        sender: &ConnectionId,
        room_id: &str,
        message: NegotiationMessage,
    ) -> Result<()> {
        match self.relay.relay(sender, room_id, message).await {
            Ok(()) => {}
            Err(Error::Route(reason)) => {
                warn!("Dropping message from {}: {}", sender, reason);
                self.send_to(sender, &ServerMessage::InvalidRoute).await;
            }
            Err(e) => warn!("Relay delivery from {} failed: {}", sender, e),
        }
        Ok(())
    }

    async fn notify_departure(&self, notice: &LeaveNotice) {
        if let Some(ref remaining) = notice.remaining {
            self.send_to(remaining, &ServerMessage::PeerLeft).await;
        }
    }

    async fn send_to(&self, connection_id: &ConnectionId, event: &ServerMessage) {
        let channel = {
            let channels = self.channels.read().await;
            channels.get(connection_id).cloned()
        };
        match channel {
            Some(channel) => {
                if let Err(e) = channel.send(event).await {
                    warn!("Failed to send event to {}: {}", connection_id, e);
                }
            }
            None => debug!("No channel registered for {}, dropping event", connection_id),
        }
    }
}
