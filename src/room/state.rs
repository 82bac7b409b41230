use crate::types::ConnectionId;
use chrono::{DateTime, Utc};

/// Fixed negotiation role, assigned when the participant enters the room.
/// The Initiator always originates the offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Initiator,
    Responder,
}

#[derive(Debug, Clone)]
pub struct ParticipantRef {
    pub connection_id: ConnectionId,
    pub role: Role,
    pub joined_at: DateTime<Utc>,
}

/// A two-party room. Membership is an ordered list capped at two entries;
/// rooms with zero members are never kept in the registry.
#[derive(Debug, Clone)]
pub struct Room {
    pub id: String,
    pub members: Vec<ParticipantRef>,
    pub created_at: DateTime<Utc>,
}

impl Room {
    pub const CAPACITY: usize = 2;

    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            members: Vec::with_capacity(Self::CAPACITY),
            created_at: Utc::now(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= Self::CAPACITY
    }

    pub fn member(&self, connection_id: &str) -> Option<&ParticipantRef> {
        self.members
            .iter()
            .find(|m| m.connection_id == connection_id)
    }

    /// The other member of the room, if the room currently has two.
    pub fn counterpart_of(&self, connection_id: &str) -> Option<&ParticipantRef> {
        if self.members.len() != Self::CAPACITY || self.member(connection_id).is_none() {
            return None;
        }
        self.members
            .iter()
            .find(|m| m.connection_id != connection_id)
    }
}
