use crate::room::state::{ParticipantRef, Role, Room};
use crate::types::ConnectionId;
use chrono::Utc;
use log::{debug, info};
use metrics::{decrement_gauge, increment_counter, increment_gauge};
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// First member in; the joiner is now the room's Initiator.
    Created,
    /// Second member in; `members` lists both parties, join order preserved,
    /// so the caller can broadcast the ready event to each of them.
    Ready { members: [ConnectionId; 2] },
    /// The room already had two members; membership was left unchanged.
    Full,
    /// The room identifier was blank after trimming.
    InvalidRoom,
}

/// What a departure left behind: the room the participant was in and the
/// member still there, if any. Produced at most once per membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveNotice {
    pub room_id: String,
    pub remaining: Option<ConnectionId>,
}

#[derive(Default)]
struct RegistryState {
    rooms: HashMap<String, Room>,
    /// Reverse index: which room a connection currently occupies.
    membership: HashMap<ConnectionId, String>,
}

/// Owns every room and serializes all membership mutation behind one lock,
/// so two near-simultaneous joins can never both observe a one-member room.
/// The lock is never held across an await point.
pub struct RoomRegistry {
    state: Mutex<RegistryState>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
        }
    }

    /// Add `connection_id` to `room_id`, creating the room if needed. When the
    /// connection was already a member of some room it leaves that room first;
    /// the returned notice tells the caller who to inform about it.
    pub fn join(
        &self,
        connection_id: &ConnectionId,
        room_id: &str,
    ) -> (Option<LeaveNotice>, JoinOutcome) {
        let room_id = room_id.trim();
        if room_id.is_empty() {
            return (None, JoinOutcome::InvalidRoom);
        }

        let mut state = self.state.lock();
        let prior = Self::remove_member(&mut state, connection_id);

        if !state.rooms.contains_key(room_id) {
            info!("Creating room {}", room_id);
            state.rooms.insert(room_id.to_string(), Room::new(room_id));
            increment_gauge!("paircall_rooms_active", 1.0);
        }

        let room = state
            .rooms
            .get_mut(room_id)
            .expect("room inserted above");

        if room.is_full() {
            debug!("Rejecting join from {}: room {} is full", connection_id, room_id);
            return (prior, JoinOutcome::Full);
        }

        let role = if room.members.is_empty() {
            Role::Initiator
        } else {
            Role::Responder
        };
        room.members.push(ParticipantRef {
            connection_id: connection_id.clone(),
            role,
            joined_at: Utc::now(),
        });
        let outcome = match role {
            Role::Initiator => JoinOutcome::Created,
            Role::Responder => JoinOutcome::Ready {
                members: [
                    room.members[0].connection_id.clone(),
                    connection_id.clone(),
                ],
            },
        };

        state
            .membership
            .insert(connection_id.clone(), room_id.to_string());
        increment_counter!("paircall_joins");
        info!("{} joined room {} as {:?}", connection_id, room_id, role);
        (prior, outcome)
    }

    /// Remove the connection from whatever room it occupies. Idempotent; a
    /// connection that is in no room yields `None`.
    pub fn leave(&self, connection_id: &ConnectionId) -> Option<LeaveNotice> {
        let mut state = self.state.lock();
        let notice = Self::remove_member(&mut state, connection_id);
        if let Some(ref notice) = notice {
            info!("{} left room {}", connection_id, notice.room_id);
        }
        notice
    }

    /// The other member of `room_id`, provided the sender is a member and the
    /// room currently has two. This is the relay's only routing question.
    pub fn counterpart(&self, connection_id: &ConnectionId, room_id: &str) -> Option<ConnectionId> {
        let state = self.state.lock();
        state
            .rooms
            .get(room_id.trim())
            .and_then(|room| room.counterpart_of(connection_id))
            .map(|m| m.connection_id.clone())
    }

    pub fn room_exists(&self, room_id: &str) -> bool {
        self.state.lock().rooms.contains_key(room_id.trim())
    }

    pub fn member_count(&self, room_id: &str) -> usize {
        self.state
            .lock()
            .rooms
            .get(room_id.trim())
            .map(|room| room.members.len())
            .unwrap_or(0)
    }

    pub fn role_of(&self, connection_id: &ConnectionId) -> Option<Role> {
        let state = self.state.lock();
        let room_id = state.membership.get(connection_id)?;
        state
            .rooms
            .get(room_id)
            .and_then(|room| room.member(connection_id))
            .map(|m| m.role)
    }

    fn remove_member(state: &mut RegistryState, connection_id: &ConnectionId) -> Option<LeaveNotice> {
        let room_id = state.membership.remove(connection_id)?;
        let remaining = {
            let room = state.rooms.get_mut(&room_id)?;
            room.members.retain(|m| m.connection_id != *connection_id);
            match room.members.first_mut() {
                Some(member) => {
                    // The survivor starts the next session's negotiation
                    // epoch, so it takes over as Initiator for any future
                    // pairing.
                    member.role = Role::Initiator;
                    Some(member.connection_id.clone())
                }
                None => None,
            }
        };

        if remaining.is_none() {
            state.rooms.remove(&room_id);
            decrement_gauge!("paircall_rooms_active", 1.0);
            debug!("Room {} is empty, deleting", room_id);
        }

        Some(LeaveNotice { room_id, remaining })
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(name: &str) -> ConnectionId {
        name.to_string()
    }

    #[test]
    fn blank_room_id_is_rejected() {
        let registry = RoomRegistry::new();
        let (_, outcome) = registry.join(&conn("a"), "");
        assert_eq!(outcome, JoinOutcome::InvalidRoom);
        let (_, outcome) = registry.join(&conn("a"), "   ");
        assert_eq!(outcome, JoinOutcome::InvalidRoom);
        assert!(!registry.room_exists(""));
    }

    #[test]
    fn first_join_creates_second_readies() {
        let registry = RoomRegistry::new();

        let (_, outcome) = registry.join(&conn("a"), "alpha");
        assert_eq!(outcome, JoinOutcome::Created);
        assert_eq!(registry.role_of(&conn("a")), Some(Role::Initiator));

        let (_, outcome) = registry.join(&conn("b"), "alpha");
        assert_eq!(
            outcome,
            JoinOutcome::Ready {
                members: [conn("a"), conn("b")]
            }
        );
        assert_eq!(registry.role_of(&conn("b")), Some(Role::Responder));
        assert_eq!(registry.member_count("alpha"), 2);
    }

    #[test]
    fn third_join_is_rejected_and_room_unchanged() {
        let registry = RoomRegistry::new();
        registry.join(&conn("a"), "alpha");
        registry.join(&conn("b"), "alpha");

        let (_, outcome) = registry.join(&conn("c"), "alpha");
        assert_eq!(outcome, JoinOutcome::Full);
        assert_eq!(registry.member_count("alpha"), 2);
        assert_eq!(registry.role_of(&conn("a")), Some(Role::Initiator));
        assert_eq!(registry.role_of(&conn("b")), Some(Role::Responder));
        assert_eq!(registry.role_of(&conn("c")), None);
    }

    #[test]
    fn leave_reports_remaining_member_then_deletes_room() {
        let registry = RoomRegistry::new();
        registry.join(&conn("a"), "alpha");
        registry.join(&conn("b"), "alpha");

        let notice = registry.leave(&conn("b")).unwrap();
        assert_eq!(notice.room_id, "alpha");
        assert_eq!(notice.remaining, Some(conn("a")));
        assert_eq!(registry.member_count("alpha"), 1);

        let notice = registry.leave(&conn("a")).unwrap();
        assert_eq!(notice.remaining, None);
        assert!(!registry.room_exists("alpha"));
    }

    #[test]
    fn leave_is_idempotent() {
        let registry = RoomRegistry::new();
        registry.join(&conn("a"), "alpha");
        assert!(registry.leave(&conn("a")).is_some());
        assert!(registry.leave(&conn("a")).is_none());
        assert!(registry.leave(&conn("never-joined")).is_none());
    }

    #[test]
    fn survivor_becomes_initiator_for_the_next_pairing() {
        let registry = RoomRegistry::new();
        registry.join(&conn("a"), "alpha");
        registry.join(&conn("b"), "alpha");

        registry.leave(&conn("a"));
        assert_eq!(registry.role_of(&conn("b")), Some(Role::Initiator));

        let (_, outcome) = registry.join(&conn("c"), "alpha");
        assert_eq!(
            outcome,
            JoinOutcome::Ready {
                members: [conn("b"), conn("c")]
            }
        );
        assert_eq!(registry.role_of(&conn("c")), Some(Role::Responder));
    }

    #[test]
    fn rejoining_moves_the_connection_and_notifies_the_old_room() {
        let registry = RoomRegistry::new();
        registry.join(&conn("a"), "alpha");
        registry.join(&conn("b"), "alpha");

        let (prior, outcome) = registry.join(&conn("a"), "beta");
        assert_eq!(outcome, JoinOutcome::Created);
        let prior = prior.unwrap();
        assert_eq!(prior.room_id, "alpha");
        assert_eq!(prior.remaining, Some(conn("b")));
        assert_eq!(registry.member_count("alpha"), 1);
        assert_eq!(registry.member_count("beta"), 1);
    }

    #[test]
    fn member_count_never_exceeds_two() {
        let registry = RoomRegistry::new();
        for i in 0..10 {
            registry.join(&conn(&format!("p{}", i)), "alpha");
            assert!(registry.member_count("alpha") <= Room::CAPACITY);
        }
        for i in 0..10 {
            registry.leave(&conn(&format!("p{}", i)));
        }
        assert!(!registry.room_exists("alpha"));
    }

    #[test]
    fn counterpart_requires_full_room_and_membership() {
        let registry = RoomRegistry::new();
        registry.join(&conn("a"), "alpha");
        assert_eq!(registry.counterpart(&conn("a"), "alpha"), None);

        registry.join(&conn("b"), "alpha");
        assert_eq!(registry.counterpart(&conn("a"), "alpha"), Some(conn("b")));
        assert_eq!(registry.counterpart(&conn("b"), "alpha"), Some(conn("a")));
        assert_eq!(registry.counterpart(&conn("intruder"), "alpha"), None);
        assert_eq!(registry.counterpart(&conn("a"), "other-room"), None);
    }
}
