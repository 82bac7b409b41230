pub mod registry;
pub mod state;

pub use registry::{JoinOutcome, LeaveNotice, RoomRegistry};
pub use state::{ParticipantRef, Role, Room};
