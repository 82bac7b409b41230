pub mod config;
pub mod media;
pub mod room;
pub mod signaling;
pub mod types;
pub mod utils;

// Re-export main types for convenience
pub use media::{CallSession, MediaTransport, QualityController};
pub use room::RoomRegistry;
pub use signaling::{MessageHandler, SignalingServer};
