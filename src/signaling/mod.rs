pub mod channel;
pub mod handler;
pub mod messages;
pub mod relay;
pub mod server;

pub use channel::{SignalingChannel, WebSocketChannel};
pub use handler::MessageHandler;
pub use messages::{ClientMessage, ServerMessage};
pub use relay::{NegotiationMessage, NegotiationRelay};
pub use server::SignalingServer;
