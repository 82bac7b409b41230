use crate::signaling::SignalingChannel;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Server-assigned identifier for one connected participant.
pub type ConnectionId = String;

/// Live signaling channels keyed by connection id.
pub type ChannelMap = Arc<RwLock<HashMap<ConnectionId, Arc<dyn SignalingChannel>>>>;
