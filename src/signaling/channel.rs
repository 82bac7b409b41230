use crate::signaling::messages::ServerMessage;
use crate::utils::Result;
use async_trait::async_trait;
use futures_util::stream::SplitSink;
use futures_util::SinkExt;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

/// One participant's outbound half of the signaling connection. The broker
/// only ever pushes named events through it; everything else about the
/// transport is the implementor's business.
#[async_trait]
pub trait SignalingChannel: Send + Sync {
    async fn send(&self, event: &ServerMessage) -> Result<()>;
}

/// WebSocket-backed channel used by the real server. Writes are serialized
/// behind a mutex so events from different tasks cannot interleave.
pub struct WebSocketChannel {
    sink: Mutex<SplitSink<WebSocketStream<TcpStream>, Message>>,
}

impl WebSocketChannel {
    pub fn new(sink: SplitSink<WebSocketStream<TcpStream>, Message>) -> Arc<Self> {
        Arc::new(Self {
            sink: Mutex::new(sink),
        })
    }
}

#[async_trait]
impl SignalingChannel for WebSocketChannel {
    async fn send(&self, event: &ServerMessage) -> Result<()> {
        let json = serde_json::to_string(event)?;
        let mut sink = self.sink.lock().await;
        sink.send(Message::Text(json)).await?;
        Ok(())
    }
}
