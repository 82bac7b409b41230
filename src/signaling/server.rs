use crate::config::ServerConfig;
use crate::signaling::channel::WebSocketChannel;
use crate::signaling::handler::MessageHandler;
use crate::signaling::messages::ClientMessage;
use crate::utils::Result;
use futures_util::StreamExt;
use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use uuid::Uuid;
use warp::Filter;

/// Accepts signaling connections and runs one read loop per participant.
/// Connection ids are assigned here; clients never pick their own.
pub struct SignalingServer {
    address: String,
    handler: Arc<MessageHandler>,
}

impl SignalingServer {
    pub fn new(address: &str, handler: Arc<MessageHandler>) -> Self {
        Self {
            address: address.to_string(),
            handler,
        }
    }

    pub async fn start(&self) -> Result<()> {
        let listener = TcpListener::bind(&self.address).await?;
        info!("Signaling server listening on {}", self.address);

        while let Ok((stream, addr)) = listener.accept().await {
            debug!("New connection from {}", addr);
            let handler = self.handler.clone();
            tokio::spawn(async move {
                if let Err(e) = Self::handle_connection(stream, handler).await {
                    error!("Connection error: {}", e);
                }
            });
        }

        Ok(())
    }

    async fn handle_connection(stream: TcpStream, handler: Arc<MessageHandler>) -> Result<()> {
        let ws_stream = accept_async(stream).await?;
        let (ws_sender, mut ws_receiver) = ws_stream.split();

        let connection_id = Uuid::new_v4().to_string();
        let channel = WebSocketChannel::new(ws_sender);
        handler.register(connection_id.clone(), channel).await;
        info!("Connection {} registered", connection_id);

        while let Some(msg) = ws_receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    warn!("Read error on {}: {}", connection_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(message) => {
                        if let Err(e) = handler.handle_message(&connection_id, message).await {
                            warn!("Error handling message from {}: {}", connection_id, e);
                        }
                    }
                    // A malformed frame never tears down the session.
                    Err(e) => warn!("Ignoring malformed message from {}: {}", connection_id, e),
                },
                Message::Close(_) => break,
                _ => {}
            }
        }

        handler.handle_disconnect(&connection_id).await?;
        info!("Connection {} closed", connection_id);
        Ok(())
    }
}

/// Small HTTP side-car serving the ICE server list and a liveness probe.
/// Clients fetch `/config` once before opening their media transport.
pub async fn run_config_server(config: ServerConfig) {
    let port = config.http_port;
    let ice_servers = config.ice_servers;

    let config_route = warp::path!("config").and(warp::get()).map(move || {
        warp::reply::json(&serde_json::json!({ "iceServers": ice_servers }))
    });
    let health_route = warp::path!("healthz")
        .and(warp::get())
        .map(|| warp::reply::reply());

    info!("Config endpoint listening on port {}", port);
    warp::serve(config_route.or(health_route))
        .run(([0, 0, 0, 0], port))
        .await;
}
