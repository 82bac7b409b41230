use anyhow::Result;
use clap::{Arg, Command};
use log::info;
use paircall_server::config::ServerConfig;
use paircall_server::room::RoomRegistry;
use paircall_server::signaling::server::run_config_server;
use paircall_server::{MessageHandler, SignalingServer};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let matches = Command::new("paircall-server")
        .about("Signaling broker for two-party real-time calls")
        .arg(
            Arg::new("address")
                .long("address")
                .takes_value(true)
                .help("WebSocket bind address, overrides BIND_ADDR"),
        )
        .get_matches();

    let mut config = ServerConfig::from_env();
    if let Some(address) = matches.get_one::<String>("address") {
        config.bind_addr = address.clone();
    }

    let registry = Arc::new(RoomRegistry::new());
    let handler = Arc::new(MessageHandler::new(registry));
    let server = SignalingServer::new(&config.bind_addr, handler);

    info!("Starting paircall server on {}", config.bind_addr);
    tokio::spawn(run_config_server(config.clone()));

    server.start().await?;
    Ok(())
}
