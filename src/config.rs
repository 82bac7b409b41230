use serde::Serialize;
use std::env;

/// One entry of the ICE server list handed to clients over `/config`.
#[derive(Debug, Clone, Serialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

impl IceServerConfig {
    fn stun(url: &str) -> Self {
        Self {
            urls: vec![url.to_string()],
            username: None,
            credential: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub http_port: u16,
    pub ice_servers: Vec<IceServerConfig>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let mut ice_servers = vec![
            IceServerConfig::stun("stun:stun.l.google.com:19302"),
            IceServerConfig::stun("stun:stun1.l.google.com:19302"),
        ];

        // A TURN relay is only advertised when all three variables are set.
        if let (Ok(url), Ok(user), Ok(pass)) = (
            env::var("TURN_URL"),
            env::var("TURN_USER"),
            env::var("TURN_PASS"),
        ) {
            ice_servers.push(IceServerConfig {
                urls: vec![url],
                username: Some(user),
                credential: Some(pass),
            });
        }

        Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            http_port: env::var("HTTP_PORT")
                .unwrap_or_else(|_| "8081".to_string())
                .parse()
                .unwrap_or(8081),
            ice_servers,
        }
    }
}
