use std::error::Error as StdError;
use std::fmt;
use std::net::AddrParseError;

#[derive(Debug)]
pub enum Error {
    WebSocket(tokio_tungstenite::tungstenite::Error),
    Json(serde_json::Error),
    Io(std::io::Error),
    AddrParse(AddrParseError),
    /// Relay target has no counterpart or the sender is not a room member.
    Route(String),
    /// Candidate or parameter application failed at the transport boundary.
    Transport(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::WebSocket(e) => write!(f, "WebSocket error: {}", e),
            Error::Json(e) => write!(f, "JSON error: {}", e),
            Error::Io(e) => write!(f, "IO error: {}", e),
            Error::AddrParse(e) => write!(f, "Address parse error: {}", e),
            Error::Route(e) => write!(f, "Invalid route: {}", e),
            Error::Transport(e) => write!(f, "Transport apply failure: {}", e),
        }
    }
}

impl StdError for Error {}

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Error::WebSocket(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Json(error)
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::Io(error)
    }
}

impl From<AddrParseError> for Error {
    fn from(error: AddrParseError) -> Self {
        Error::AddrParse(error)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
