use std::io;
use thiserror::Error;

/// Error type for the network monitor
#[derive(Error, Debug)]
pub enum NetmonError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("failed to parse network monitoring state, invalid state string {0:?}")]
    InvalidState(String),

    #[error("invalid network scheme {0:?}")]
    InvalidNetworkScheme(String),

    #[error("nodes with stats are empty")]
    EmptyNodes,

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for the network monitor
pub type Result<T> = std::result::Result<T, NetmonError>;

impl NetmonError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        NetmonError::Config(msg.into())
    }

    pub fn invalid_state<S: Into<String>>(state: S) -> Self {
        NetmonError::InvalidState(state.into())
    }

    pub fn invalid_network_scheme<S: Into<String>>(scheme: S) -> Self {
        NetmonError::InvalidNetworkScheme(scheme.into())
    }

    /// Create a fetch error
    pub fn fetch<S: Into<String>>(msg: S) -> Self {
        NetmonError::Fetch(msg.into())
    }
}
