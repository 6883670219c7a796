//! Error types for docbridge.

use thiserror::Error;

/// Primary error type for all docbridge operations.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl BridgeError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Whether this error means nobody is listening at the configured MCP
    /// endpoint. A refusal at the tool-transport layer ends the interactive
    /// session with guidance instead of being reported as a recoverable
    /// per-turn error; model-API faults stay per-turn.
    pub fn is_connection_refused(&self) -> bool {
        match self {
            Self::Transport(message) => {
                message.to_ascii_lowercase().contains("connection refused")
            }
            _ => false,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, BridgeError>;
