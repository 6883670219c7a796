//! Process configuration.
//!
//! Everything the two processes read from the environment is resolved once in
//! [`BridgeConfig::from_env`] and passed down explicitly; no other module
//! touches the environment.

use crate::error::{BridgeError, Result};

/// Default listening port for the tool server.
pub const DEFAULT_PORT: u16 = 8000;

/// Default MCP endpoint the chat client connects to.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/sse";

/// Configuration shared by the chat client and the tool server.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    google_api_key: Option<String>,
    google_base_url: Option<String>,
    port: u16,
    endpoints: Vec<String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl BridgeConfig {
    /// Create a config with defaults and no credential.
    pub fn new() -> Self {
        Self {
            google_api_key: None,
            google_base_url: None,
            port: DEFAULT_PORT,
            endpoints: vec![DEFAULT_ENDPOINT.to_string()],
        }
    }

    /// Load from the environment (`GOOGLE_API_KEY`/`GEMINI_API_KEY`,
    /// `GOOGLE_BASE_URL`, `PORT`), reading a `.env` file first if one is
    /// present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let mut config = Self::new();

        for var in ["GOOGLE_API_KEY", "GEMINI_API_KEY"] {
            if let Ok(key) = std::env::var(var) {
                config.google_api_key = Some(key);
                break;
            }
        }

        // Points the Gemini client at a proxy or a local mock.
        if let Ok(url) = std::env::var("GOOGLE_BASE_URL") {
            config.google_base_url = Some(url);
        }

        if let Ok(port) = std::env::var("PORT") {
            match port.parse() {
                Ok(p) => config.port = p,
                Err(_) => tracing::warn!(%port, "ignoring unparseable PORT override"),
            }
        }

        config
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.google_api_key = Some(key.into());
        self
    }

    pub fn with_google_base_url(mut self, url: impl Into<String>) -> Self {
        self.google_base_url = Some(url.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_endpoints(mut self, endpoints: Vec<String>) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn google_base_url(&self) -> Option<&str> {
        self.google_base_url.as_deref()
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Resolve the model credential. Absence is fatal at client startup.
    pub fn require_google_api_key(&self) -> Result<&str> {
        self.google_api_key.as_deref().ok_or_else(|| {
            BridgeError::Configuration(
                "GOOGLE_API_KEY environment variable not set. Add it to your environment or .env file.".into(),
            )
        })
    }
}
