use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// Full URL of the text generation endpoint.
    pub gemma_url: String,
    pub gemma_api_key: Option<String>,
    /// rosbridge WebSocket URL (`ws://` or `wss://`).
    pub bridge_url: String,
    pub bridge_connect_timeout: Duration,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let gemma_url = std::env::var("GEMMA_URL")
            .map_err(|_| ConfigError::MissingVar("GEMMA_URL".to_string()))?;
        if !(gemma_url.starts_with("http://") || gemma_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue(
                "GEMMA_URL".to_string(),
                format!("'{}' is not an http(s) URL", gemma_url),
            ));
        }

        let gemma_api_key = std::env::var("GEMMA_API_KEY")
            .ok()
            .filter(|key| !key.is_empty());

        let bridge_url = std::env::var("ROS2_WS_URL")
            .map_err(|_| ConfigError::MissingVar("ROS2_WS_URL".to_string()))?;
        if !(bridge_url.starts_with("ws://") || bridge_url.starts_with("wss://")) {
            return Err(ConfigError::InvalidValue(
                "ROS2_WS_URL".to_string(),
                format!("'{}' is not a ws(s) URL", bridge_url),
            ));
        }

        let timeout_str =
            std::env::var("BRIDGE_CONNECT_TIMEOUT_SECS").unwrap_or_else(|_| "10".to_string());
        let bridge_connect_timeout = timeout_str
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| {
                ConfigError::InvalidValue("BRIDGE_CONNECT_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            bind_address,
            gemma_url,
            gemma_api_key,
            bridge_url,
            bridge_connect_timeout,
            log_level,
        })
    }
}
