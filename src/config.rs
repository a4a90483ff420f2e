use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_FORWARD_URL: &str = "http://localhost:8080/";
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama2:7b";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("RELAY_MODE must be \"answer\" or \"forward\", got {0:?}")]
    UnknownMode(String),

    #[error("HOST is not a valid IP address: {0:?}")]
    InvalidHost(String),
}

/// Where the generated answer goes once the model has produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayMode {
    Answer,
    Forward,
}

impl FromStr for RelayMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "answer" => Ok(Self::Answer),
            "forward" => Ok(Self::Forward),
            _ => Err(ConfigError::UnknownMode(value.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub base_url: String,
    pub model: String,
    pub stream_to_console: bool,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub mode: RelayMode,
    pub forward_url: String,
    pub model: ModelConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = match lookup("HOST") {
            Some(value) => value
                .parse::<IpAddr>()
                .map_err(|_| ConfigError::InvalidHost(value))?,
            None => IpAddr::from([0, 0, 0, 0]),
        };

        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let mode = match lookup("RELAY_MODE") {
            Some(value) => value.parse()?,
            None => RelayMode::Answer,
        };

        let forward_url =
            lookup("FORWARD_URL").unwrap_or_else(|| DEFAULT_FORWARD_URL.to_string());

        let model = ModelConfig {
            base_url: lookup("OLLAMA_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OLLAMA_BASE_URL.to_string()),
            model: lookup("OLLAMA_MODEL").unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
            stream_to_console: lookup("MODEL_STREAM_TO_CONSOLE")
                .and_then(|value| parse_flag(&value))
                .unwrap_or(true),
            timeout: lookup("MODEL_TIMEOUT_MS")
                .and_then(|value| value.parse::<u64>().ok())
                .map(Duration::from_millis),
        };

        Ok(Self {
            host,
            port,
            mode,
            forward_url,
            model,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
