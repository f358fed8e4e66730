use crate::errors::ConfigError;
use std::env;

pub const DEFAULT_POCKETBASE_URL: &str = "http://localhost:8091";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub pocketbase_url: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_values(env::var("POCKETBASE_URL").ok(), env::var("PORT").ok())
    }

    fn from_values(url: Option<String>, port: Option<String>) -> Result<Self, ConfigError> {
        let pocketbase_url = url
            .unwrap_or_else(|| DEFAULT_POCKETBASE_URL.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();
        if !(pocketbase_url.starts_with("http://") || pocketbase_url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(pocketbase_url));
        }

        let port = port
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        Ok(Self { pocketbase_url, port })
    }
}
