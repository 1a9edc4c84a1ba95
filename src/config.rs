//! Process configuration, read from the environment at startup.

use std::net::SocketAddr;

use thiserror::Error;

pub const ADDR_VAR: &str = "STAR_LEDGER_ADDR";
pub const LOG_VAR: &str = "RUST_LOG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{}={value:?} is not a socket address", ADDR_VAR)]
    InvalidAddr { value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub listen_addr: SocketAddr,
    /// `tracing_subscriber::EnvFilter` directive.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(value) = lookup(ADDR_VAR) {
            config.listen_addr = value
                .parse()
                .map_err(|_| ConfigError::InvalidAddr { value })?;
        }
        if let Some(filter) = lookup(LOG_VAR).filter(|f| !f.trim().is_empty()) {
            config.log_filter = filter;
        }
        Ok(config)
    }
}
