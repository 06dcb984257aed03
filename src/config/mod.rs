//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::game::{Tuning, ViewConfig};

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Allowed client origins for CORS, comma-separated. `*` allows any.
    pub client_origin: String,

    /// Seconds without interaction before a session token expires
    pub idle_timeout_secs: u64,
    /// Action requests allowed per second across all clients
    pub action_rate_limit: u32,
    /// Per-request timeout
    pub request_timeout_secs: u64,

    /// Gameplay tuning
    pub tuning: Tuning,
    /// Screen and camera settings
    pub view: ViewConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            log_level: "info".to_string(),
            client_origin: "*".to_string(),
            idle_timeout_secs: 900,
            action_rate_limit: 20,
            request_timeout_secs: 10,
            tuning: Tuning::default(),
            view: ViewConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup, falling back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        // Render provides PORT env var, fall back to SERVER_ADDR or default
        let server_addr = match (lookup("PORT"), lookup("SERVER_ADDR")) {
            (Some(port), _) => format!("0.0.0.0:{}", port.trim())
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,
            (None, Some(addr)) => addr.trim().parse().map_err(|_| ConfigError::InvalidAddress)?,
            (None, None) => defaults.server_addr,
        };

        Ok(Self {
            server_addr,
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            client_origin: lookup("CLIENT_ORIGIN").unwrap_or(defaults.client_origin),
            idle_timeout_secs: parse_or(&lookup, "IDLE_TIMEOUT_SECS", defaults.idle_timeout_secs)?,
            action_rate_limit: parse_or(&lookup, "ACTION_RATE_LIMIT", defaults.action_rate_limit)?,
            request_timeout_secs: parse_or(&lookup, "REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs)?,
            tuning: defaults.tuning,
            view: defaults.view,
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Invalid server address format")]
    InvalidAddress,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.server_addr.port(), 8080);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.client_origin, "*");
        assert_eq!(config.idle_timeout_secs, 900);
        assert_eq!(config.action_rate_limit, 20);
        assert_eq!(config.view, ViewConfig::default());
    }

    #[test]
    fn port_wins_over_server_addr() {
        let config = Config::from_lookup(lookup(&[("PORT", "3000"), ("SERVER_ADDR", "127.0.0.1:9000")])).unwrap();
        assert_eq!(config.server_addr.port(), 3000);

        let config = Config::from_lookup(lookup(&[("SERVER_ADDR", "127.0.0.1:9000")])).unwrap();
        assert_eq!(config.server_addr.to_string(), "127.0.0.1:9000");
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(matches!(
            Config::from_lookup(lookup(&[("PORT", "eighty")])),
            Err(ConfigError::InvalidAddress)
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("IDLE_TIMEOUT_SECS", "-1")])),
            Err(ConfigError::Invalid("IDLE_TIMEOUT_SECS"))
        ));
    }
}
