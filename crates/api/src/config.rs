//! Server configuration from the environment.

use std::net::SocketAddr;

use thiserror::Error;

pub const BIND_ADDR_ENV: &str = "BAZAAR_BIND_ADDR";
pub const SERVICE_NAME_ENV: &str = "BAZAAR_SERVICE_NAME";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_SERVICE_NAME: &str = "bazaar-api";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub service_name: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let raw_addr = get(BIND_ADDR_ENV).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr.parse().map_err(|e| ConfigError::Invalid {
            key: BIND_ADDR_ENV,
            reason: format!("'{raw_addr}': {e}"),
        })?;

        Ok(Self {
            bind_addr,
            service_name: get(SERVICE_NAME_ENV).unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.service_name, DEFAULT_SERVICE_NAME);
    }

    #[test]
    fn overrides_and_errors() {
        let config = ServerConfig::from_lookup(|key| match key {
            BIND_ADDR_ENV => Some("127.0.0.1:9090".to_string()),
            SERVICE_NAME_ENV => Some("bazaar-staging".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.bind_addr.port(), 9090);
        assert_eq!(config.service_name, "bazaar-staging");

        let err = ServerConfig::from_lookup(|key| {
            (key == BIND_ADDR_ENV).then(|| "not-an-addr".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: BIND_ADDR_ENV, .. }));
    }
}
