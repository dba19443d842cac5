//! Client configuration, read once from the environment.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const API_URL_ENV: &str = "BAZAAR_API_URL";
pub const API_TOKEN_ENV: &str = "BAZAAR_API_TOKEN";
pub const TOKEN_FILE_ENV: &str = "BAZAAR_TOKEN_FILE";
pub const HTTP_TIMEOUT_ENV: &str = "BAZAAR_HTTP_TIMEOUT_SECS";
pub const DASHBOARD_REFRESH_ENV: &str = "BAZAAR_DASHBOARD_REFRESH_SECS";

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_DASHBOARD_REFRESH: Duration = Duration::from_secs(60);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL without a trailing slash.
    pub api_url: String,
    pub api_token: Option<String>,
    pub token_file: Option<PathBuf>,
    pub http_timeout: Duration,
    pub dashboard_refresh: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            token_file: None,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            dashboard_refresh: DEFAULT_DASHBOARD_REFRESH,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset or blank keys take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_url = match get(API_URL_ENV) {
            Some(url) => parse_url(&url)?,
            None => DEFAULT_API_URL.to_string(),
        };

        Ok(Self {
            api_url,
            api_token: get(API_TOKEN_ENV),
            token_file: get(TOKEN_FILE_ENV).map(PathBuf::from),
            http_timeout: parse_secs(
                HTTP_TIMEOUT_ENV,
                get(HTTP_TIMEOUT_ENV),
                DEFAULT_HTTP_TIMEOUT,
            )?,
            dashboard_refresh: parse_secs(
                DASHBOARD_REFRESH_ENV,
                get(DASHBOARD_REFRESH_ENV),
                DEFAULT_DASHBOARD_REFRESH,
            )?,
        })
    }
}

fn parse_url(raw: &str) -> Result<String, ConfigError> {
    let url = raw.trim_end_matches('/');
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::Invalid {
            key: API_URL_ENV,
            reason: format!("'{raw}' is not an http(s) URL"),
        });
    }
    Ok(url.to_string())
}

fn parse_secs(
    key: &'static str,
    raw: Option<String>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid {
            key,
            reason: "must be at least 1 second".to_string(),
        }),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
    }
}
