use serde::{Deserialize, Serialize};
use thiserror::Error;

use bazaar_auth::AuthzError;
use bazaar_core::DomainError;

use crate::config::ConfigError;

pub type ClientResult<T> = Result<T, ClientError>;

/// Everything a dashboard action can fail with.
///
/// `Validation`, `Forbidden`, `InvalidTransition` and `Stale` are raised
/// before the state-changing request leaves the client. `Api` and `Network`
/// come back from the wire and are shown to the user the same way.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// The record changed since the caller loaded it.
    #[error("stale record: {0}")]
    Stale(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("token storage error: {0}")]
    Token(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ClientError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// True when the request never left the client.
    pub fn is_client_side(&self) -> bool {
        matches!(
            self,
            ClientError::Validation(_)
                | ClientError::Forbidden(_)
                | ClientError::InvalidTransition(_)
                | ClientError::Stale(_)
        )
    }

    /// The toast shown for a failed `action` (e.g. "update product status").
    ///
    /// Form validation messages are shown verbatim; everything else gets the
    /// generic retry prompt.
    pub fn notice(&self, action: &str) -> Notice {
        match self {
            ClientError::Validation(msg) => Notice::error(msg.clone()),
            ClientError::Forbidden(_) => {
                Notice::error(format!("You are not allowed to {action}."))
            }
            _ => Notice::error(format!("Failed to {action}. Please try again.")),
        }
    }
}

impl From<DomainError> for ClientError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => {
                ClientError::Validation(msg)
            }
            DomainError::InvariantViolation(msg) | DomainError::Conflict(msg) => {
                ClientError::InvalidTransition(msg)
            }
            DomainError::NotFound => ClientError::api(404, "not found"),
        }
    }
}

impl From<AuthzError> for ClientError {
    fn from(err: AuthzError) -> Self {
        ClientError::Forbidden(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}
