//! Bearer token sources: a fixed token, or the one the dashboard stored on disk
//! after sign-in.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{ClientError, ClientResult};

/// Supplies the bearer token attached to every request.
pub trait TokenSource: Send + Sync {
    /// `Ok(None)` means "send the request unauthenticated".
    fn token(&self) -> ClientResult<Option<String>>;
}

#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaticToken(***)")
    }
}

impl TokenSource for StaticToken {
    fn token(&self) -> ClientResult<Option<String>> {
        Ok(Some(self.0.clone()))
    }
}

/// Token persisted as a single-line file, by default
/// `{config_dir}/bazaar/token`.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the OS config directory.
    pub fn in_config_dir() -> ClientResult<Self> {
        let base = dirs::config_dir()
            .or_else(|| {
                dirs::home_dir().map(|mut h| {
                    h.push(".config");
                    h
                })
            })
            .ok_or_else(|| ClientError::Token("failed to resolve OS config directory".into()))?;
        Ok(Self::new(base.join("bazaar").join("token")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> ClientResult<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ClientError::Token(format!(
                "failed to read {}: {e}",
                self.path.display()
            ))),
        }
    }

    pub fn save(&self, token: &str) -> ClientResult<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| {
                ClientError::Token(format!("failed to create {}: {e}", dir.display()))
            })?;
        }
        std::fs::write(&self.path, token.trim()).map_err(|e| {
            ClientError::Token(format!("failed to write {}: {e}", self.path.display()))
        })?;
        tracing::debug!(path = %self.path.display(), "stored API token");
        Ok(())
    }

    /// Sign-out. Removing a missing token is not an error.
    pub fn clear(&self) -> ClientResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::Token(format!(
                "failed to remove {}: {e}",
                self.path.display()
            ))),
        }
    }
}

impl TokenSource for FileTokenStore {
    fn token(&self) -> ClientResult<Option<String>> {
        self.load()
    }
}
