//! Secret resolution: process environment first, then a secrets file
//!
//! The secrets file uses dotenv syntax and is read without touching the
//! process environment.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Environment variable naming the secrets file
pub const SECRETS_FILE_ENV: &str = "ADVISOR_SECRETS_FILE";

/// Secrets file used when [`SECRETS_FILE_ENV`] is not set
pub const DEFAULT_SECRETS_FILE: &str = ".secrets";

/// Errors raised while reading the secrets file
#[derive(Debug, Error)]
pub enum SecretsError {
    /// The file exists but could not be parsed
    #[error("failed to read secrets file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
}

/// File-backed secrets store
#[derive(Debug, Clone)]
pub struct SecretsStore {
    path: PathBuf,
}

impl SecretsStore {
    /// Create a store backed by the given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a store from `ADVISOR_SECRETS_FILE`, defaulting to `.secrets`
    pub fn from_env() -> Self {
        let path = std::env::var(SECRETS_FILE_ENV)
            .ok()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SECRETS_FILE.to_string());
        Self::new(path)
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up a secret; a missing file is an empty store
    pub fn get(&self, name: &str) -> Result<Option<String>, SecretsError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "secrets file not present");
            return Ok(None);
        }

        let unreadable = |source| SecretsError::Unreadable {
            path: self.path.clone(),
            source,
        };

        for item in dotenvy::from_path_iter(&self.path).map_err(unreadable)? {
            let (key, value) = item.map_err(unreadable)?;
            if key == name {
                return Ok(non_empty(value));
            }
        }

        Ok(None)
    }
}

/// Resolve a secret from the environment, then from the store
///
/// Empty values count as absent.
pub fn resolve_secret(name: &str, store: &SecretsStore) -> Result<Option<String>, SecretsError> {
    if let Some(value) = std::env::var(name).ok().and_then(non_empty) {
        debug!(secret = name, "resolved from environment");
        return Ok(Some(value));
    }

    let value = store.get(name)?;
    if value.is_some() {
        debug!(secret = name, path = %store.path().display(), "resolved from secrets file");
    }
    Ok(value)
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() { None } else { Some(value) }
}
