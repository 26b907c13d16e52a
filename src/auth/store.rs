//! Durable token storage.
//!
//! The session keeps its tokens in memory and mirrors every change into a
//! [`TokenStore`], so a restarted process can pick the session back up with
//! `client.auth().restore()`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::SdkError;

/// Persisted session record. Field names match the keys the web client uses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTokens {
    #[serde(rename = "token", default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(rename = "refreshToken", default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl StoredTokens {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

/// Where session tokens live between runs.
///
/// Methods are called synchronously from async code, after the session's
/// state lock has been released. Requests keep flowing during a write, but
/// the calling task is blocked for its duration, so keep writes small.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<StoredTokens, SdkError>;
    fn save(&self, tokens: &StoredTokens) -> Result<(), SdkError>;
    fn clear(&self) -> Result<(), SdkError>;
}

/// Process-local store. The default; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<StoredTokens>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<StoredTokens, SdkError> {
        Ok(self.tokens.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, tokens: &StoredTokens) -> Result<(), SdkError> {
        *self.tokens.lock().unwrap_or_else(|e| e.into_inner()) = tokens.clone();
        Ok(())
    }

    fn clear(&self) -> Result<(), SdkError> {
        *self.tokens.lock().unwrap_or_else(|e| e.into_inner()) = StoredTokens::default();
        Ok(())
    }
}

/// JSON file store: `{"token": "...", "refreshToken": "..."}`.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<StoredTokens, SdkError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoredTokens::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, tokens: &StoredTokens) -> Result<(), SdkError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let bytes = serde_json::to_vec_pretty(tokens)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SdkError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
