//! Persisted credential storage.
//!
//! The console persists three values between runs: the access `token`, the
//! `refreshToken`, and the serialized `identity`. Each is either absent or a
//! string. [`Session::restore`](crate::Session::restore) reads them and
//! clears them all when they cannot be trusted.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Error type for credential storage.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Reading or writing the backing file failed.
    #[error("credential store i/o error at {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    /// The backing file exists but is not a valid credential document.
    #[error("credential store at {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Result type for credential storage.
pub type Result<T> = std::result::Result<T, CredentialError>;

/// Keys of the persisted credential surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CredentialKey {
    /// Bearer access token.
    Token,
    /// Refresh token exchanged for a new pair on `401`.
    RefreshToken,
    /// JSON-serialized [`Identity`](vellum_types::Identity).
    Identity,
}

impl CredentialKey {
    /// Every key, in storage order.
    pub const ALL: [CredentialKey; 3] = [Self::Token, Self::RefreshToken, Self::Identity];

    /// Returns the storage name of this key.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::RefreshToken => "refreshToken",
            Self::Identity => "identity",
        }
    }
}

impl fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key/value surface for persisted credentials.
pub trait CredentialStore {
    /// Returns the stored value for `key`, if any.
    fn get(&self, key: CredentialKey) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: CredentialKey, value: &str) -> Result<()>;

    /// Removes `key`. Removing an absent key succeeds.
    fn remove(&mut self, key: CredentialKey) -> Result<()>;

    /// Removes every key.
    fn clear(&mut self) -> Result<()> {
        for key in CredentialKey::ALL {
            self.remove(key)?;
        }
        Ok(())
    }
}

// ============================================================================
// In-Memory Store
// ============================================================================

/// Credential store that lives only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    values: BTreeMap<CredentialKey, String>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether no key is stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: CredentialKey) -> Result<Option<String>> {
        Ok(self.values.get(&key).cloned())
    }

    fn set(&mut self, key: CredentialKey, value: &str) -> Result<()> {
        self.values.insert(key, value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: CredentialKey) -> Result<()> {
        self.values.remove(&key);
        Ok(())
    }
}

// ============================================================================
// File Store
// ============================================================================

/// Credential store backed by a small JSON document on disk.
///
/// The file is read on every access and rewritten on every change, so two
/// console processes see each other's logins and logouts. A missing file is
/// an empty store; an unparsable file surfaces [`CredentialError::Corrupt`]
/// until it is cleared.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(CredentialError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_str(&raw).map_err(|source| CredentialError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Like [`Self::load`], but a corrupt document is replaced rather than
    /// merged into.
    fn load_for_write(&self) -> Result<BTreeMap<String, String>> {
        match self.load() {
            Err(CredentialError::Corrupt { .. }) => Ok(BTreeMap::new()),
            other => other,
        }
    }

    fn save(&self, values: &BTreeMap<String, String>) -> Result<()> {
        let io_err = |source: io::Error| CredentialError::Io {
            path: self.path.clone(),
            source,
        };

        if values.is_empty() {
            return match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(io_err(e)),
            };
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        // serde_json cannot fail on a map of strings
        let body = serde_json::to_string_pretty(values).unwrap_or_default();
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, body).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: CredentialKey) -> Result<Option<String>> {
        Ok(self.load()?.remove(key.as_str()))
    }

    fn set(&mut self, key: CredentialKey, value: &str) -> Result<()> {
        let mut values = self.load_for_write()?;
        values.insert(key.as_str().to_string(), value.to_string());
        self.save(&values)
    }

    fn remove(&mut self, key: CredentialKey) -> Result<()> {
        let mut values = self.load_for_write()?;
        values.remove(key.as_str());
        self.save(&values)
    }

    fn clear(&mut self) -> Result<()> {
        debug!(path = %self.path.display(), "Clearing persisted credentials");
        self.save(&BTreeMap::new())
    }
}
