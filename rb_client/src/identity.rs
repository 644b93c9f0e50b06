//! Persistent client identity.
//!
//! The server recognizes a returning client by an opaque id. It is created
//! once, kept across restarts and replaced when the server issues another.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Mutex,
};
use thiserror::Error;

/// Errors raised by an identity store
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("failed to read identity from {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write identity to {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// Local storage for the client id.
pub trait IdentityStore: Send + Sync {
    /// The stored id, if any.
    fn load(&self) -> Result<Option<String>, IdentityError>;

    fn save(&self, id: &str) -> Result<(), IdentityError>;
}

/// Identity kept in a plain text file.
#[derive(Clone, Debug)]
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl IdentityStore for FileIdentityStore {
    fn load(&self) -> Result<Option<String>, IdentityError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let id = contents.trim();
                Ok((!id.is_empty()).then(|| id.to_string()))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(IdentityError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn save(&self, id: &str) -> Result<(), IdentityError> {
        fs::write(&self.path, id).map_err(|source| IdentityError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

/// Identity that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    id: Mutex<Option<String>>,
}

impl MemoryIdentityStore {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Mutex::new(Some(id.into())),
        }
    }

    /// Current id, for inspection.
    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.id.lock().map(|id| id.clone()).unwrap_or_default()
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn load(&self) -> Result<Option<String>, IdentityError> {
        Ok(self.current())
    }

    fn save(&self, id: &str) -> Result<(), IdentityError> {
        if let Ok(mut slot) = self.id.lock() {
            *slot = Some(id.to_string());
        }
        Ok(())
    }
}
