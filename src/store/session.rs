//! Client-side persisted session: the auth token and the user blob.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StoredSession {
    pub token: Option<String>,
    pub user: Option<Value>,
}

pub trait SessionStorage: Send + Sync {
    fn token(&self) -> Option<String>;
    /// Forgets token and user, as on logout or an expired session.
    fn clear(&self);
}

#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    inner: RwLock<StoredSession>,
}

impl MemorySessionStorage {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            inner: RwLock::new(StoredSession {
                token: Some(token.into()),
                user: None,
            }),
        }
    }

    pub fn set_session(&self, session: StoredSession) {
        *self.inner.write() = session;
    }

    pub fn session(&self) -> StoredSession {
        self.inner.read().clone()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn token(&self) -> Option<String> {
        self.inner.read().token.clone().filter(|t| !t.is_empty())
    }

    fn clear(&self) {
        *self.inner.write() = StoredSession::default();
    }
}

/// Session kept in a JSON file, re-read on every access so that another
/// process logging in or out is picked up on the next fetch.
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self) -> StoredSession {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("Ignoring unreadable session file {}: {}", self.path.display(), e);
                StoredSession::default()
            }),
            Err(_) => StoredSession::default(),
        }
    }

    pub fn save(&self, session: &StoredSession) -> std::io::Result<()> {
        let content = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, content)
    }
}

impl SessionStorage for FileSessionStorage {
    fn token(&self) -> Option<String> {
        self.load().token.filter(|t| !t.is_empty())
    }

    fn clear(&self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Could not remove session file {}: {}", self.path.display(), e);
            }
        }
    }
}
