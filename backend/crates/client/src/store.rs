//! Session Storage
//!
//! Where the signed-in identity survives between runs. The stored record is
//! `{token, user, timestamp}`; whether it can still be trusted is decided by
//! [`crate::cache::AuthCache`], not here.

use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::error::ClientResult;

/// The signed-in user as the API reports it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_seller: bool,
    /// Seller profile and timestamps, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_true() -> bool {
    true
}

impl SessionUser {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub token: String,
    pub user: SessionUser,
    /// When the entry was written
    pub timestamp: DateTime<Utc>,
}

#[trait_variant::make(SessionStore: Send)]
pub trait LocalSessionStore {
    async fn load(&self) -> ClientResult<Option<SessionEntry>>;

    async fn save(&self, entry: &SessionEntry) -> ClientResult<()>;

    async fn clear(&self) -> ClientResult<()>;
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entry: RwLock<Option<SessionEntry>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    async fn load(&self) -> ClientResult<Option<SessionEntry>> {
        Ok(self.entry.read().await.clone())
    }

    async fn save(&self, entry: &SessionEntry) -> ClientResult<()> {
        *self.entry.write().await = Some(entry.clone());
        Ok(())
    }

    async fn clear(&self) -> ClientResult<()> {
        *self.entry.write().await = None;
        Ok(())
    }
}

/// JSON file on disk, replaced atomically on every save
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl SessionStore for FileSessionStore {
    async fn load(&self) -> ClientResult<Option<SessionEntry>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        // A damaged file is the same as no session
        match serde_json::from_slice(&bytes) {
            Ok(entry) => Ok(Some(entry)),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Discarding unreadable session file");
                Ok(None)
            }
        }
    }

    async fn save(&self, entry: &SessionEntry) -> ClientResult<()> {
        let bytes = serde_json::to_vec(entry)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, bytes).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        Ok(())
    }

    async fn clear(&self) -> ClientResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
