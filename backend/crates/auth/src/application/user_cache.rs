//! User Cache
//!
//! Short-lived read-through cache from user id to user record, consulted by
//! the request gate. Entries expire after the configured TTL and are dropped
//! explicitly whenever a user is changed, deactivated or deleted.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use kernel::clock::Clock;
use kernel::id::UserId;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::error::AuthResult;

#[derive(Debug, Clone)]
struct Entry {
    user: User,
    loaded_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct UserCache {
    entries: Arc<DashMap<UserId, Entry>>,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl UserCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl: chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::seconds(30)),
            clock,
        }
    }

    /// Cached user if the entry is still fresh
    pub fn get(&self, id: UserId) -> Option<User> {
        let now = self.clock.now();
        let entry = self.entries.get(&id)?;
        if now - entry.loaded_at < self.ttl {
            return Some(entry.user.clone());
        }
        drop(entry);
        self.entries.remove(&id);
        None
    }

    pub fn put(&self, user: User) {
        let entry = Entry {
            loaded_at: self.clock.now(),
            user,
        };
        self.entries.insert(entry.user.id, entry);
    }

    pub fn invalidate(&self, id: UserId) {
        if self.entries.remove(&id).is_some() {
            tracing::debug!(user_id = %id, "User cache entry invalidated");
        }
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read through to `repo`. With `fresh` the cache is skipped and the
    /// reloaded record replaces whatever was cached.
    pub async fn get_or_load<R>(&self, repo: &R, id: UserId, fresh: bool) -> AuthResult<Option<User>>
    where
        R: UserRepository,
    {
        if !fresh {
            if let Some(user) = self.get(id) {
                return Ok(Some(user));
            }
        }

        match repo.find_by_id(id).await? {
            Some(user) => {
                self.put(user.clone());
                Ok(Some(user))
            }
            None => {
                self.invalidate(id);
                Ok(None)
            }
        }
    }
}
