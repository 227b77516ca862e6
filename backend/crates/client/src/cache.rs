//! Auth Cache
//!
//! Decides whether a stored session can be used without asking the server.
//! An entry is trusted only while its token has not expired and it was
//! written less than the freshness window ago.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use kernel::clock::Clock;
use serde::Deserialize;

use crate::error::ClientResult;
use crate::store::{SessionEntry, SessionStore, SessionUser};

#[derive(Deserialize)]
struct Claims {
    exp: i64,
}

/// Expiry embedded in a JWT. The signature is not checked; the server does
/// that on every request.
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    DateTime::from_timestamp(claims.exp, 0)
}

pub struct AuthCache<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    freshness: Duration,
}

impl<S> Clone for AuthCache<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            clock: self.clock.clone(),
            freshness: self.freshness,
        }
    }
}

impl<S> AuthCache<S>
where
    S: SessionStore + Sync,
{
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, freshness: Duration) -> Self {
        Self {
            store,
            clock,
            freshness,
        }
    }

    pub fn is_valid(&self, entry: &SessionEntry) -> bool {
        let now = self.clock.now();
        let unexpired = token_expiry(&entry.token).is_some_and(|exp| exp > now);
        unexpired && now - entry.timestamp < self.freshness
    }

    /// Whatever is stored, trusted or not
    pub async fn load(&self) -> ClientResult<Option<SessionEntry>> {
        self.store.load().await
    }

    /// The stored entry if it can be trusted; an untrusted one is removed
    pub async fn valid_entry(&self) -> ClientResult<Option<SessionEntry>> {
        match self.store.load().await? {
            Some(entry) if self.is_valid(&entry) => Ok(Some(entry)),
            Some(_) => {
                tracing::debug!("Stored session expired or stale");
                self.store.clear().await?;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Store `token` and `user` stamped with the current time
    pub async fn remember(&self, token: String, user: SessionUser) -> ClientResult<SessionEntry> {
        let entry = SessionEntry {
            token,
            user,
            timestamp: self.clock.now(),
        };
        self.store.save(&entry).await?;
        Ok(entry)
    }

    pub async fn forget(&self) -> ClientResult<()> {
        self.store.clear().await
    }
}
