//! Session Manager
//!
//! Front door for "who is signed in". A trusted stored session answers
//! without a request; otherwise the server is asked, and a network failure
//! falls back to the last known identity with a warning.

use std::sync::Arc;

use kernel::clock::Clock;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::cache::AuthCache;
use crate::error::ClientResult;
use crate::http::{ApiClient, into_data};
use crate::store::{SessionStore, SessionUser};

/// Where the UI should send a signed-out user
pub const LOGIN_PATH: &str = "/login";

const STALE_WARNING: &str = "The server could not be reached; showing your saved session";

#[derive(Debug, Clone, PartialEq)]
pub enum Identity {
    /// Trusted stored session; no request was made
    Cached(SessionUser),
    /// Confirmed by the server just now
    Fresh(SessionUser),
    /// The server was unreachable; last known identity
    Stale { user: SessionUser, warning: String },
    SignedOut { redirect_to: String },
}

impl Identity {
    pub fn user(&self) -> Option<&SessionUser> {
        match self {
            Identity::Cached(user) | Identity::Fresh(user) | Identity::Stale { user, .. } => {
                Some(user)
            }
            Identity::SignedOut { .. } => None,
        }
    }

    fn signed_out() -> Self {
        Identity::SignedOut {
            redirect_to: LOGIN_PATH.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct SessionPayload {
    token: String,
    user: SessionUser,
}

pub struct SessionManager<S> {
    api: Arc<ApiClient>,
    cache: AuthCache<S>,
}

impl<S> SessionManager<S>
where
    S: SessionStore + Sync,
{
    pub fn new(api: Arc<ApiClient>, store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        let freshness = api.config().session_freshness;
        Self {
            cache: AuthCache::new(store, clock, freshness),
            api,
        }
    }

    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> ClientResult<SessionUser> {
        self.api.set_token(None).await;
        let response = self
            .api
            .post(
                "/auth/register",
                &json!({ "name": name, "email": email, "password": password }),
            )
            .await?;
        self.establish(into_data(response)?).await
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<SessionUser> {
        self.api.set_token(None).await;
        let response = self
            .api
            .post("/auth/login", &json!({ "email": email, "password": password }))
            .await?;
        self.establish(into_data(response)?).await
    }

    /// Changing the password issues a new token, which replaces the stored one
    pub async fn update_password(&self, current: &str, new: &str) -> ClientResult<SessionUser> {
        self.restore_token().await?;
        let response = self
            .api
            .patch(
                "/auth/update-password",
                &json!({ "currentPassword": current, "newPassword": new }),
            )
            .await?;
        self.establish(into_data(response)?).await
    }

    /// Local state is cleared even when the server cannot be told
    pub async fn logout(&self) -> ClientResult<()> {
        if let Err(e) = self.api.post::<_, Value>("/auth/logout", &json!({})).await {
            tracing::debug!(error = %e, "Server logout failed; clearing local session anyway");
        }
        self.sign_out_locally().await
    }

    pub async fn current_user(&self) -> ClientResult<Identity> {
        let Some(previous) = self.cache.load().await? else {
            self.api.set_token(None).await;
            return Ok(Identity::signed_out());
        };

        if self.cache.is_valid(&previous) {
            self.api.set_token(Some(previous.token.clone())).await;
            return Ok(Identity::Cached(previous.user));
        }

        // The stale entry stays stored until the server answers: replaced on
        // success, cleared on 401, kept through network failures
        self.api.set_token(Some(previous.token.clone())).await;

        match self
            .api
            .get_fresh::<SessionUser>("/auth/me")
            .await
            .and_then(into_data)
        {
            Ok(user) => {
                self.cache.remember(previous.token, user.clone()).await?;
                Ok(Identity::Fresh(user))
            }
            Err(e) if e.is_unauthorized() => {
                tracing::info!("Session rejected by the server; signing out");
                self.sign_out_locally().await?;
                Ok(Identity::signed_out())
            }
            Err(e) if e.is_network() => {
                tracing::warn!(user_id = %previous.user.id, "Using stale session while offline");
                Ok(Identity::Stale {
                    user: previous.user,
                    warning: STALE_WARNING.to_string(),
                })
            }
            Err(e) => Err(e),
        }
    }

    async fn establish(&self, payload: SessionPayload) -> ClientResult<SessionUser> {
        self.api.set_token(Some(payload.token.clone())).await;
        self.api.clear_all_cache().await;
        self.cache.remember(payload.token, payload.user.clone()).await?;
        tracing::debug!(user_id = %payload.user.id, "Session stored");
        Ok(payload.user)
    }

    async fn restore_token(&self) -> ClientResult<()> {
        if self.api.token().await.is_none() {
            if let Some(entry) = self.cache.load().await? {
                self.api.set_token(Some(entry.token)).await;
            }
        }
        Ok(())
    }

    async fn sign_out_locally(&self) -> ClientResult<()> {
        self.api.set_token(None).await;
        self.api.clear_all_cache().await;
        self.cache.forget().await
    }
}
