//! Check Session Use Case
//!
//! The request gate: token → user id → user record (via the cache) →
//! active check.

use std::sync::Arc;

use crate::application::session::SessionTokens;
use crate::application::user_cache::UserCache;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult};

/// Check session use case
pub struct CheckSessionUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    tokens: SessionTokens,
    cache: UserCache,
}

impl<U> CheckSessionUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, tokens: SessionTokens, cache: UserCache) -> Self {
        Self {
            user_repo,
            tokens,
            cache,
        }
    }

    /// Resolve the user behind `token`.
    ///
    /// With `fresh` the user cache is bypassed; state-changing requests use
    /// it so they never act on a stale identity.
    pub async fn execute(&self, token: Option<&str>, fresh: bool) -> AuthResult<User> {
        let token = token.ok_or(AuthError::MissingToken)?;
        let user_id = self.tokens.verify(token)?;

        let user = self
            .cache
            .get_or_load(self.user_repo.as_ref(), user_id, fresh)
            .await?
            .ok_or(AuthError::TokenUserMissing)?;

        if !user.can_login() {
            self.cache.invalidate(user_id);
            return Err(AuthError::UserInactive);
        }

        Ok(user)
    }

    /// Check if the session is valid (without returning the user)
    pub async fn is_valid(&self, token: &str) -> bool {
        self.execute(Some(token), false).await.is_ok()
    }
}
