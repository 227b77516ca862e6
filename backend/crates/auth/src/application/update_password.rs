//! Update Password Use Case
//!
//! Verifies the current password, stores a new hash and rotates the token.

use std::sync::Arc;

use kernel::clock::Clock;
use kernel::error::field::FieldError;
use kernel::id::UserId;

use crate::application::config::AuthConfig;
use crate::application::session::{SessionGrant, SessionTokens};
use crate::application::user_cache::UserCache;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_password::{RawPassword, UserPassword};
use crate::error::{AuthError, AuthResult};

pub struct UpdatePasswordInput {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

pub struct UpdatePasswordUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
    tokens: SessionTokens,
    cache: UserCache,
    clock: Arc<dyn Clock>,
}

impl<U> UpdatePasswordUseCase<U>
where
    U: UserRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        config: Arc<AuthConfig>,
        tokens: SessionTokens,
        cache: UserCache,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user_repo,
            config,
            tokens,
            cache,
            clock,
        }
    }

    pub async fn execute(
        &self,
        user_id: UserId,
        input: UpdatePasswordInput,
    ) -> AuthResult<SessionGrant> {
        let (current, new) = match (input.current_password, input.new_password) {
            (Some(current), Some(new)) if !current.is_empty() && !new.is_empty() => {
                (current, new)
            }
            _ => return Err(AuthError::MissingPasswords),
        };

        // Always read the stored hash, never a cached copy
        let mut user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::TokenUserMissing)?;

        let current = RawPassword::for_verification(current);
        if !user.password.verify(&current, self.config.pepper()) {
            return Err(AuthError::IncorrectCurrentPassword);
        }

        let new = RawPassword::new(new).map_err(|message| {
            AuthError::Validation(vec![FieldError::new("newPassword", message)])
        })?;
        let hashed = UserPassword::from_raw(&new, &self.config.hashing_cost, self.config.pepper())?;

        user.change_password(hashed, self.clock.now());
        self.user_repo.update(&user).await?;
        self.cache.invalidate(user.id);

        tracing::info!(user_id = %user.id, "Password updated");

        self.tokens.grant(user)
    }
}
