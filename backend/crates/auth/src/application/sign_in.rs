//! Sign In Use Case
//!
//! Authenticates by email and password and issues a token.

use std::sync::Arc;

use kernel::clock::Clock;

use crate::application::config::AuthConfig;
use crate::application::session::{SessionGrant, SessionTokens};
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

/// Sign in input. Both fields are optional at the wire level so that a
/// missing field is reported as such rather than as a decode failure.
pub struct SignInInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Sign in use case
pub struct SignInUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
    tokens: SessionTokens,
    clock: Arc<dyn Clock>,
}

impl<U> SignInUseCase<U>
where
    U: UserRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        config: Arc<AuthConfig>,
        tokens: SessionTokens,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user_repo,
            config,
            tokens,
            clock,
        }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<SessionGrant> {
        let (email, password) = match (input.email, input.password) {
            (Some(email), Some(password)) if !email.trim().is_empty() && !password.is_empty() => {
                (email, password)
            }
            _ => return Err(AuthError::MissingCredentials),
        };

        // Unknown email and wrong password must be indistinguishable
        let email = Email::new(&email).map_err(|_| AuthError::InvalidCredentials)?;
        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let password = RawPassword::for_verification(password);
        if !user.password.verify(&password, self.config.pepper()) {
            return Err(AuthError::InvalidCredentials);
        }

        if !user.can_login() {
            return Err(AuthError::UserInactive);
        }

        let user = self.upgrade_hash(user, &password).await;

        tracing::info!(user_id = %user.id, "User logged in");

        self.tokens.grant(user)
    }

    /// Re-hash with the current cost when the stored parameters are outdated.
    /// Failure here never blocks the login.
    async fn upgrade_hash(&self, mut user: User, password: &RawPassword) -> User {
        let cost = &self.config.hashing_cost;
        if !user.password.needs_rehash(cost) {
            return user;
        }

        match UserPassword::from_raw(password, cost, self.config.pepper()) {
            Ok(rehashed) => {
                user.change_password(rehashed, self.clock.now());
                if let Err(e) = self.user_repo.update(&user).await {
                    tracing::warn!(user_id = %user.id, error = %e, "Password rehash not saved");
                } else {
                    tracing::debug!(user_id = %user.id, "Password rehashed with current cost");
                }
            }
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Password rehash failed");
            }
        }
        user
    }
}
