//! Sign Up Use Case
//!
//! Registers a new account and signs it in.

use std::sync::Arc;

use kernel::clock::Clock;
use kernel::error::field::FieldErrors;

use crate::application::config::AuthConfig;
use crate::application::session::{SessionGrant, SessionTokens};
use crate::domain::entity::user::NewUser;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email,
    user_name::UserName,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

/// Sign up input
pub struct SignUpInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Sign up use case
pub struct SignUpUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
    tokens: SessionTokens,
    clock: Arc<dyn Clock>,
}

impl<U> SignUpUseCase<U>
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

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<SessionGrant> {
        let name = UserName::new(&input.name);
        let email = Email::new(&input.email);
        let password = RawPassword::new(input.password);

        let (name, email, password) = match (name, email, password) {
            (Ok(name), Ok(email), Ok(password)) => (name, email, password),
            (name, email, password) => {
                let mut errors = FieldErrors::new();
                if let Err(message) = name {
                    errors.push("name", message);
                }
                if let Err(message) = email {
                    errors.push("email", message);
                }
                if let Err(message) = password {
                    errors.push("password", message);
                }
                return Err(AuthError::Validation(errors.into_vec()));
            }
        };

        if self.user_repo.exists_by_email(&email).await? {
            return Err(AuthError::EmailTaken);
        }

        let password_hash =
            UserPassword::from_raw(&password, &self.config.hashing_cost, self.config.pepper())?;

        let user = self
            .user_repo
            .create(&NewUser::register(
                name,
                email,
                password_hash,
                self.clock.now(),
            ))
            .await?;

        tracing::info!(user_id = %user.id, "User registered");

        self.tokens.grant(user)
    }
}
