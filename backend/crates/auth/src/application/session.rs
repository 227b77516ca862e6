//! Session Tokens
//!
//! Issues and verifies the signed token that identifies a user. There is no
//! server-side session record: the token is the session.

use std::sync::Arc;

use kernel::clock::Clock;
use kernel::id::UserId;
use platform::token::{IssuedToken, TokenSigner};

use crate::application::config::AuthConfig;
use crate::domain::entity::user::User;
use crate::error::AuthResult;

/// Result of a successful register, login or password change
#[derive(Debug, Clone)]
pub struct SessionGrant {
    pub user: User,
    pub token: IssuedToken,
}

#[derive(Clone)]
pub struct SessionTokens {
    signer: TokenSigner,
    clock: Arc<dyn Clock>,
}

impl SessionTokens {
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            signer: config.token_signer(),
            clock,
        }
    }

    pub fn issue(&self, user_id: UserId) -> AuthResult<IssuedToken> {
        Ok(self.signer.issue(user_id.value(), self.clock.now())?)
    }

    /// Issue a token for `user` and bundle both
    pub fn grant(&self, user: User) -> AuthResult<SessionGrant> {
        let token = self.issue(user.id)?;
        Ok(SessionGrant { user, token })
    }

    /// Any failure (signature, shape, expiry) is `AuthError::InvalidToken`
    pub fn verify(&self, token: &str) -> AuthResult<UserId> {
        let subject = self.signer.verify(token, self.clock.now())?;
        Ok(UserId::from_i64(subject))
    }
}
