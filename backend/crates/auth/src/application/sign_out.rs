//! Sign Out Use Case
//!
//! Tokens are stateless, so signing out only drops the cached user and
//! tells the client to discard its token. There is no revocation list.

use crate::application::session::SessionTokens;
use crate::application::user_cache::UserCache;

/// Sign out use case
pub struct SignOutUseCase {
    tokens: SessionTokens,
    cache: UserCache,
}

impl SignOutUseCase {
    pub fn new(tokens: SessionTokens, cache: UserCache) -> Self {
        Self { tokens, cache }
    }

    /// Never fails: an absent or invalid token still signs out
    pub fn execute(&self, token: Option<&str>) {
        match token.map(|t| self.tokens.verify(t)) {
            Some(Ok(user_id)) => {
                self.cache.invalidate(user_id);
                tracing::info!(user_id = %user_id, "User logged out");
            }
            _ => {
                tracing::debug!("Logout without a valid token");
            }
        }
    }
}
