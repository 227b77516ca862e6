//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use platform::cookie::CookieConfig;
use platform::password::HashingCost;
use platform::token::{TokenSigner, generate_secret};

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session cookie name
    pub session_cookie_name: String,
    /// HS256 signing secret
    pub jwt_secret: Vec<u8>,
    /// Token lifetime (also the cookie Max-Age)
    pub token_ttl: Duration,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Argon2id cost for new hashes
    pub hashing_cost: HashingCost,
    /// How long a loaded user may be served from the user cache
    pub user_cache_ttl: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "jwt".to_string(),
            jwt_secret: generate_secret(32),
            token_ttl: Duration::from_secs(7 * 24 * 3600), // 7 days
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            password_pepper: None,
            hashing_cost: HashingCost::default(),
            user_cache_ttl: Duration::from_secs(30),
        }
    }
}

impl AuthConfig {
    /// Create config for development (insecure cookie, random secret)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::default()
        }
    }

    /// Token lifetime in whole days
    pub fn with_token_days(mut self, days: u64) -> Self {
        self.token_ttl = Duration::from_secs(days * 24 * 3600);
        self
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }

    pub fn token_signer(&self) -> TokenSigner {
        let ttl = chrono::Duration::from_std(self.token_ttl)
            .unwrap_or_else(|_| chrono::Duration::days(7));
        TokenSigner::new(&self.jwt_secret, ttl)
    }

    /// Cookie settings for the session token
    pub fn cookie_config(&self) -> CookieConfig {
        CookieConfig {
            name: self.session_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: Some(self.token_ttl.as_secs() as i64),
        }
    }
}
