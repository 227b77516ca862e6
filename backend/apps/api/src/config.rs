//! Server Configuration
//!
//! Everything the binary reads from the environment, parsed once at startup.

use std::env;
use std::time::Duration;

use anyhow::{Context, bail};
use auth::AuthConfig;
use catalog::CatalogConfig;
use platform::rate_limit::RateLimitConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub environment: Environment,
    pub port: u16,
    pub database_url: String,
    pub database_max_connections: u32,
    /// Random per process when unset outside production
    pub jwt_secret: Option<Vec<u8>>,
    pub jwt_expires_in_days: u64,
    pub password_pepper: Option<Vec<u8>>,
    pub user_cache_ttl: Duration,
    pub frontend_origins: Vec<String>,
    pub rate_limit: RateLimitConfig,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let environment = match var("APP_ENV").as_deref() {
            None | Some("development") => Environment::Development,
            Some("production") => Environment::Production,
            Some(other) => bail!("APP_ENV must be development or production, got {other}"),
        };

        let jwt_secret = var("JWT_SECRET").map(String::into_bytes);
        if environment == Environment::Production && jwt_secret.is_none() {
            bail!("JWT_SECRET must be set in production");
        }

        Ok(Self {
            environment,
            port: parse_or(&var, "PORT", 3001)?,
            database_url: var("DATABASE_URL").context("DATABASE_URL must be set")?,
            database_max_connections: parse_or(&var, "DATABASE_MAX_CONNECTIONS", 5)?,
            jwt_secret,
            jwt_expires_in_days: parse_or(&var, "JWT_EXPIRES_IN_DAYS", 7)?,
            password_pepper: var("PASSWORD_PEPPER").map(String::into_bytes),
            user_cache_ttl: Duration::from_secs(parse_or(&var, "USER_CACHE_TTL_SECS", 30)?),
            frontend_origins: var("FRONTEND_ORIGINS")
                .unwrap_or_else(|| "http://localhost:3000".to_string())
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            rate_limit: RateLimitConfig::new(
                parse_or(&var, "RATE_LIMIT_MAX", 100)?,
                parse_or(&var, "RATE_LIMIT_WINDOW_SECS", 900)?,
            ),
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn auth_config(&self) -> AuthConfig {
        let base = if self.is_development() {
            AuthConfig::development()
        } else {
            AuthConfig::default()
        };

        let mut config = AuthConfig {
            password_pepper: self.password_pepper.clone(),
            user_cache_ttl: self.user_cache_ttl,
            ..base
        }
        .with_token_days(self.jwt_expires_in_days);

        if let Some(secret) = &self.jwt_secret {
            config.jwt_secret = secret.clone();
        }
        config
    }

    pub fn catalog_config(&self) -> CatalogConfig {
        if self.is_development() {
            CatalogConfig::development()
        } else {
            CatalogConfig::default()
        }
    }
}

fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        None => Ok(default),
    }
}
