//! Client Configuration

use std::time::Duration;

/// Settings for talking to the marketplace API
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL including the `/api` prefix, without a trailing slash
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Extra attempts for a GET that failed without a response
    pub get_retries: u32,
    /// Delay before retry `n` is `retry_backoff * n`
    pub retry_backoff: Duration,
    /// How long a successful GET body is served from memory
    pub response_cache_ttl: chrono::Duration,
    /// How long a stored session is trusted without asking the server
    pub session_freshness: chrono::Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001/api".to_string(),
            timeout: Duration::from_secs(60),
            get_retries: 2,
            retry_backoff: Duration::from_millis(500),
            response_cache_ttl: chrono::Duration::minutes(5),
            session_freshness: chrono::Duration::hours(3),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Local API with short timeouts and no backoff
    pub fn development() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            retry_backoff: Duration::from_millis(10),
            ..Self::default()
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.get_retries, 2);
        assert_eq!(config.session_freshness, chrono::Duration::hours(3));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = ClientConfig::new("http://api.test/api/");
        assert_eq!(config.url("/auth/me"), "http://api.test/api/auth/me");
    }
}
