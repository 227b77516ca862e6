//! Rate Limiting Infrastructure
//!
//! Common rate limiting abstractions and an in-memory fixed-window store.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use kernel::clock::Clock;

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    /// 100 requests per 15 minutes
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(15 * 60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    pub fn window_ms(&self) -> i64 {
        self.window.as_millis() as i64
    }
}

/// Rate limit check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at_ms: i64,
}

impl RateLimitResult {
    /// Whole seconds until the window resets, never below 1
    pub fn retry_after_secs(&self, now_ms: i64) -> u64 {
        let ms = (self.reset_at_ms - now_ms).max(0) as u64;
        ms.div_ceil(1000).max(1)
    }
}

/// Trait for rate limit storage backends
#[trait_variant::make(RateLimitStore: Send)]
pub trait LocalRateLimitStore {
    /// Check and increment rate limit counter
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, Box<dyn std::error::Error + Send + Sync>>;
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at_ms: i64,
    count: u32,
}

/// Fixed-window counters keyed by client, held in process memory
#[derive(Clone)]
pub struct MemoryRateLimitStore {
    windows: Arc<DashMap<String, Window>>,
    clock: Arc<dyn Clock>,
}

impl MemoryRateLimitStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            windows: Arc::new(DashMap::new()),
            clock,
        }
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now().timestamp_millis()
    }

    /// Drop windows that ended before now; returns how many were removed
    pub fn purge_expired(&self, config: &RateLimitConfig) -> usize {
        let now_ms = self.now_ms();
        let window_ms = config.window_ms();
        let before = self.windows.len();
        self.windows
            .retain(|_, w| now_ms < w.started_at_ms + window_ms);
        before - self.windows.len()
    }

    fn hit(&self, key: &str, config: &RateLimitConfig) -> RateLimitResult {
        let now_ms = self.now_ms();
        let window_ms = config.window_ms();

        let mut entry = self.windows.entry(key.to_string()).or_insert(Window {
            started_at_ms: now_ms,
            count: 0,
        });

        if now_ms >= entry.started_at_ms + window_ms {
            *entry = Window {
                started_at_ms: now_ms,
                count: 0,
            };
        }

        entry.count = entry.count.saturating_add(1);

        RateLimitResult {
            allowed: entry.count <= config.max_requests,
            remaining: config.max_requests.saturating_sub(entry.count),
            reset_at_ms: entry.started_at_ms + window_ms,
        }
    }
}

impl RateLimitStore for MemoryRateLimitStore {
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.hit(key, config))
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryRateLimitStore, RateLimitConfig, RateLimitResult, RateLimitStore};
    use chrono::Utc;
    use kernel::clock::ManualClock;
    use std::sync::Arc;

    fn store() -> (MemoryRateLimitStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        (MemoryRateLimitStore::new(clock.clone()), clock)
    }

    #[tokio::test]
    async fn test_allows_up_to_limit() {
        let (store, _) = store();
        let config = RateLimitConfig::new(3, 60);

        for expected_remaining in [2, 1, 0] {
            let result = store.check_and_increment("1.2.3.4", &config).await.unwrap();
            assert!(result.allowed);
            assert_eq!(result.remaining, expected_remaining);
        }

        let blocked = store.check_and_increment("1.2.3.4", &config).await.unwrap();
        assert!(!blocked.allowed);
        assert_eq!(blocked.remaining, 0);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let (store, _) = store();
        let config = RateLimitConfig::new(1, 60);

        assert!(store.check_and_increment("a", &config).await.unwrap().allowed);
        assert!(store.check_and_increment("b", &config).await.unwrap().allowed);
        assert!(!store.check_and_increment("a", &config).await.unwrap().allowed);
    }

    #[tokio::test]
    async fn test_window_resets() {
        let (store, clock) = store();
        let config = RateLimitConfig::new(1, 60);

        assert!(store.check_and_increment("a", &config).await.unwrap().allowed);
        assert!(!store.check_and_increment("a", &config).await.unwrap().allowed);

        clock.advance(chrono::Duration::seconds(60));
        assert!(store.check_and_increment("a", &config).await.unwrap().allowed);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let (store, clock) = store();
        let config = RateLimitConfig::new(5, 60);

        store.check_and_increment("a", &config).await.unwrap();
        store.check_and_increment("b", &config).await.unwrap();
        assert_eq!(store.purge_expired(&config), 0);

        clock.advance(chrono::Duration::seconds(61));
        assert_eq!(store.purge_expired(&config), 2);
    }

    #[test]
    fn test_retry_after_rounds_up() {
        let result = RateLimitResult {
            allowed: false,
            remaining: 0,
            reset_at_ms: 10_500,
        };
        assert_eq!(result.retry_after_secs(10_000), 1);
        assert_eq!(result.retry_after_secs(8_400), 3);
        assert_eq!(result.retry_after_secs(20_000), 1);
    }
}
