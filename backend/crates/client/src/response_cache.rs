//! Response Cache
//!
//! Successful GET bodies keyed by path, expired against the injected clock.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use kernel::clock::Clock;
use serde_json::Value;
use tokio::sync::RwLock;

pub struct ResponseCache {
    entries: RwLock<HashMap<String, (DateTime<Utc>, Value)>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        let now = self.clock.now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some((stored_at, body)) if now - *stored_at < self.ttl => {
                    return Some(body.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        self.entries.write().await.remove(key);
        None
    }

    pub async fn put(&self, key: &str, body: Value) {
        let now = self.clock.now();
        self.entries
            .write()
            .await
            .insert(key.to_string(), (now, body));
    }

    pub async fn remove(&self, key: &str) {
        self.entries.write().await.remove(key);
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
