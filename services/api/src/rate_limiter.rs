//! Login throttling
//!
//! Failed logins are counted per login name inside a sliding window. Once the
//! limit is reached the login is locked for the ban duration; a successful
//! login clears the counter.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimiterConfig {
    /// Failed attempts tolerated inside the window
    pub max_attempts: u32,
    /// Time window in seconds
    pub window_seconds: u64,
    /// Lockout duration in seconds
    pub ban_duration_seconds: u64,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_seconds: 300,
            ban_duration_seconds: 900,
        }
    }
}

#[derive(Debug)]
struct Entry {
    failures: u32,
    window_start: Instant,
    banned_until: Option<Instant>,
}

#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Whether `key` may attempt a login right now
    pub async fn is_allowed(&self, key: &str) -> bool {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        match entries.get(key).and_then(|entry| entry.banned_until) {
            Some(until) if now < until => false,
            Some(_) => {
                entries.remove(key);
                true
            }
            None => true,
        }
    }

    /// Count a failed attempt, locking the key once the limit is hit
    pub async fn record_failure(&self, key: &str) {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        let window = Duration::from_secs(self.config.window_seconds);

        let entry = entries.entry(key.to_string()).or_insert(Entry {
            failures: 0,
            window_start: now,
            banned_until: None,
        });

        if now.duration_since(entry.window_start) >= window {
            entry.failures = 0;
            entry.window_start = now;
        }

        entry.failures += 1;
        if entry.failures >= self.config.max_attempts {
            entry.banned_until = Some(now + Duration::from_secs(self.config.ban_duration_seconds));
            warn!(
                "Locked login {} for {} seconds after {} failed attempts",
                key, self.config.ban_duration_seconds, entry.failures
            );
        }
    }

    pub async fn reset(&self, key: &str) {
        self.entries.lock().await.remove(key);
    }
}
