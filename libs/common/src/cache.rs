//! Redis access and the token revocation list
//!
//! Revoked access tokens are remembered until they would have expired
//! anyway. With Redis the TTL does the cleanup; the in-process variant used
//! by the memory backend prunes lazily.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use anyhow::{Result, anyhow};
use redis::{AsyncCommands, Client};
use tracing::info;

/// Configuration for Redis connection
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379")
    pub url: String,
    /// Prefix for every key written by the services
    pub key_prefix: String,
}

impl RedisConfig {
    /// Create a new RedisConfig from environment variables
    ///
    /// # Environment Variables
    /// - `REDIS_URL`: Redis connection URL (default: "redis://localhost:6379")
    /// - `REDIS_KEY_PREFIX`: key namespace (default: "shopfloor")
    pub fn from_env() -> Result<Self> {
        let url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
        let key_prefix =
            std::env::var("REDIS_KEY_PREFIX").unwrap_or_else(|_| "shopfloor".to_string());

        Ok(RedisConfig { url, key_prefix })
    }
}

/// Redis client handle; connections are multiplexed per call
#[derive(Clone)]
pub struct RedisPool {
    client: Client,
    key_prefix: String,
}

impl RedisPool {
    pub async fn new(config: &RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.clone())?;
        info!("Redis client initialized with URL: {}", config.url);
        Ok(RedisPool {
            client,
            key_prefix: config.key_prefix.clone(),
        })
    }

    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        let conn = self.client.get_multiplexed_async_connection().await?;
        Ok(conn)
    }

    /// Namespace a key with the configured prefix
    pub fn key(&self, parts: &[&str]) -> String {
        std::iter::once(self.key_prefix.as_str())
            .chain(parts.iter().copied())
            .collect::<Vec<_>>()
            .join(":")
    }

    /// Set a key-value pair in Redis with optional TTL
    pub async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> Result<()> {
        let mut conn = self.get_connection().await?;

        if let Some(ttl) = ttl_seconds {
            let _: () = conn.set_ex(key, value, ttl).await?;
        } else {
            let _: () = conn.set(key, value).await?;
        }

        Ok(())
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.get_connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    pub async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        let found: bool = conn.exists(key).await?;
        Ok(found)
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.get_connection().await?;
        let _: u64 = conn.del(key).await?;
        Ok(())
    }

    /// Check if Redis is reachable
    pub async fn health_check(&self) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(pong == "PONG")
    }
}

/// Set of revoked token ids
#[derive(Clone)]
pub enum RevocationList {
    Redis(RedisPool),
    Memory(Arc<Mutex<HashMap<String, Instant>>>),
}

impl RevocationList {
    pub fn in_memory() -> Self {
        RevocationList::Memory(Arc::new(Mutex::new(HashMap::new())))
    }

    /// Remember `token_id` as revoked for `ttl_seconds`
    pub async fn revoke(&self, token_id: &str, ttl_seconds: u64) -> Result<()> {
        match self {
            RevocationList::Redis(pool) => {
                let key = pool.key(&["revoked", token_id]);
                pool.set(&key, "1", Some(ttl_seconds.max(1))).await
            }
            RevocationList::Memory(entries) => {
                let mut entries = entries
                    .lock()
                    .map_err(|_| anyhow!("revocation list lock poisoned"))?;
                let now = Instant::now();
                entries.retain(|_, until| *until > now);
                entries.insert(
                    token_id.to_string(),
                    now + Duration::from_secs(ttl_seconds),
                );
                Ok(())
            }
        }
    }

    pub async fn is_revoked(&self, token_id: &str) -> Result<bool> {
        match self {
            RevocationList::Redis(pool) => pool.exists(&pool.key(&["revoked", token_id])).await,
            RevocationList::Memory(entries) => {
                let entries = entries
                    .lock()
                    .map_err(|_| anyhow!("revocation list lock poisoned"))?;
                Ok(entries
                    .get(token_id)
                    .is_some_and(|until| *until > Instant::now()))
            }
        }
    }
}
