//! Service configuration
//!
//! Values are layered: built-in defaults, then an optional
//! `config/shopfloor.toml`, then `SHOPFLOOR__*` environment variables
//! (`SHOPFLOOR__JWT__SECRET`, `SHOPFLOOR__ORDERS__PROGRESS_POLICY`, ...).
//! Database and Redis connection settings are read by `common`.

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use domain::ProgressPolicy;
use serde::Deserialize;

use crate::rate_limiter::RateLimiterConfig;

/// Where records are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// PostgreSQL, with Redis for revoked tokens
    Postgres,
    /// Process memory; lost on restart
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// HS256 signing secret
    pub secret: String,
    /// Access token lifetime in seconds
    pub access_token_expiry: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderSettings {
    pub progress_policy: ProgressPolicy,
}

/// Account created on first start when no user exists yet
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapAdmin {
    pub login: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub bind_address: String,
    pub storage: StorageBackend,
    pub jwt: JwtSettings,
    pub orders: OrderSettings,
    pub login_throttle: RateLimiterConfig,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl ApiConfig {
    /// Load from `config/shopfloor.toml` (if present) and the environment
    pub fn load() -> Result<Self> {
        Self::from_file("config/shopfloor")
    }

    /// Load using `path` (without extension) as the optional file layer
    pub fn from_file(path: &str) -> Result<Self> {
        let settings = Config::builder()
            .set_default("bind_address", "0.0.0.0:3001")?
            .set_default("storage", "postgres")?
            .set_default("jwt.access_token_expiry", 8 * 60 * 60)?
            .set_default("orders.progress_policy", "auto_advance")?
            .set_default("login_throttle.max_attempts", 5)?
            .set_default("login_throttle.window_seconds", 300)?
            .set_default("login_throttle.ban_duration_seconds", 900)?
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("SHOPFLOOR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?;

        let config: ApiConfig = settings
            .try_deserialize()
            .context("Invalid configuration (is SHOPFLOOR__JWT__SECRET set?)")?;

        if config.jwt.secret.len() < 16 {
            anyhow::bail!("jwt.secret must be at least 16 characters");
        }

        Ok(config)
    }
}
