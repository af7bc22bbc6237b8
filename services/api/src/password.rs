//! Argon2 password hashing
//!
//! Hashing is CPU bound, so the async entry points run it on the blocking
//! thread pool rather than on a runtime worker.

use anyhow::{Context, Result, anyhow};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use tokio::task;

pub async fn hash_password(password: &str) -> Result<String> {
    let password = password.to_owned();
    task::spawn_blocking(move || hash_now(&password))
        .await
        .context("Password hashing task failed")?
}

/// Check `password` against a stored PHC hash string
pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    task::spawn_blocking(move || verify_now(&password, &hash))
        .await
        .context("Password check task failed")?
}

fn hash_now(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("Failed to hash password: {}", e))?
        .to_string();
    Ok(hash)
}

fn verify_now(password: &str, hash: &str) -> Result<bool> {
    let parsed =
        PasswordHash::new(hash).map_err(|e| anyhow!("Failed to parse password hash: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
