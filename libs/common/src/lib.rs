//! Shared infrastructure for the shop floor services
//!
//! PostgreSQL pooling and migrations, Redis access and the token revocation
//! list, plus the infrastructure error type.

pub mod cache;
pub mod database;
pub mod error;
