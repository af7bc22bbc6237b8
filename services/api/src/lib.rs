//! Shop floor API service
//!
//! An axum service over the domain crate: bearer-token authentication,
//! role checks per operation and PostgreSQL or in-memory storage.

pub mod config;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod rate_limiter;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;

pub use state::AppState;
