//! Axum HTTP API server for the SoloSphere job marketplace.
//!
//! This crate provides:
//! - Job and bid REST endpoints over a pluggable store
//! - Cookie-carried HS256 session tokens
//! - Security headers, request ids and CORS
//! - Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use auth::{AuthUser, TokenClaims, TokenService};
pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::BidService;
pub use state::AppState;
