//! HTTP middleware module.
//!
//! This module provides HTTP-level middleware for:
//! - CORS configuration
//! - Security headers
//! - Request correlation ids
//! - Per-client rate limiting
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::http::{correlation_id, create_cors_layer, security_headers};
//!
//! let app = Router::new()
//!     .layer(axum::middleware::from_fn(security_headers))
//!     .layer(axum::middleware::from_fn(correlation_id))
//!     .layer(create_cors_layer("http://localhost:5173")?);
//! ```

pub mod correlation;
pub mod cors;
pub mod rate_limit;
pub mod security;

// Re-export commonly used functions
pub use correlation::{CorrelationId, X_CORRELATION_ID, correlation_id};
pub use cors::{cors_layer_from_env, create_cors_layer};
pub use rate_limit::{RateLimitConfig, RateLimiter, rate_limit};
pub use security::security_headers;
