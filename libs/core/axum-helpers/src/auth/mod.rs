//! Authentication and authorization module.
//!
//! This module provides:
//! - HS256 JWT creation and verification
//! - Authentication middleware for protected routes and a role guard
//! - The [`AuthUser`] extractor for handlers behind the middleware
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::auth::{JwtAuth, JwtConfig, jwt_auth_middleware};
//! use core_config::FromEnv;
//!
//! let auth = JwtAuth::new(&JwtConfig::from_env()?);
//!
//! let protected = Router::new()
//!     .route("/api/protected", get(handler))
//!     .layer(axum::middleware::from_fn_with_state(auth, jwt_auth_middleware));
//! ```

pub mod config;
pub mod jwt;
pub mod middleware;

// Re-export commonly used types
pub use config::{JwtConfig, parse_lifetime};
pub use jwt::{JwtAuth, JwtClaims, ROLE_ADMIN, ROLE_USER};
pub use middleware::{AuthUser, jwt_auth_middleware, require_roles};
