//! Users Domain
//!
//! Registration, login and user management over a [`database::Repository`]
//! of [`User`] documents.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ auth_handlers  │  handlers   │  ← HTTP endpoints (/auth, /users)
//! └───────┬────────┴──────┬──────┘
//!         │               │
//! ┌───────▼──────┐ ┌──────▼──────┐
//! │ AuthService  │ │ UserService │  ← Credentials, tokens, profile rules
//! └───────┬──────┘ └──────┬──────┘
//!         │               │
//! ┌───────▼───────────────▼──────┐
//! │   Repository<User>           │  ← MongoDB or in-memory store
//! └──────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use database::MongoRepository;
//! use domain_users::{AuthService, UserService, auth_handlers, handlers};
//!
//! let repository = Arc::new(MongoRepository::<User>::new(&db));
//! let auth = AuthService::new(repository.clone(), jwt.clone());
//! let users = UserService::new(repository);
//!
//! let router = Router::new()
//!     .nest("/auth", auth_handlers::router(auth))
//!     .nest("/users", handlers::router(users, jwt));
//! ```

pub mod auth;
pub mod auth_handlers;
pub mod error;
pub mod handlers;
pub mod models;
pub mod service;

// Re-export commonly used types
pub use auth::AuthService;
pub use auth_handlers::AuthApiDoc;
pub use error::{UserError, UserResult};
pub use handlers::ApiDoc;
pub use models::{
    AuthResponse, AuthUserInfo, LoginRequest, RegisterRequest, Role, UpdateProfile, User,
    UserResponse,
};
pub use service::UserService;
