//! Products Domain
//!
//! Product catalogue over a [`database::Repository`] of [`Product`]
//! documents: paginated listing, category browsing, full-text search and
//! owner-only mutation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   Handlers      │  ← HTTP endpoints (public reads, authenticated writes)
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │ ProductService  │  ← Ownership and search rules
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │ Repository<Product> │  ← MongoDB or in-memory store
//! └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use database::MongoRepository;
//! use domain_products::{ProductService, handlers};
//!
//! let repository = Arc::new(MongoRepository::<Product>::new(&db));
//! repository.init_indexes().await?;
//!
//! let router = handlers::router(ProductService::new(repository), jwt);
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod service;

// Re-export commonly used types
pub use error::{ProductError, ProductResult};
pub use handlers::ApiDoc;
pub use models::{
    CreateProduct, Product, ProductCategory, ProductResponse, SearchQuery, UpdateProduct,
};
pub use service::ProductService;
