//! Generic data access over document stores
//!
//! A [`Record`] type declares its collection and storage traits (soft delete,
//! unique fields, text-searchable fields, references). Every store implements
//! [`Repository`] for any record; [`QueryBuilder`] composes filters on top of
//! it and [`BaseService`] turns repository results into business outcomes.
//!
//! # Features
//!
//! - `mongodb` (default) - MongoDB connector and [`mongodb::MongoRepository`]
//! - `config` - Configuration support with `core_config::FromEnv`
//! - `all` - All features
//!
//! The in-memory store in [`memory`] is always available and backs tests.
//!
//! # Examples
//!
//! ```ignore
//! use database::{RepositoryExt, mongodb};
//!
//! let client = mongodb::connect("mongodb://localhost:27017/shop").await?;
//! let products = mongodb::MongoRepository::<Product>::new(&client.database("shop"));
//! products.init_indexes().await?;
//!
//! let cheap = products
//!     .query()
//!     .where_eq("category", "books")
//!     .less_than("price", 20.0)
//!     .sort("price", SortOrder::Asc)
//!     .execute()
//!     .await?;
//! ```

pub mod common;
pub mod memory;
pub mod pagination;
pub mod query;
pub mod query_builder;
pub mod record;
pub mod repository;
pub mod service;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use bson;

// Re-exports for convenience
pub use common::{Operation, RepositoryError, RepositoryResult, ServiceError, ServiceResult};
pub use memory::{InMemoryRepository, MemoryDatabase};
pub use pagination::{PaginatedResult, PaginationMeta, PaginationParams, SortOrder};
pub use query::{Populate, Query};
pub use query_builder::QueryBuilder;
pub use record::Record;
pub use repository::{Repository, RepositoryExt};
pub use service::BaseService;

#[cfg(feature = "mongodb")]
pub use self::mongodb::MongoRepository;
