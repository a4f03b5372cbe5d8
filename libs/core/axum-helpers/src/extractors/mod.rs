//! Custom extractors for Axum handlers.
//!
//! This module provides reusable extractors that reduce boilerplate
//! and standardize error handling across your API.

pub mod object_id_path;
pub mod pagination;
pub mod validated_json;

pub use object_id_path::ObjectIdPath;
pub use pagination::{Pagination, PaginationQuery};
pub use validated_json::ValidatedJson;
