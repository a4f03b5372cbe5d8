//! Error types and retry helpers shared by every store implementation

pub mod error;
pub mod retry;

pub use error::{
    Operation, RepositoryError, RepositoryResult, SOFT_DELETE_UNSUPPORTED, ServiceError,
    ServiceResult,
};
pub use retry::{RetryConfig, retry_with_backoff};
