use std::fmt;

/// Message used whenever soft deletion is requested from a record type that does not support it
pub const SOFT_DELETE_UNSUPPORTED: &str = "Soft delete not supported by this repository";

/// Repository operation that produced an error
///
/// The `Display` form is the context prefix carried by every [`RepositoryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    FindById,
    FindOne,
    Find,
    Create,
    Update,
    Delete,
    SoftDelete,
    Restore,
    Count,
    FindWithPagination,
    Query,
    CreateIndexes,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::FindById => "Error finding document by id",
            Operation::FindOne => "Error finding document",
            Operation::Find => "Error finding documents",
            Operation::Create => "Error creating document",
            Operation::Update => "Error updating document",
            Operation::Delete => "Error deleting document",
            Operation::SoftDelete => "Error soft deleting document",
            Operation::Restore => "Error restoring document",
            Operation::Count => "Error counting documents",
            Operation::FindWithPagination => "Error finding documents with pagination",
            Operation::Query => "Error executing query",
            Operation::CreateIndexes => "Error creating indexes",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform error boundary for every repository implementation
///
/// Callers never see a store's native error type. Each variant keeps the
/// operation that failed and the original cause message.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RepositoryError {
    /// A uniqueness constraint rejected the write
    #[error("{op}: {message}")]
    Conflict { op: Operation, message: String },

    /// The record failed schema validation
    #[error("{op}: {message}")]
    Validation { op: Operation, message: String },

    /// The identifier is not a well-formed ObjectId
    #[error("{op}: '{id}' is not a valid ObjectId")]
    InvalidId { op: Operation, id: String },

    /// A stored document could not be converted to or from the record type
    #[error("{op}: {message}")]
    Decode { op: Operation, message: String },

    /// The repository does not implement the requested capability
    #[error("{op}: {message}")]
    Unsupported { op: Operation, message: String },

    /// Any other store fault (connectivity, timeout, unsupported filter, ...)
    #[error("{op}: {message}")]
    Store { op: Operation, message: String },
}

impl RepositoryError {
    pub fn conflict(op: Operation, cause: impl fmt::Display) -> Self {
        Self::Conflict {
            op,
            message: cause.to_string(),
        }
    }

    pub fn validation(op: Operation, cause: impl fmt::Display) -> Self {
        Self::Validation {
            op,
            message: cause.to_string(),
        }
    }

    pub fn invalid_id(op: Operation, id: impl Into<String>) -> Self {
        Self::InvalidId { op, id: id.into() }
    }

    pub fn decode(op: Operation, cause: impl fmt::Display) -> Self {
        Self::Decode {
            op,
            message: cause.to_string(),
        }
    }

    pub fn store(op: Operation, cause: impl fmt::Display) -> Self {
        Self::Store {
            op,
            message: cause.to_string(),
        }
    }

    pub fn soft_delete_unsupported(op: Operation) -> Self {
        Self::Unsupported {
            op,
            message: SOFT_DELETE_UNSUPPORTED.to_string(),
        }
    }

    /// Operation that failed
    pub fn operation(&self) -> Operation {
        match self {
            Self::Conflict { op, .. }
            | Self::Validation { op, .. }
            | Self::InvalidId { op, .. }
            | Self::Decode { op, .. }
            | Self::Unsupported { op, .. }
            | Self::Store { op, .. } => *op,
        }
    }

    /// Original cause, without the operation prefix
    pub fn cause(&self) -> String {
        match self {
            Self::InvalidId { id, .. } => format!("'{id}' is not a valid ObjectId"),
            Self::Conflict { message, .. }
            | Self::Validation { message, .. }
            | Self::Decode { message, .. }
            | Self::Unsupported { message, .. }
            | Self::Store { message, .. } => message.clone(),
        }
    }

    /// Re-attribute the error to an enclosing operation, keeping kind and cause
    pub fn within(self, outer: Operation) -> Self {
        match self {
            Self::Conflict { message, .. } => Self::Conflict { op: outer, message },
            Self::Validation { message, .. } => Self::Validation { op: outer, message },
            Self::InvalidId { id, .. } => Self::InvalidId { op: outer, id },
            Self::Decode { message, .. } => Self::Decode { op: outer, message },
            Self::Unsupported { message, .. } => Self::Unsupported { op: outer, message },
            Self::Store { message, .. } => Self::Store { op: outer, message },
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors raised by [`crate::service::BaseService`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    /// The requested record does not exist
    #[error("{0}")]
    NotFound(String),

    /// A capability the operation needs is missing from the repository
    #[error("{0}")]
    Unsupported(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
