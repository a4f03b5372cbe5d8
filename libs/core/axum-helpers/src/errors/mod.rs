//! HTTP error model
//!
//! Every failure leaves the API as an [`ErrorResponse`] body whose status and
//! `error` identifier come from one [`ErrorCode`]. Domain errors convert into
//! [`AppError`]; repository faults are mapped here so store internals never
//! reach clients.

pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use database::{RepositoryError, ServiceError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Body of every error response
///
/// ```json
/// { "code": 1008, "error": "CONFLICT", "message": "Email already registered" }
/// ```
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Integer code for logs and dashboards
    pub code: i32,
    /// Identifier clients match on, e.g. `NOT_FOUND`
    pub error: String,
    pub message: String,
    /// Per-field validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            error: code.as_str().to_string(),
            message: message.into(),
            details: None,
        }
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("Invalid ObjectId: {0}")]
    InvalidObjectId(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
}

impl From<ServiceError> for AppError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::Unsupported(message) => AppError::InternalServerError(message),
            ServiceError::Repository(e) => AppError::Repository(e),
        }
    }
}

/// What the client sees: code, message and optional details
struct Rendered {
    code: ErrorCode,
    message: String,
    details: Option<serde_json::Value>,
    status: Option<StatusCode>,
}

impl Rendered {
    fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            status: None,
        }
    }

    fn default_for(code: ErrorCode) -> Self {
        Self::new(code, code.default_message())
    }
}

impl AppError {
    fn render(self) -> Rendered {
        match self {
            AppError::Repository(e) => render_repository_error(e),
            AppError::JsonExtractorRejection(e) => Rendered {
                status: Some(e.status()),
                ..Rendered::new(ErrorCode::JsonExtraction, e.body_text())
            },
            AppError::ValidationError(e) => Rendered {
                details: serde_json::to_value(&e).ok(),
                ..Rendered::default_for(ErrorCode::ValidationError)
            },
            AppError::InvalidObjectId(_) => Rendered::default_for(ErrorCode::InvalidObjectId),
            AppError::BadRequest(msg) => Rendered::new(ErrorCode::BadRequest, msg),
            AppError::Unauthorized(msg) => Rendered::new(ErrorCode::Unauthorized, msg),
            AppError::Forbidden(msg) => Rendered::new(ErrorCode::Forbidden, msg),
            AppError::NotFound(msg) => Rendered::new(ErrorCode::NotFound, msg),
            AppError::Conflict(msg) => Rendered::new(ErrorCode::Conflict, msg),
            AppError::InternalServerError(msg) => Rendered::new(ErrorCode::InternalError, msg),
        }
    }
}

/// Client-caused kinds surface their cause; store faults get a generic message
fn render_repository_error(error: RepositoryError) -> Rendered {
    match error {
        RepositoryError::Conflict { .. } => Rendered::default_for(ErrorCode::DatabaseConflict),
        RepositoryError::Validation { message, .. } => {
            Rendered::new(ErrorCode::DatabaseValidation, message)
        }
        e @ RepositoryError::InvalidId { .. } => {
            Rendered::new(ErrorCode::DatabaseInvalidId, e.cause())
        }
        RepositoryError::Decode { .. } => Rendered::default_for(ErrorCode::DatabaseDecode),
        RepositoryError::Unsupported { message, .. } => {
            Rendered::new(ErrorCode::DatabaseUnsupported, message)
        }
        RepositoryError::Store { .. } => Rendered::default_for(ErrorCode::DatabaseError),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let cause = self.to_string();
        let rendered = self.render();
        let status = rendered.status.unwrap_or_else(|| rendered.code.status());

        if status.is_server_error() {
            tracing::error!(error_code = rendered.code.code(), %status, "{cause}");
        } else {
            tracing::info!(error_code = rendered.code.code(), %status, "{cause}");
        }

        let body = ErrorResponse {
            details: rendered.details,
            ..ErrorResponse::new(rendered.code, rendered.message)
        };
        (status, Json(body)).into_response()
    }
}

/// Error body with the code's own status
///
/// ```rust,ignore
/// let response = error_response(ErrorCode::Unauthorized, "Authentication token is required");
/// ```
pub fn error_response(code: ErrorCode, message: impl Into<String>) -> Response {
    (code.status(), Json(ErrorResponse::new(code, message))).into_response()
}
