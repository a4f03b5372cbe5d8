use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use database::{RepositoryError, ServiceError};
use thiserror::Error;

pub const USER_NOT_FOUND: &str = "User not found";
pub const EMAIL_ALREADY_REGISTERED: &str = "Email already registered";
pub const EMAIL_IN_USE: &str = "Email already in use";
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const ACCOUNT_DISABLED: &str = "Account is disabled";

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("Email already registered")]
    EmailAlreadyRegistered,

    #[error("Email already in use")]
    EmailInUse,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<RepositoryError> for UserError {
    fn from(err: RepositoryError) -> Self {
        UserError::Service(err.into())
    }
}

/// Convert UserError to AppError for standardized error responses
impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound => AppError::NotFound(USER_NOT_FOUND.to_string()),
            UserError::EmailAlreadyRegistered => {
                AppError::Conflict(EMAIL_ALREADY_REGISTERED.to_string())
            }
            UserError::EmailInUse => AppError::Conflict(EMAIL_IN_USE.to_string()),
            UserError::InvalidCredentials => {
                AppError::Unauthorized(INVALID_CREDENTIALS.to_string())
            }
            UserError::AccountDisabled => AppError::Forbidden(ACCOUNT_DISABLED.to_string()),
            UserError::PasswordHash(msg) => {
                tracing::error!("Password hash error: {}", msg);
                AppError::InternalServerError("An internal error occurred".to_string())
            }
            UserError::Token(msg) => {
                tracing::error!("Failed to issue token: {}", msg);
                AppError::InternalServerError("Failed to create token".to_string())
            }
            UserError::Service(e) => e.into(),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
