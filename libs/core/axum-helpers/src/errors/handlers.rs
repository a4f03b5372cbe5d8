//! Router fallbacks that keep unmatched requests on the JSON error model

use axum::response::Response;

use super::{ErrorCode, error_response};

pub async fn not_found() -> Response {
    error_response(ErrorCode::NotFound, "The requested resource was not found")
}

pub async fn method_not_allowed() -> Response {
    error_response(
        ErrorCode::MethodNotAllowed,
        ErrorCode::MethodNotAllowed.default_message(),
    )
}
