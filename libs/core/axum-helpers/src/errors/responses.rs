//! Named OpenAPI responses for the error bodies handlers return, so
//! `#[utoipa::path]` annotations can reference them instead of repeating
//! examples.

use super::ErrorResponse;
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToResponse;

macro_rules! error_response_doc {
    ($($name:ident: $description:literal => $example:tt;)+) => {
        $(
            #[derive(ToResponse)]
            #[response(
                description = $description,
                content_type = "application/json",
                example = json!($example)
            )]
            pub struct $name(pub ErrorResponse);
        )+
    };
}

error_response_doc! {
    BadRequestValidationResponse: "Body failed validation" => {
        "code": 1001,
        "error": "VALIDATION_ERROR",
        "message": "Request validation failed",
        "details": {
            "email": [{ "code": "email", "message": "Invalid email format", "params": {} }]
        }
    };
    BadRequestObjectIdResponse: "Path id is not a valid ObjectId" => {
        "code": 1002,
        "error": "INVALID_OBJECT_ID",
        "message": "Invalid ObjectId format"
    };
    UnauthorizedResponse: "Missing, invalid or expired token" => {
        "code": 1006,
        "error": "UNAUTHORIZED",
        "message": "Invalid or expired token"
    };
    ForbiddenResponse: "Caller lacks the role or ownership required" => {
        "code": 1007,
        "error": "FORBIDDEN",
        "message": "Insufficient permissions"
    };
    NotFoundResponse: "No live record with this id" => {
        "code": 1004,
        "error": "NOT_FOUND",
        "message": "User not found"
    };
    ConflictResponse: "Unique field already taken" => {
        "code": 1008,
        "error": "CONFLICT",
        "message": "Email already registered"
    };
    TooManyRequestsResponse: "Request budget for this client exhausted; see `Retry-After`" => {
        "code": 1010,
        "error": "TOO_MANY_REQUESTS",
        "message": "Too many attempts, please try again later."
    };
    InternalServerErrorResponse: "Unexpected server or database failure" => {
        "code": 2005,
        "error": "DATABASE_ERROR",
        "message": "Database error occurred"
    };
}
