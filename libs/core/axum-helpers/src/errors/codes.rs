//! Machine-readable error codes carried by every error body.
//!
//! Each code has a SCREAMING_SNAKE_CASE identifier for clients, an integer
//! for logs (1xxx request errors, 2xxx store errors), the HTTP status it is
//! served with and a default message.
//!
//! ```rust
//! use axum::http::StatusCode;
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::InvalidObjectId;
//! assert_eq!(code.as_str(), "INVALID_OBJECT_ID");
//! assert_eq!(code.code(), 1002);
//! assert_eq!(code.status(), StatusCode::BAD_REQUEST);
//! ```

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

macro_rules! error_codes {
    ($($(#[$doc:meta])* $variant:ident = ($ident:literal, $code:literal, $status:ident, $message:literal),)+) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum ErrorCode {
            $($(#[$doc])* $variant,)+
        }

        impl ErrorCode {
            pub const ALL: &'static [ErrorCode] = &[$(ErrorCode::$variant,)+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $ident,)+
                }
            }

            pub fn code(&self) -> i32 {
                match self {
                    $(Self::$variant => $code,)+
                }
            }

            pub fn status(&self) -> StatusCode {
                match self {
                    $(Self::$variant => StatusCode::$status,)+
                }
            }

            /// Message used when the error carries none of its own
            pub fn default_message(&self) -> &'static str {
                match self {
                    $(Self::$variant => $message,)+
                }
            }
        }
    };
}

error_codes! {
    /// Body failed its `Validate` rules
    ValidationError = ("VALIDATION_ERROR", 1001, BAD_REQUEST, "Request validation failed"),
    /// Path segment is not a 24-hex ObjectId
    InvalidObjectId = ("INVALID_OBJECT_ID", 1002, BAD_REQUEST, "Invalid ObjectId format"),
    /// Body is not JSON or does not match the expected shape
    JsonExtraction = ("JSON_EXTRACTION", 1003, BAD_REQUEST, "Failed to parse request body"),
    NotFound = ("NOT_FOUND", 1004, NOT_FOUND, "Resource not found"),
    InternalError = ("INTERNAL_ERROR", 1005, INTERNAL_SERVER_ERROR, "An internal server error occurred"),
    /// Missing, malformed or expired token, or bad credentials
    Unauthorized = ("UNAUTHORIZED", 1006, UNAUTHORIZED, "Authentication required"),
    /// Valid token whose role or ownership does not allow the action
    Forbidden = ("FORBIDDEN", 1007, FORBIDDEN, "Insufficient permissions"),
    Conflict = ("CONFLICT", 1008, CONFLICT, "Resource already exists"),
    MethodNotAllowed = ("METHOD_NOT_ALLOWED", 1009, METHOD_NOT_ALLOWED, "The HTTP method is not allowed for this resource"),
    /// Client exceeded its request budget for the window
    TooManyRequests = ("TOO_MANY_REQUESTS", 1010, TOO_MANY_REQUESTS, "Too many requests, please try again later"),
    BadRequest = ("BAD_REQUEST", 1012, BAD_REQUEST, "Bad request"),
    /// Record failed schema validation inside the repository
    DatabaseValidation = ("DATABASE_VALIDATION", 2001, BAD_REQUEST, "Stored document failed validation"),
    DatabaseInvalidId = ("DATABASE_INVALID_ID", 2002, BAD_REQUEST, "Invalid document id"),
    DatabaseDecode = ("DATABASE_DECODE", 2003, INTERNAL_SERVER_ERROR, "Failed to decode database response"),
    /// Soft delete or restore on a record type without soft delete
    DatabaseUnsupported = ("DATABASE_UNSUPPORTED", 2004, INTERNAL_SERVER_ERROR, "Operation not supported by this repository"),
    /// Connectivity, timeout or rejected query
    DatabaseError = ("DATABASE_ERROR", 2005, INTERNAL_SERVER_ERROR, "Database error occurred"),
    /// Unique index rejected a write
    DatabaseConflict = ("DATABASE_CONFLICT", 2006, CONFLICT, "Resource already exists"),
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
