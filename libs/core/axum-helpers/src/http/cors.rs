use axum::http::{HeaderValue, Method, header};
use std::io;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::correlation::X_CORRELATION_ID;

const METHODS: [Method; 6] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::PATCH,
    Method::OPTIONS,
];

/// Builds the CORS layer from a comma-separated origin list.
///
/// `*` allows any origin (credentials are then disabled, as browsers require).
/// Otherwise the listed origins are allowed with credentials.
///
/// Examples:
/// - Development: `http://localhost:3000,http://localhost:5173`
/// - Production: `https://example.com,https://app.example.com`
///
/// # Errors
/// Returns `InvalidInput` when the list is empty or contains an invalid header value.
pub fn create_cors_layer(origins: &str) -> io::Result<CorsLayer> {
    let allowed: Vec<&str> = origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if allowed.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "CORS_ALLOWED_ORIGIN cannot be empty",
        ));
    }

    let layer = CorsLayer::new()
        .allow_methods(METHODS)
        .expose_headers([X_CORRELATION_ID])
        .max_age(Duration::from_secs(3600));

    if allowed.contains(&"*") {
        return Ok(layer.allow_origin(Any).allow_headers(Any));
    }

    let allowed_origins = allowed
        .into_iter()
        .map(HeaderValue::from_str)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid CORS_ALLOWED_ORIGIN value: {}", e),
            )
        })?;

    Ok(layer
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::COOKIE,
            X_CORRELATION_ID,
        ])
        .allow_credentials(true))
}

/// [`create_cors_layer`] over the required `CORS_ALLOWED_ORIGIN` variable
pub fn cors_layer_from_env() -> io::Result<CorsLayer> {
    let origins = std::env::var("CORS_ALLOWED_ORIGIN").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "CORS_ALLOWED_ORIGIN environment variable is required. Example: CORS_ALLOWED_ORIGIN=http://localhost:3000,https://example.com",
        )
    })?;

    tracing::info!("CORS configured with allowed origins: {}", origins);
    create_cors_layer(&origins)
}
