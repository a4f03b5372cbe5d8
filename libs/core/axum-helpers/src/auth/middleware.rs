use super::jwt::{JwtAuth, JwtClaims};
use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, request::Parts},
    middleware::Next,
    response::Response,
};

pub const TOKEN_REQUIRED: &str = "Authentication token is required";
pub const TOKEN_INVALID: &str = "Invalid or expired token";
pub const AUTHENTICATION_REQUIRED: &str = "Authentication required";
pub const INSUFFICIENT_PERMISSIONS: &str = "Insufficient permissions";

/// Extract JWT from Authorization header or cookie
fn extract_token_from_request(headers: &HeaderMap) -> Option<String> {
    // Try Authorization header first: "Bearer <token>"
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer ").map(|s| s.trim().to_string()))
        .filter(|token| !token.is_empty())
        .or_else(|| {
            // Fallback to cookie: "access_token=<token>"
            headers
                .get("cookie")
                .and_then(|v| v.to_str().ok())
                .and_then(|cookies| {
                    cookies.split(';').find_map(|cookie| {
                        let (name, value) = cookie.trim().split_once('=')?;
                        (name == "access_token").then(|| value.to_string())
                    })
                })
        })
}

/// JWT authentication middleware
///
/// Validates the bearer token (or `access_token` cookie) and inserts the
/// decoded [`JwtClaims`] into request extensions.
///
/// # Example
///
/// ```ignore
/// use axum::Router;
/// use axum::routing::get;
/// use axum_helpers::{JwtAuth, jwt_auth_middleware};
///
/// let protected_routes = Router::new()
///     .route("/profile", get(profile))
///     .layer(axum::middleware::from_fn_with_state(auth.clone(), jwt_auth_middleware));
/// ```
pub async fn jwt_auth_middleware(
    State(auth): State<JwtAuth>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = extract_token_from_request(&headers) else {
        tracing::debug!("No JWT found in Authorization header or cookie");
        return Err(AppError::Unauthorized(TOKEN_REQUIRED.to_string()));
    };

    let claims = auth.verify_token(&token).map_err(|e| {
        tracing::debug!("JWT verification failed: {}", e);
        AppError::Unauthorized(TOKEN_INVALID.to_string())
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Role guard; layer it inside [`jwt_auth_middleware`]
///
/// ```ignore
/// const ADMIN_ONLY: &[&str] = &["admin"];
///
/// Router::new()
///     .route("/{id}", delete(remove_user))
///     .route_layer(axum::middleware::from_fn_with_state(ADMIN_ONLY, require_roles))
/// ```
pub async fn require_roles(
    State(roles): State<&'static [&'static str]>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(claims) = request.extensions().get::<JwtClaims>() else {
        return Err(AppError::Unauthorized(AUTHENTICATION_REQUIRED.to_string()));
    };

    if !roles.is_empty() && !roles.contains(&claims.role.as_str()) {
        tracing::info!(user_id = %claims.sub, role = %claims.role, "Role not permitted");
        return Err(AppError::Forbidden(INSUFFICIENT_PERMISSIONS.to_string()));
    }

    Ok(next.run(request).await)
}

/// Claims of the authenticated caller
///
/// Rejects with 401 when [`jwt_auth_middleware`] did not run for the route.
#[derive(Debug, Clone)]
pub struct AuthUser(pub JwtClaims);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<JwtClaims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::Unauthorized(AUTHENTICATION_REQUIRED.to_string()))
    }
}
