//! Auth and users routes over the MongoDB `users` collection

use axum::{Router, middleware};
use axum_helpers::{RateLimiter, rate_limit};
use database::MongoRepository;
use database::mongodb::Database;
use domain_users::{AuthService, User, UserService, auth_handlers, handlers};
use std::sync::Arc;
use tracing::info;

use crate::state::AppState;

/// Register and login, each client held to `auth_rate_limit`
pub fn auth_router(state: &AppState) -> Router {
    let repository = Arc::new(MongoRepository::<User>::new(&state.db));
    let limiter = RateLimiter::new(&state.config.auth_rate_limit);
    auth_handlers::router(AuthService::new(repository, state.jwt.clone()))
        .layer(middleware::from_fn_with_state(limiter, rate_limit))
}

pub fn router(state: &AppState) -> Router {
    let repository = Arc::new(MongoRepository::<User>::new(&state.db));
    handlers::router(UserService::new(repository), state.jwt.clone())
}

/// Unique index on `email`
pub async fn init_indexes(db: &Database) -> eyre::Result<()> {
    MongoRepository::<User>::new(db)
        .init_indexes()
        .await
        .map_err(|e| eyre::eyre!("Failed to create user indexes: {}", e))?;
    info!("User collection indexes created");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    fn bad_login() -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"email":"not-an-email","password":""}"#))
            .unwrap()
    }

    #[tokio::test]
    async fn test_login_burst_is_limited() {
        let app = auth_router(&AppState::unreachable().await);

        // rejected by validation before MongoDB is touched
        for _ in 0..5 {
            let response = app.clone().oneshot(bad_login()).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }

        let response = app.oneshot(bad_login()).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key(header::RETRY_AFTER));
    }
}
