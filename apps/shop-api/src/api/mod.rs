//! API routes, nested under `/api` by `axum_helpers::create_router`

pub mod health;
pub mod products;
pub mod users;

use axum::Router;

use crate::state::AppState;

pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest("/auth", users::auth_router(state))
        .nest("/users", users::router(state))
        .nest("/products", products::router(state))
}
