//! HTTP handlers for the Users API

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get},
};
use axum_helpers::{
    AuthUser, JwtAuth, ObjectIdPath, Pagination, PaginationQuery, ROLE_ADMIN, ValidatedJson,
    errors::responses::{
        BadRequestObjectIdResponse, BadRequestValidationResponse, ConflictResponse,
        ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
    jwt_auth_middleware, require_roles,
};
use database::{PaginatedResult, PaginationMeta, Repository};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::UserResult;
use crate::models::{Role, UpdateProfile, User, UserResponse};
use crate::service::UserService;

const ADMIN_ONLY: &[&str] = &[ROLE_ADMIN];

/// OpenAPI documentation for Users API
#[derive(OpenApi)]
#[openapi(
    paths(get_profile, list_users, update_profile, delete_user),
    components(
        schemas(UserResponse, UpdateProfile, Role, PaginationMeta),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestObjectIdResponse,
            ConflictResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Users", description = "User profile and administration endpoints")
    )
)]
pub struct ApiDoc;

/// Users router; every route requires a valid token and deletion requires `admin`
pub fn router<R: Repository<User> + 'static>(service: UserService<R>, jwt: JwtAuth) -> Router {
    let shared_service = Arc::new(service);

    let admin = Router::new()
        .route("/{id}", delete(delete_user))
        .route_layer(middleware::from_fn_with_state(ADMIN_ONLY, require_roles));

    Router::new()
        .route("/", get(list_users))
        .route("/profile", get(get_profile).put(update_profile))
        .merge(admin)
        .layer(middleware::from_fn_with_state(jwt, jwt_auth_middleware))
        .with_state(shared_service)
}

/// Get the caller's profile
#[utoipa::path(
    get,
    path = "/profile",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Profile of the authenticated user", body = UserResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_profile<R: Repository<User>>(
    State(service): State<Arc<UserService<R>>>,
    AuthUser(claims): AuthUser,
) -> UserResult<Json<UserResponse>> {
    let user = service.get_profile(&claims.sub).await?;
    Ok(Json(user))
}

/// List active users
#[utoipa::path(
    get,
    path = "",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(PaginationQuery),
    responses(
        (status = 200, description = "One page of active users", body = PaginatedResult<UserResponse>),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_users<R: Repository<User>>(
    State(service): State<Arc<UserService<R>>>,
    Pagination(params): Pagination,
) -> UserResult<Json<PaginatedResult<UserResponse>>> {
    let page = service.list_users(params).await?;
    Ok(Json(page))
}

/// Update the caller's name and/or email
#[utoipa::path(
    put,
    path = "/profile",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_profile<R: Repository<User>>(
    State(service): State<Arc<UserService<R>>>,
    AuthUser(claims): AuthUser,
    ValidatedJson(input): ValidatedJson<UpdateProfile>,
) -> UserResult<Json<UserResponse>> {
    let user = service.update_profile(&claims.sub, input).await?;
    Ok(Json(user))
}

/// Delete a user (admin only)
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "User ObjectId")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, response = BadRequestObjectIdResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_user<R: Repository<User>>(
    State(service): State<Arc<UserService<R>>>,
    id: ObjectIdPath,
) -> UserResult<impl IntoResponse> {
    service.delete_user(&id.to_hex()).await?;
    Ok(StatusCode::NO_CONTENT)
}
