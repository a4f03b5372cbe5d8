//! HTTP handlers for Products API

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    handler::Handler,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    AuthUser, JwtAuth, ObjectIdPath, Pagination, PaginationQuery, ValidatedJson,
    errors::responses::{
        BadRequestObjectIdResponse, BadRequestValidationResponse, ForbiddenResponse,
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
    jwt_auth_middleware,
};
use database::{PaginatedResult, PaginationMeta, Repository};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::ProductResult;
use crate::models::{
    CreateProduct, Product, ProductCategory, ProductResponse, SearchQuery, UpdateProduct,
};
use crate::service::ProductService;

/// OpenAPI documentation for Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        create_product,
        search_products,
        get_by_category,
        get_product,
        update_product,
        delete_product,
    ),
    components(
        schemas(
            ProductResponse, CreateProduct, UpdateProduct, ProductCategory, PaginationMeta
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestObjectIdResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Products", description = "Product catalogue endpoints")
    )
)]
pub struct ApiDoc;

/// Products router; reads are public, mutations require a valid token
pub fn router<R: Repository<Product> + 'static>(service: ProductService<R>, jwt: JwtAuth) -> Router {
    let shared_service = Arc::new(service);
    let auth = middleware::from_fn_with_state(jwt, jwt_auth_middleware);

    Router::new()
        .route(
            "/",
            get(list_products).post(create_product::<R>.layer(auth.clone())),
        )
        .route("/search", get(search_products))
        .route("/category/{category}", get(get_by_category))
        .route(
            "/{id}",
            get(get_product)
                .put(update_product::<R>.layer(auth.clone()))
                .delete(delete_product::<R>.layer(auth)),
        )
        .with_state(shared_service)
}

/// List active products
#[utoipa::path(
    get,
    path = "",
    tag = "Products",
    params(PaginationQuery),
    responses(
        (status = 200, description = "One page of active products", body = PaginatedResult<ProductResponse>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: Repository<Product>>(
    State(service): State<Arc<ProductService<R>>>,
    Pagination(params): Pagination,
) -> ProductResult<Json<PaginatedResult<ProductResponse>>> {
    let page = service.list_products(params).await?;
    Ok(Json(page))
}

/// Create a product owned by the caller
#[utoipa::path(
    post,
    path = "",
    tag = "Products",
    security(("bearer_auth" = [])),
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<R: Repository<Product>>(
    State(service): State<Arc<ProductService<R>>>,
    AuthUser(claims): AuthUser,
    ValidatedJson(input): ValidatedJson<CreateProduct>,
) -> ProductResult<impl IntoResponse> {
    let product = service.create_product(&claims.sub, input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Full-text search over active products
#[utoipa::path(
    get,
    path = "/search",
    tag = "Products",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching products", body = Vec<ProductResponse>),
        (status = 400, description = "Search term is required"),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn search_products<R: Repository<Product>>(
    State(service): State<Arc<ProductService<R>>>,
    Query(query): Query<SearchQuery>,
) -> ProductResult<Json<Vec<ProductResponse>>> {
    let products = service.search_products(&query.q).await?;
    Ok(Json(products))
}

/// List active products in one category
#[utoipa::path(
    get,
    path = "/category/{category}",
    tag = "Products",
    params(
        ("category" = ProductCategory, Path, description = "Product category"),
        PaginationQuery
    ),
    responses(
        (status = 200, description = "One page of products in the category", body = PaginatedResult<ProductResponse>),
        (status = 400, description = "Unknown category"),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_by_category<R: Repository<Product>>(
    State(service): State<Arc<ProductService<R>>>,
    Path(category): Path<ProductCategory>,
    Pagination(params): Pagination,
) -> ProductResult<Json<PaginatedResult<ProductResponse>>> {
    let page = service.get_by_category(category, params).await?;
    Ok(Json(page))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = String, Path, description = "Product ObjectId")
    ),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 400, response = BadRequestObjectIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: Repository<Product>>(
    State(service): State<Arc<ProductService<R>>>,
    id: ObjectIdPath,
) -> ProductResult<Json<ProductResponse>> {
    let product = service.get_product(&id.to_hex()).await?;
    Ok(Json(product))
}

/// Update a product (owner only)
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Products",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Product ObjectId")
    ),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<R: Repository<Product>>(
    State(service): State<Arc<ProductService<R>>>,
    AuthUser(claims): AuthUser,
    id: ObjectIdPath,
    ValidatedJson(input): ValidatedJson<UpdateProduct>,
) -> ProductResult<Json<ProductResponse>> {
    let product = service
        .update_product(&id.to_hex(), &claims.sub, input)
        .await?;
    Ok(Json(product))
}

/// Delete a product (owner only)
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Products",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Product ObjectId")
    ),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 400, response = BadRequestObjectIdResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<R: Repository<Product>>(
    State(service): State<Arc<ProductService<R>>>,
    AuthUser(claims): AuthUser,
    id: ObjectIdPath,
) -> ProductResult<impl IntoResponse> {
    service.delete_product(&id.to_hex(), &claims.sub).await?;
    Ok(StatusCode::NO_CONTENT)
}
