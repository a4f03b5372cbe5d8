use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use database::{RepositoryError, ServiceError};
use thiserror::Error;

pub const PRODUCT_NOT_FOUND: &str = "Product not found";
pub const SEARCH_TERM_REQUIRED: &str = "Search term is required";
pub const NOT_OWNER_UPDATE: &str = "Unauthorized to update this product";
pub const NOT_OWNER_DELETE: &str = "Unauthorized to delete this product";
pub const DELETE_FAILED: &str = "Failed to delete product";

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product not found")]
    NotFound,

    #[error("Search term is required")]
    SearchTermRequired,

    #[error("Unauthorized to update this product")]
    NotOwnerUpdate,

    #[error("Unauthorized to delete this product")]
    NotOwnerDelete,

    #[error("Failed to delete product")]
    DeleteFailed,

    #[error(transparent)]
    Service(#[from] ServiceError),
}

pub type ProductResult<T> = Result<T, ProductError>;

impl From<RepositoryError> for ProductError {
    fn from(err: RepositoryError) -> Self {
        ProductError::Service(err.into())
    }
}

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound => AppError::NotFound(PRODUCT_NOT_FOUND.to_string()),
            ProductError::SearchTermRequired => {
                AppError::BadRequest(SEARCH_TERM_REQUIRED.to_string())
            }
            ProductError::NotOwnerUpdate => AppError::Forbidden(NOT_OWNER_UPDATE.to_string()),
            ProductError::NotOwnerDelete => AppError::Forbidden(NOT_OWNER_DELETE.to_string()),
            ProductError::DeleteFailed => {
                tracing::error!("Product vanished between ownership check and delete");
                AppError::InternalServerError(DELETE_FAILED.to_string())
            }
            ProductError::Service(e) => e.into(),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use database::Operation;

    fn status(err: ProductError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status(ProductError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status(ProductError::SearchTermRequired), StatusCode::BAD_REQUEST);
        assert_eq!(status(ProductError::NotOwnerUpdate), StatusCode::FORBIDDEN);
        assert_eq!(status(ProductError::NotOwnerDelete), StatusCode::FORBIDDEN);
        assert_eq!(
            status(ProductError::DeleteFailed),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_service_errors_pass_through() {
        let err: ProductError = ServiceError::NotFound(PRODUCT_NOT_FOUND.into()).into();
        assert_eq!(status(err), StatusCode::NOT_FOUND);

        let err: ProductError = RepositoryError::invalid_id(Operation::Update, "xyz").into();
        assert_eq!(status(err), StatusCode::BAD_REQUEST);
    }
}
