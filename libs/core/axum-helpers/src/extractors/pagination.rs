//! Lenient `page`/`limit`/`sort`/`order` query-string extractor.

use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use database::pagination::{DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT};
use database::{PaginationParams, SortOrder};
use serde::Deserialize;
use utoipa::IntoParams;

/// Raw pagination query parameters, as documented in OpenAPI
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    /// Page number, starting at 1
    #[param(example = 1)]
    pub page: Option<String>,
    /// Page size, at most 100
    #[param(example = 10)]
    pub limit: Option<String>,
    /// Field to sort by (default `createdAt`)
    pub sort: Option<String>,
    /// `asc` or `desc` (default `desc`)
    pub order: Option<String>,
}

impl PaginationQuery {
    /// Coerce into [`PaginationParams`]
    ///
    /// Unparseable, zero and negative numbers fall back to the defaults and
    /// `limit` is clamped to [`MAX_LIMIT`].
    pub fn into_params(self) -> PaginationParams {
        let page = positive(self.page.as_deref()).unwrap_or(DEFAULT_PAGE);
        let limit = positive(self.limit.as_deref())
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT);

        PaginationParams {
            page,
            limit,
            sort: self.sort.filter(|s| !s.trim().is_empty()),
            order: self.order.as_deref().map(SortOrder::parse),
        }
    }
}

fn positive(value: Option<&str>) -> Option<u64> {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|n| *n >= 1)
        .map(|n| n as u64)
}

/// Extractor yielding coerced [`PaginationParams`].
///
/// # Example
/// ```ignore
/// async fn list(Pagination(params): Pagination) -> String {
///     format!("page {} of size {}", params.page(), params.limit())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Pagination(pub PaginationParams);

impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<PaginationQuery>::from_request_parts(parts, state)
            .await
            .map_err(|e| e.into_response())?;

        Ok(Pagination(query.into_params()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: &str, limit: &str) -> PaginationQuery {
        PaginationQuery {
            page: Some(page.to_string()),
            limit: Some(limit.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_when_absent() {
        let params = PaginationQuery::default().into_params();
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 10);
        assert_eq!(params.sort_field(), "createdAt");
        assert_eq!(params.sort_order(), SortOrder::Desc);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let params = query("abc", "-5").into_params();
        assert_eq!((params.page, params.limit), (1, 10));

        let params = query("0", "0").into_params();
        assert_eq!((params.page, params.limit), (1, 10));
    }

    #[test]
    fn test_limit_clamped() {
        let params = query("3", "500").into_params();
        assert_eq!((params.page, params.limit), (3, 100));
    }

    #[test]
    fn test_sort_and_order() {
        let params = PaginationQuery {
            sort: Some("price".into()),
            order: Some("ASC".into()),
            ..Default::default()
        }
        .into_params();
        assert_eq!(params.sort_field(), "price");
        assert_eq!(params.sort_order(), SortOrder::Asc);
    }
}
