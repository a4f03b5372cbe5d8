//! Pagination request and response shapes

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::record::CREATED_AT;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
/// Largest page size accepted from HTTP callers
pub const MAX_LIMIT: u64 = 100;

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// `"asc"` (any case) is ascending, everything else descending
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("asc") {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        }
    }

    /// Store sort direction (`1` or `-1`)
    pub fn direction(&self) -> i32 {
        match self {
            SortOrder::Asc => 1,
            SortOrder::Desc => -1,
        }
    }
}

/// Page window requested by a caller
///
/// `page` and `limit` are coerced on read: anything below 1 falls back to
/// [`DEFAULT_PAGE`] / [`DEFAULT_LIMIT`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationParams {
    pub page: u64,
    pub limit: u64,
    pub sort: Option<String>,
    pub order: Option<SortOrder>,
}

impl PaginationParams {
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page,
            limit,
            sort: None,
            order: None,
        }
    }

    pub fn sorted_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some(field.into());
        self.order = Some(order);
        self
    }

    pub fn page(&self) -> u64 {
        if self.page < 1 { DEFAULT_PAGE } else { self.page }
    }

    pub fn limit(&self) -> u64 {
        if self.limit < 1 {
            DEFAULT_LIMIT
        } else {
            self.limit
        }
    }

    /// Records to skip before the window starts
    pub fn skip(&self) -> u64 {
        (self.page() - 1).saturating_mul(self.limit())
    }

    /// Sort key, `createdAt` unless overridden
    pub fn sort_field(&self) -> &str {
        match self.sort.as_deref().map(str::trim) {
            Some(field) if !field.is_empty() => field,
            _ => CREATED_AT,
        }
    }

    /// Sort direction, descending unless overridden
    pub fn sort_order(&self) -> SortOrder {
        self.order.unwrap_or_default()
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_LIMIT)
    }
}

/// Metadata describing one page of a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl PaginationMeta {
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        let total_pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }
}

/// One page of records plus its metadata
///
/// Produced by [`crate::repository::Repository::find_with_pagination`]; `data`
/// and `total` come from independent reads, see that method for the
/// consistency caveat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResult<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResult<T> {
    pub fn new(data: Vec<T>, params: &PaginationParams, total: u64) -> Self {
        Self {
            data,
            pagination: PaginationMeta::new(params.page(), params.limit(), total),
        }
    }

    /// Convert every item, leaving the metadata untouched
    pub fn map<U, F>(self, f: F) -> PaginatedResult<U>
    where
        F: FnMut(T) -> U,
    {
        PaginatedResult {
            data: self.data.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}
