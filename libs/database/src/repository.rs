//! Generic data-access contract shared by every record type

use async_trait::async_trait;
use bson::Document;

use crate::common::{Operation, RepositoryResult};
use crate::pagination::{PaginatedResult, PaginationParams};
use crate::query::Query;
use crate::query_builder::QueryBuilder;
use crate::record::{Record, from_document};

/// The sole gateway between business logic and the store for one record type
///
/// Absence is reported as `None`/`false`; every genuine fault is a
/// [`crate::RepositoryError`] carrying the failed operation and the original
/// cause. Implementations never retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Repository<T: Record>: Send + Sync {
    /// Look up a record by its hex ObjectId
    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<T>>;

    /// First record matching `filter` in store order
    async fn find_one(&self, filter: Document) -> RepositoryResult<Option<T>>;

    /// Every record matching `filter` in store order
    async fn find(&self, filter: Document) -> RepositoryResult<Vec<T>>;

    /// Validate and persist a new record
    async fn create(&self, record: T) -> RepositoryResult<T>;

    /// Apply a partial update and return the post-update record
    ///
    /// The merged record is re-validated before it is written. `None` when
    /// `id` does not exist.
    async fn update(&self, id: &str, changes: Document) -> RepositoryResult<Option<T>>;

    /// Hard delete; `true` when a record was removed
    async fn delete(&self, id: &str) -> RepositoryResult<bool>;

    /// Mark a record with `deletedAt`/`isDeleted`; `true` when a record was marked
    async fn soft_delete(&self, id: &str) -> RepositoryResult<bool>;

    /// Clear the soft-delete markers; `true` when a record was restored
    async fn restore(&self, id: &str) -> RepositoryResult<bool>;

    async fn count(&self, filter: Document) -> RepositoryResult<u64>;

    /// Run a composed query and return raw documents
    ///
    /// Results may be projected or populated and so are not decoded.
    async fn query_documents(&self, query: &Query) -> RepositoryResult<Vec<Document>>;

    /// Read one page of records matching `filter`
    ///
    /// The windowed read and the count run concurrently as independent
    /// snapshots. Under concurrent writes `total` may disagree with `data`
    /// (for example it may include a record inserted after `data` was read).
    /// Callers needing a consistent view must not rely on this method.
    async fn find_with_pagination(
        &self,
        filter: Document,
        params: PaginationParams,
    ) -> RepositoryResult<PaginatedResult<T>> {
        let query = Query::page(filter.clone(), &params);

        let (documents, total) = tokio::try_join!(self.query_documents(&query), self.count(filter))
            .map_err(|e| e.within(Operation::FindWithPagination))?;

        let data = documents
            .into_iter()
            .map(|doc| from_document(doc, Operation::FindWithPagination))
            .collect::<RepositoryResult<Vec<T>>>()?;

        Ok(PaginatedResult::new(data, &params, total))
    }

    /// Whether `soft_delete`/`restore` are available
    fn supports_soft_delete(&self) -> bool {
        T::SOFT_DELETE
    }
}

/// Fluent query entry point for any repository
pub trait RepositoryExt<T: Record>: Repository<T> + Sized {
    fn query(&self) -> QueryBuilder<'_, T, Self> {
        QueryBuilder::new(self)
    }
}

impl<T: Record, R: Repository<T>> RepositoryExt<T> for R {}
