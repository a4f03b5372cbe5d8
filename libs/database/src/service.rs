//! Generic CRUD orchestration on top of a [`Repository`]

use std::borrow::Cow;
use std::marker::PhantomData;
use std::sync::Arc;

use bson::Document;
use tracing::instrument;

use crate::common::{SOFT_DELETE_UNSUPPORTED, ServiceError, ServiceResult};
use crate::pagination::{PaginatedResult, PaginationParams};
use crate::record::Record;
use crate::repository::Repository;

pub const DEFAULT_NOT_FOUND_MESSAGE: &str = "Item not found";

/// Turns repository absence into [`ServiceError::NotFound`] and maps records
/// to their response representation `D` through `D: From<T>`.
///
/// Entity services hold one of these and add their own business rules
/// (uniqueness pre-checks, ownership) around it.
pub struct BaseService<T, D, R> {
    repository: Arc<R>,
    not_found_message: Cow<'static, str>,
    _types: PhantomData<fn(T) -> D>,
}

impl<T, D, R> Clone for BaseService<T, D, R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            not_found_message: self.not_found_message.clone(),
            _types: PhantomData,
        }
    }
}

impl<T, D, R> BaseService<T, D, R>
where
    T: Record,
    D: From<T>,
    R: Repository<T>,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            not_found_message: Cow::Borrowed(DEFAULT_NOT_FOUND_MESSAGE),
            _types: PhantomData,
        }
    }

    /// Message carried by every NotFound this service raises
    pub fn with_not_found_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.not_found_message = message.into();
        self
    }

    pub fn not_found_message(&self) -> &str {
        &self.not_found_message
    }

    /// Repository handle for entity-specific queries
    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    pub fn not_found(&self) -> ServiceError {
        ServiceError::NotFound(self.not_found_message.to_string())
    }

    /// Stored record, without mapping
    #[instrument(skip(self), fields(collection = T::COLLECTION))]
    pub async fn get_record(&self, id: &str) -> ServiceResult<T> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| self.not_found())
    }

    #[instrument(skip(self), fields(collection = T::COLLECTION))]
    pub async fn get_by_id(&self, id: &str) -> ServiceResult<D> {
        self.get_record(id).await.map(D::from)
    }

    /// One page of records matching `filter`, mapped to `D`
    #[instrument(skip(self, filter), fields(collection = T::COLLECTION, page = params.page(), limit = params.limit()))]
    pub async fn get_all(
        &self,
        params: PaginationParams,
        filter: Document,
    ) -> ServiceResult<PaginatedResult<D>> {
        let page = self.repository.find_with_pagination(filter, params).await?;
        Ok(page.map(D::from))
    }

    #[instrument(skip(self, record), fields(collection = T::COLLECTION))]
    pub async fn create(&self, record: T) -> ServiceResult<D> {
        let created = self.repository.create(record).await?;
        tracing::info!(record_id = %created.id(), "Record created");
        Ok(D::from(created))
    }

    #[instrument(skip(self, changes), fields(collection = T::COLLECTION))]
    pub async fn update(&self, id: &str, changes: Document) -> ServiceResult<D> {
        let updated = self
            .repository
            .update(id, changes)
            .await?
            .ok_or_else(|| self.not_found())?;
        tracing::info!(record_id = %id, "Record updated");
        Ok(D::from(updated))
    }

    #[instrument(skip(self), fields(collection = T::COLLECTION))]
    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        if !self.repository.delete(id).await? {
            return Err(self.not_found());
        }
        tracing::info!(record_id = %id, "Record deleted");
        Ok(())
    }

    #[instrument(skip(self), fields(collection = T::COLLECTION))]
    pub async fn soft_delete(&self, id: &str) -> ServiceResult<()> {
        if !self.repository.supports_soft_delete() {
            return Err(ServiceError::Unsupported(SOFT_DELETE_UNSUPPORTED.to_string()));
        }
        if !self.repository.soft_delete(id).await? {
            return Err(self.not_found());
        }
        tracing::info!(record_id = %id, "Record soft deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Operation, RepositoryError};
    use crate::pagination::PaginatedResult;
    use crate::record::testing::Widget;
    use crate::repository::MockRepository;
    use bson::doc;

    #[derive(Debug, PartialEq)]
    struct WidgetView {
        id: String,
        name: String,
    }

    impl From<Widget> for WidgetView {
        fn from(widget: Widget) -> Self {
            Self {
                id: widget.id.to_hex(),
                name: widget.name,
            }
        }
    }

    type Service = BaseService<Widget, WidgetView, MockRepository<Widget>>;

    fn service(repo: MockRepository<Widget>) -> Service {
        BaseService::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn test_get_by_id_maps_record() {
        let widget = Widget::new("lamp", 10.0);
        let id = widget.id.to_hex();
        let mut repo = MockRepository::new();
        let stored = widget.clone();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(stored.clone())));

        let view = service(repo).get_by_id(&id).await.unwrap();
        assert_eq!(view, WidgetView { id, name: "lamp".into() });
    }

    #[tokio::test]
    async fn test_get_by_id_default_not_found_message() {
        let mut repo = MockRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let err = service(repo).get_by_id("missing").await.unwrap_err();
        assert_eq!(err, ServiceError::NotFound("Item not found".into()));
    }

    #[tokio::test]
    async fn test_configured_not_found_message() {
        let mut repo = MockRepository::new();
        repo.expect_update().returning(|_, _| Ok(None));

        let err = service(repo)
            .with_not_found_message("Widget not found")
            .update("missing", doc! { "price": 1.0 })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Widget not found");
    }

    #[tokio::test]
    async fn test_get_all_maps_data_and_keeps_metadata() {
        let mut repo = MockRepository::new();
        repo.expect_find_with_pagination()
            .withf(|filter, params| *filter == doc! { "isDeleted": false } && params.page == 2)
            .returning(|_, params| {
                Ok(PaginatedResult::new(
                    vec![Widget::new("a", 1.0), Widget::new("b", 2.0)],
                    &params,
                    12,
                ))
            });

        let page = service(repo)
            .get_all(PaginationParams::new(2, 10), doc! { "isDeleted": false })
            .await
            .unwrap();

        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[1].name, "b");
        assert_eq!(page.pagination.total, 12);
        assert_eq!(page.pagination.total_pages, 2);
        assert_eq!(page.pagination.page, 2);
    }

    #[tokio::test]
    async fn test_create_propagates_conflict() {
        let mut repo = MockRepository::new();
        repo.expect_create()
            .returning(|_| Err(RepositoryError::conflict(Operation::Create, "dup key")));

        let err = service(repo)
            .create(Widget::new("lamp", 1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Repository(e) if e.is_conflict()));
    }

    #[tokio::test]
    async fn test_delete_not_found_when_nothing_removed() {
        let mut repo = MockRepository::new();
        repo.expect_delete().returning(|_| Ok(false));

        let err = service(repo).delete("x").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_soft_delete_requires_capability() {
        let mut repo = MockRepository::new();
        repo.expect_supports_soft_delete().return_const(false);
        repo.expect_soft_delete().never();

        let err = service(repo).soft_delete("x").await.unwrap_err();
        assert_eq!(
            err,
            ServiceError::Unsupported("Soft delete not supported by this repository".into())
        );
    }

    #[tokio::test]
    async fn test_soft_delete_behaves_like_delete() {
        let mut repo = MockRepository::new();
        repo.expect_supports_soft_delete().return_const(true);
        repo.expect_soft_delete().times(1).returning(|_| Ok(true));
        assert!(service(repo).soft_delete("x").await.is_ok());

        let mut repo = MockRepository::new();
        repo.expect_supports_soft_delete().return_const(true);
        repo.expect_soft_delete().returning(|_| Ok(false));
        let err = service(repo).soft_delete("x").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
