//! Fluent query composition over a [`Repository`]

use std::marker::PhantomData;

use bson::{Bson, Document, doc};
use chrono::{DateTime, Utc};

use crate::common::{Operation, RepositoryResult};
use crate::pagination::SortOrder;
use crate::query::{Populate, Query, parse_projection};
use crate::record::{Record, from_document};
use crate::repository::Repository;

/// Accumulates filter, sort, projection, population and window intent, then
/// runs once against the repository.
///
/// Nothing touches the store until a terminal method is awaited. Execution
/// order is fixed (sort, projection, population, skip, limit) whatever order
/// the builder calls were made in.
///
/// Per method accumulation rules:
///
/// | method | behaviour |
/// |---|---|
/// | `filter` | shallow merge, later keys overwrite |
/// | `where_eq`, `where_in`, `where_not_in`, `date_between` | overwrite the field's condition |
/// | `greater_than`, `less_than` | merge into the field's operator document |
/// | `sort`, `populate` | accumulate, first call has highest priority |
/// | `select`, `limit`, `skip`, `paginate` | last call wins |
///
/// ```ignore
/// let cheap = repository
///     .query()
///     .where_eq("category", "books")
///     .greater_than("price", 5.0)
///     .less_than("price", 20.0)
///     .sort("price", SortOrder::Asc)
///     .paginate(2, 10)
///     .execute()
///     .await?;
/// ```
pub struct QueryBuilder<'r, T, R> {
    repository: &'r R,
    query: Query,
    _record: PhantomData<fn() -> T>,
}

impl<'r, T, R> QueryBuilder<'r, T, R>
where
    T: Record,
    R: Repository<T>,
{
    pub fn new(repository: &'r R) -> Self {
        Self {
            repository,
            query: Query::default(),
            _record: PhantomData,
        }
    }

    /// Shallow-merge `conditions` into the filter
    pub fn filter(mut self, conditions: Document) -> Self {
        for (key, value) in conditions {
            self.query.filter.insert(key, value);
        }
        self
    }

    /// Equality condition on `field`
    pub fn where_eq(mut self, field: &str, value: impl Into<Bson>) -> Self {
        self.query.filter.insert(field, value.into());
        self
    }

    pub fn where_in<I, V>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Bson>,
    {
        let values: Vec<Bson> = values.into_iter().map(Into::into).collect();
        self.query.filter.insert(field, doc! { "$in": values });
        self
    }

    pub fn where_not_in<I, V>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Bson>,
    {
        let values: Vec<Bson> = values.into_iter().map(Into::into).collect();
        self.query.filter.insert(field, doc! { "$nin": values });
        self
    }

    /// Open lower bound; combines with an existing `less_than` on the same field
    pub fn greater_than(self, field: &str, value: impl Into<Bson>) -> Self {
        self.range(field, "$gt", value.into())
    }

    /// Open upper bound; combines with an existing `greater_than` on the same field
    pub fn less_than(self, field: &str, value: impl Into<Bson>) -> Self {
        self.range(field, "$lt", value.into())
    }

    /// Closed `[start, end]` range, replacing any prior condition on `field`
    pub fn date_between(mut self, field: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.query.filter.insert(
            field,
            doc! {
                "$gte": bson::DateTime::from_chrono(start),
                "$lte": bson::DateTime::from_chrono(end),
            },
        );
        self
    }

    /// Full-text search over the record's text fields
    pub fn search(mut self, term: &str) -> Self {
        self.query.filter.insert("$text", doc! { "$search": term });
        self
    }

    /// Add a sort key; earlier keys take priority
    pub fn sort(mut self, field: &str, order: SortOrder) -> Self {
        self.query.sort.insert(field, order.direction());
        self
    }

    /// Restrict returned fields (`"name price"` or `"-password"`)
    pub fn select(mut self, fields: &str) -> Self {
        self.query.projection = parse_projection(fields);
        self
    }

    /// Expand a reference declared in [`Record::REFERENCES`]
    pub fn populate(mut self, path: &str, select: Option<&str>) -> Self {
        self.query.populate.push(Populate {
            path: path.to_string(),
            select: select.and_then(parse_projection),
        });
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.query.limit = limit;
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.query.skip = skip;
        self
    }

    /// Set `skip = (page - 1) * per_page` and `limit = per_page`
    pub fn paginate(mut self, page: u64, per_page: u64) -> Self {
        self.query.skip = page.saturating_sub(1).saturating_mul(per_page);
        self.query.limit = per_page;
        self
    }

    /// The query composed so far
    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn into_query(self) -> Query {
        self.query
    }

    /// Matching records, decoded
    ///
    /// Use [`Self::execute_raw`] when a projection or population changes the
    /// document shape.
    pub async fn execute(&self) -> RepositoryResult<Vec<T>> {
        self.execute_raw()
            .await?
            .into_iter()
            .map(|doc| from_document(doc, Operation::Query))
            .collect()
    }

    /// Matching documents as returned by the store
    pub async fn execute_raw(&self) -> RepositoryResult<Vec<Document>> {
        self.repository.query_documents(&self.query).await
    }

    /// First match under the declared sort, ignoring skip and limit
    pub async fn first(&self) -> RepositoryResult<Option<T>> {
        self.first_raw()
            .await?
            .map(|doc| from_document(doc, Operation::Query))
            .transpose()
    }

    pub async fn first_raw(&self) -> RepositoryResult<Option<Document>> {
        let documents = self.repository.query_documents(&self.query.first()).await?;
        Ok(documents.into_iter().next())
    }

    /// Number of records matching the filter; sort, projection and window are ignored
    pub async fn count(&self) -> RepositoryResult<u64> {
        self.repository.count(self.query.filter.clone()).await
    }

    pub async fn exists(&self) -> RepositoryResult<bool> {
        Ok(self.count().await? > 0)
    }

    fn range(mut self, field: &str, operator: &str, value: Bson) -> Self {
        let mut condition = match self.query.filter.remove(field) {
            Some(Bson::Document(existing)) if is_operator_document(&existing) => existing,
            _ => Document::new(),
        };
        condition.insert(operator, value);
        self.query.filter.insert(field, condition);
        self
    }
}

fn is_operator_document(document: &Document) -> bool {
    document.keys().next().is_some_and(|key| key.starts_with('$'))
}
