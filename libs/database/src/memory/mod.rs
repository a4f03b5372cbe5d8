//! In-process document store
//!
//! [`MemoryDatabase`] plays the role of a `mongodb::Database` handle: it is
//! created once, cloned into every [`InMemoryRepository`], and evaluates the
//! same filter documents the MongoDB repository sends to the server. Backs
//! the crate's unit tests and the domain handler tests.

mod matcher;

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use bson::{Bson, Document, oid::ObjectId};
use tokio::sync::RwLock;
use tracing::instrument;

use crate::common::{Operation, RepositoryError, RepositoryResult};
use crate::query::{Populate, Query};
use crate::record::{
    DELETED_AT, IS_DELETED, Record, from_document, merge_update, parse_object_id,
    reference_collection, to_document, validate_record,
};
use crate::repository::Repository;

pub use matcher::{compare, lookup, matches, project, sort_documents};

type Collections = HashMap<String, Vec<Document>>;

/// Shared handle to a set of in-memory collections
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    collections: Arc<RwLock<Collections>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Documents currently stored in `collection`, in insertion order
    pub async fn documents(&self, collection: &str) -> Vec<Document> {
        self.collections
            .read()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Insert a raw document, bypassing record validation
    pub async fn insert_raw(&self, collection: &str, document: Document) {
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(document);
    }

    pub async fn drop_collection(&self, collection: &str) {
        self.collections.write().await.remove(collection);
    }
}

/// [`Repository`] over a [`MemoryDatabase`] collection
///
/// Unique fields are checked under the collection write lock, so of two
/// concurrent creates with the same unique value exactly one fails with
/// [`RepositoryError::Conflict`].
pub struct InMemoryRepository<T> {
    database: MemoryDatabase,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for InMemoryRepository<T> {
    fn clone(&self) -> Self {
        Self {
            database: self.database.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: Record> InMemoryRepository<T> {
    pub fn new(database: &MemoryDatabase) -> Self {
        Self {
            database: database.clone(),
            _record: PhantomData,
        }
    }

    pub fn database(&self) -> &MemoryDatabase {
        &self.database
    }

    fn filtered<'a>(
        documents: &'a [Document],
        filter: &Document,
        op: Operation,
    ) -> RepositoryResult<Vec<&'a Document>> {
        let mut found = Vec::new();
        for document in documents {
            if matches(document, filter, T::TEXT_FIELDS).map_err(|e| RepositoryError::store(op, e))? {
                found.push(document);
            }
        }
        Ok(found)
    }

    fn position(documents: &[Document], id: ObjectId) -> Option<usize> {
        documents
            .iter()
            .position(|doc| doc.get_object_id("_id").is_ok_and(|existing| existing == id))
    }

    /// Reject `candidate` if it shares a unique value with any other document
    fn check_unique(
        documents: &[Document],
        candidate: &Document,
        skip: Option<usize>,
        op: Operation,
    ) -> RepositoryResult<()> {
        for field in T::UNIQUE_FIELDS {
            let Some(value) = lookup(candidate, field).filter(|v| !matches!(v, Bson::Null)) else {
                continue;
            };
            let clash = documents
                .iter()
                .enumerate()
                .filter(|(index, _)| Some(*index) != skip)
                .any(|(_, existing)| lookup(existing, field) == Some(value));
            if clash {
                return Err(RepositoryError::conflict(
                    op,
                    format!(
                        "E11000 duplicate key error collection: {} index: {field}_1 dup key: {{ {field}: {value} }}",
                        T::COLLECTION
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Replace each reference id with its target, or drop it when dangling
    fn populate(
        collections: &Collections,
        document: &mut Document,
        references: &[(&Populate, &str)],
    ) {
        for &(populate, collection) in references {
            let Some(Bson::ObjectId(target)) = document.get(&populate.path).cloned() else {
                continue;
            };
            let referenced = collections.get(collection).and_then(|docs| {
                docs.iter()
                    .find(|doc| doc.get_object_id("_id").is_ok_and(|id| id == target))
            });
            match referenced {
                Some(found) => {
                    let expanded = match &populate.select {
                        Some(select) => project(found, select),
                        None => found.clone(),
                    };
                    document.insert(populate.path.clone(), expanded);
                }
                None => {
                    document.remove(&populate.path);
                }
            }
        }
    }

    async fn mark(&self, id: &str, op: Operation, apply: impl FnOnce(&mut Document)) -> RepositoryResult<bool> {
        if !T::SOFT_DELETE {
            return Err(RepositoryError::soft_delete_unsupported(op));
        }
        let oid = parse_object_id(id, op)?;
        let mut collections = self.database.collections.write().await;
        let documents = collections.entry(T::COLLECTION.to_string()).or_default();
        match Self::position(documents, oid) {
            Some(index) => {
                apply(&mut documents[index]);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl<T: Record> Repository<T> for InMemoryRepository<T> {
    #[instrument(skip(self), fields(collection = T::COLLECTION))]
    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<T>> {
        let oid = parse_object_id(id, Operation::FindById)?;
        let collections = self.database.collections.read().await;
        let documents = collections.get(T::COLLECTION).map(Vec::as_slice).unwrap_or_default();
        Self::position(documents, oid)
            .map(|index| from_document(documents[index].clone(), Operation::FindById))
            .transpose()
    }

    #[instrument(skip(self), fields(collection = T::COLLECTION))]
    async fn find_one(&self, filter: Document) -> RepositoryResult<Option<T>> {
        let collections = self.database.collections.read().await;
        let documents = collections.get(T::COLLECTION).map(Vec::as_slice).unwrap_or_default();
        Self::filtered(documents, &filter, Operation::FindOne)?
            .first()
            .map(|doc| from_document((*doc).clone(), Operation::FindOne))
            .transpose()
    }

    #[instrument(skip(self), fields(collection = T::COLLECTION))]
    async fn find(&self, filter: Document) -> RepositoryResult<Vec<T>> {
        let collections = self.database.collections.read().await;
        let documents = collections.get(T::COLLECTION).map(Vec::as_slice).unwrap_or_default();
        Self::filtered(documents, &filter, Operation::Find)?
            .into_iter()
            .map(|doc| from_document(doc.clone(), Operation::Find))
            .collect()
    }

    #[instrument(skip(self, record), fields(collection = T::COLLECTION, record_id = %record.id()))]
    async fn create(&self, record: T) -> RepositoryResult<T> {
        validate_record(&record, Operation::Create)?;
        let document = to_document(&record, Operation::Create)?;

        let mut collections = self.database.collections.write().await;
        let documents = collections.entry(T::COLLECTION.to_string()).or_default();

        if Self::position(documents, record.id()).is_some() {
            return Err(RepositoryError::conflict(
                Operation::Create,
                format!("E11000 duplicate key error collection: {} index: _id_", T::COLLECTION),
            ));
        }
        Self::check_unique(documents, &document, None, Operation::Create)?;

        documents.push(document);
        Ok(record)
    }

    #[instrument(skip(self, changes), fields(collection = T::COLLECTION))]
    async fn update(&self, id: &str, changes: Document) -> RepositoryResult<Option<T>> {
        let oid = parse_object_id(id, Operation::Update)?;
        let mut collections = self.database.collections.write().await;
        let documents = collections.entry(T::COLLECTION.to_string()).or_default();

        let Some(index) = Self::position(documents, oid) else {
            return Ok(None);
        };
        let (merged, _) = merge_update::<T>(&documents[index], changes, bson::DateTime::now())?;
        Self::check_unique(documents, &merged, Some(index), Operation::Update)?;

        documents[index] = merged.clone();
        from_document(merged, Operation::Update).map(Some)
    }

    #[instrument(skip(self), fields(collection = T::COLLECTION))]
    async fn delete(&self, id: &str) -> RepositoryResult<bool> {
        let oid = parse_object_id(id, Operation::Delete)?;
        let mut collections = self.database.collections.write().await;
        let Some(documents) = collections.get_mut(T::COLLECTION) else {
            return Ok(false);
        };
        match Self::position(documents, oid) {
            Some(index) => {
                documents.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    #[instrument(skip(self), fields(collection = T::COLLECTION))]
    async fn soft_delete(&self, id: &str) -> RepositoryResult<bool> {
        self.mark(id, Operation::SoftDelete, |doc| {
            doc.insert(DELETED_AT, bson::DateTime::now());
            doc.insert(IS_DELETED, true);
        })
        .await
    }

    #[instrument(skip(self), fields(collection = T::COLLECTION))]
    async fn restore(&self, id: &str) -> RepositoryResult<bool> {
        self.mark(id, Operation::Restore, |doc| {
            doc.remove(DELETED_AT);
            doc.insert(IS_DELETED, false);
        })
        .await
    }

    #[instrument(skip(self), fields(collection = T::COLLECTION))]
    async fn count(&self, filter: Document) -> RepositoryResult<u64> {
        let collections = self.database.collections.read().await;
        let documents = collections.get(T::COLLECTION).map(Vec::as_slice).unwrap_or_default();
        Ok(Self::filtered(documents, &filter, Operation::Count)?.len() as u64)
    }

    #[instrument(skip(self, query), fields(collection = T::COLLECTION))]
    async fn query_documents(&self, query: &Query) -> RepositoryResult<Vec<Document>> {
        let references = query
            .populate
            .iter()
            .map(|populate| Ok((populate, reference_collection::<T>(&populate.path)?)))
            .collect::<RepositoryResult<Vec<_>>>()?;

        let collections = self.database.collections.read().await;
        let documents = collections.get(T::COLLECTION).map(Vec::as_slice).unwrap_or_default();

        let mut results: Vec<Document> = Self::filtered(documents, &query.filter, Operation::Query)?
            .into_iter()
            .cloned()
            .collect();

        sort_documents(&mut results, &query.sort);

        if let Some(projection) = &query.projection {
            results = results.iter().map(|doc| project(doc, projection)).collect();
        }

        for document in results.iter_mut() {
            Self::populate(&collections, document, &references);
        }

        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let results = results.into_iter().skip(skip);
        Ok(if query.limit > 0 {
            let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);
            results.take(limit).collect()
        } else {
            results.collect()
        })
    }
}
