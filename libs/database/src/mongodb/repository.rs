//! MongoDB implementation of [`Repository`]

use std::marker::PhantomData;

use async_trait::async_trait;
use bson::{Bson, Document, doc};
use futures::TryStreamExt;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{FindOptions, IndexOptions, ReturnDocument};
use mongodb::{Collection, Database, IndexModel};
use tracing::instrument;

use crate::common::{Operation, RepositoryError, RepositoryResult};
use crate::query::Query;
use crate::record::{
    CREATED_AT, DELETED_AT, IS_DELETED, Record, from_document, merge_update, parse_object_id,
    reference_collection, to_document, validate_record,
};
use crate::repository::Repository;

const DUPLICATE_KEY: i32 = 11000;

/// Read-merge-write rounds before a contended update gives up
const UPDATE_ATTEMPTS: u32 = 3;

/// Repository over one MongoDB collection, named by `T::COLLECTION`
pub struct MongoRepository<T> {
    collection: Collection<Document>,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for MongoRepository<T> {
    fn clone(&self) -> Self {
        Self {
            collection: self.collection.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: Record> MongoRepository<T> {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, T::COLLECTION)
    }

    /// Use a custom collection name
    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<Document>(collection_name),
            _record: PhantomData,
        }
    }

    /// Get the underlying collection for advanced operations
    pub fn collection(&self) -> &Collection<Document> {
        &self.collection
    }

    /// Create the unique, text and `createdAt` indexes the record declares
    ///
    /// Unique indexes back the conflict guarantee on create and update; call
    /// this once at startup.
    pub async fn init_indexes(&self) -> RepositoryResult<()> {
        let mut indexes: Vec<IndexModel> = T::UNIQUE_FIELDS
            .iter()
            .map(|field| {
                let mut keys = Document::new();
                keys.insert(*field, 1);
                IndexModel::builder()
                    .keys(keys)
                    .options(
                        IndexOptions::builder()
                            .unique(true)
                            .name(format!("idx_{field}_unique"))
                            .build(),
                    )
                    .build()
            })
            .collect();

        if !T::TEXT_FIELDS.is_empty() {
            let mut keys = Document::new();
            for field in T::TEXT_FIELDS {
                keys.insert(*field, "text");
            }
            indexes.push(
                IndexModel::builder()
                    .keys(keys)
                    .options(
                        IndexOptions::builder()
                            .name("idx_text_search".to_string())
                            .build(),
                    )
                    .build(),
            );
        }

        indexes.push(
            IndexModel::builder()
                .keys(doc! { CREATED_AT: -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_created_at".to_string())
                        .build(),
                )
                .build(),
        );

        self.collection
            .create_indexes(indexes)
            .await
            .map_err(|e| map_error(Operation::CreateIndexes, e))?;

        tracing::info!(collection = T::COLLECTION, "Indexes created successfully");
        Ok(())
    }

    async fn find_all(&self, filter: Document, op: Operation) -> RepositoryResult<Vec<T>> {
        let cursor = self
            .collection
            .find(filter)
            .await
            .map_err(|e| map_error(op, e))?;
        let documents: Vec<Document> = cursor.try_collect().await.map_err(|e| map_error(op, e))?;

        documents
            .into_iter()
            .map(|doc| from_document(doc, op))
            .collect()
    }

    /// `$set` on the document only if it still equals `snapshot`
    ///
    /// `None` means another writer changed or removed it since it was read.
    async fn write_if_unchanged(
        &self,
        snapshot: Document,
        set: Document,
    ) -> RepositoryResult<Option<Document>> {
        self.collection
            .find_one_and_update(snapshot, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| map_error(Operation::Update, e))
    }

    async fn mark(&self, id: &str, op: Operation, update: Document) -> RepositoryResult<bool> {
        if !T::SOFT_DELETE {
            return Err(RepositoryError::soft_delete_unsupported(op));
        }
        let oid = parse_object_id(id, op)?;
        let result = self
            .collection
            .update_one(doc! { "_id": oid }, update)
            .await
            .map_err(|e| map_error(op, e))?;
        Ok(result.matched_count > 0)
    }

    /// `$lookup` + `$unwind` stages resolving each populate path to its referenced record
    fn populate_stages(query: &Query) -> RepositoryResult<Vec<Document>> {
        let mut stages = Vec::with_capacity(query.populate.len() * 2);

        for populate in &query.populate {
            let from = reference_collection::<T>(&populate.path)?;

            let mut lookup = doc! {
                "from": from,
                "localField": populate.path.as_str(),
                "foreignField": "_id",
                "as": populate.path.as_str(),
            };
            if let Some(select) = &populate.select {
                lookup.insert("pipeline", vec![doc! { "$project": select.clone() }]);
            }

            stages.push(doc! { "$lookup": lookup });
            stages.push(doc! {
                "$unwind": {
                    "path": format!("${}", populate.path),
                    "preserveNullAndEmptyArrays": true,
                }
            });
        }

        Ok(stages)
    }
}

/// Translate a driver error, classifying duplicate-key failures as conflicts
fn map_error(op: Operation, error: mongodb::error::Error) -> RepositoryError {
    let code = match error.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => Some(write_error.code),
        ErrorKind::Command(command_error) => Some(command_error.code),
        _ => None,
    };

    if code == Some(DUPLICATE_KEY) {
        RepositoryError::conflict(op, error)
    } else {
        RepositoryError::store(op, error)
    }
}

#[async_trait]
impl<T: Record> Repository<T> for MongoRepository<T> {
    #[instrument(skip(self), fields(collection = T::COLLECTION))]
    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<T>> {
        let oid = parse_object_id(id, Operation::FindById)?;
        self.find_one(doc! { "_id": oid })
            .await
            .map_err(|e| e.within(Operation::FindById))
    }

    #[instrument(skip(self, filter), fields(collection = T::COLLECTION))]
    async fn find_one(&self, filter: Document) -> RepositoryResult<Option<T>> {
        self.collection
            .find_one(filter)
            .await
            .map_err(|e| map_error(Operation::FindOne, e))?
            .map(|doc| from_document(doc, Operation::FindOne))
            .transpose()
    }

    #[instrument(skip(self, filter), fields(collection = T::COLLECTION))]
    async fn find(&self, filter: Document) -> RepositoryResult<Vec<T>> {
        self.find_all(filter, Operation::Find).await
    }

    #[instrument(skip(self, record), fields(collection = T::COLLECTION))]
    async fn create(&self, record: T) -> RepositoryResult<T> {
        validate_record(&record, Operation::Create)?;
        let document = to_document(&record, Operation::Create)?;

        self.collection
            .insert_one(document)
            .await
            .map_err(|e| map_error(Operation::Create, e))?;

        tracing::info!(record_id = %record.id(), "Document created");
        Ok(record)
    }

    #[instrument(skip(self, changes), fields(collection = T::COLLECTION))]
    async fn update(&self, id: &str, changes: Document) -> RepositoryResult<Option<T>> {
        let oid = parse_object_id(id, Operation::Update)?;

        for attempt in 1..=UPDATE_ATTEMPTS {
            let Some(current) = self
                .collection
                .find_one(doc! { "_id": oid })
                .await
                .map_err(|e| map_error(Operation::Update, e))?
            else {
                return Ok(None);
            };

            let (merged, set) = merge_update::<T>(&current, changes.clone(), bson::DateTime::now())?;
            if set.is_empty() {
                return from_document(merged, Operation::Update).map(Some);
            }

            // validated against `current`, so only write over that exact state
            match self.write_if_unchanged(current, set).await? {
                Some(updated) => return from_document(updated, Operation::Update).map(Some),
                None => tracing::debug!(attempt, record_id = %oid, "Document changed since read, retrying"),
            }
        }

        Err(RepositoryError::conflict(
            Operation::Update,
            format!("document {oid} kept changing during {UPDATE_ATTEMPTS} attempts"),
        ))
    }

    #[instrument(skip(self), fields(collection = T::COLLECTION))]
    async fn delete(&self, id: &str) -> RepositoryResult<bool> {
        let oid = parse_object_id(id, Operation::Delete)?;
        let result = self
            .collection
            .delete_one(doc! { "_id": oid })
            .await
            .map_err(|e| map_error(Operation::Delete, e))?;
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self), fields(collection = T::COLLECTION))]
    async fn soft_delete(&self, id: &str) -> RepositoryResult<bool> {
        let update = doc! {
            "$set": { DELETED_AT: bson::DateTime::now(), IS_DELETED: true }
        };
        self.mark(id, Operation::SoftDelete, update).await
    }

    #[instrument(skip(self), fields(collection = T::COLLECTION))]
    async fn restore(&self, id: &str) -> RepositoryResult<bool> {
        let update = doc! {
            "$unset": { DELETED_AT: "" },
            "$set": { IS_DELETED: false },
        };
        self.mark(id, Operation::Restore, update).await
    }

    #[instrument(skip(self, filter), fields(collection = T::COLLECTION))]
    async fn count(&self, filter: Document) -> RepositoryResult<u64> {
        self.collection
            .count_documents(filter)
            .await
            .map_err(|e| map_error(Operation::Count, e))
    }

    #[instrument(skip(self, query), fields(collection = T::COLLECTION))]
    async fn query_documents(&self, query: &Query) -> RepositoryResult<Vec<Document>> {
        let cursor = if query.populate.is_empty() {
            let mut options = FindOptions::default();
            if !query.sort.is_empty() {
                options.sort = Some(query.sort.clone());
            }
            options.projection = query.projection.clone();
            if query.skip > 0 {
                options.skip = Some(query.skip);
            }
            if query.limit > 0 {
                options.limit = Some(i64::try_from(query.limit).unwrap_or(i64::MAX));
            }

            self.collection
                .find(query.filter.clone())
                .with_options(options)
                .await
        } else {
            let mut pipeline = vec![doc! { "$match": query.filter.clone() }];
            if !query.sort.is_empty() {
                pipeline.push(doc! { "$sort": query.sort.clone() });
            }
            if query.skip > 0 {
                pipeline.push(doc! { "$skip": Bson::Int64(i64::try_from(query.skip).unwrap_or(i64::MAX)) });
            }
            if query.limit > 0 {
                pipeline.push(doc! { "$limit": Bson::Int64(i64::try_from(query.limit).unwrap_or(i64::MAX)) });
            }
            if let Some(projection) = &query.projection {
                pipeline.push(doc! { "$project": projection.clone() });
            }
            pipeline.extend(Self::populate_stages(query)?);

            self.collection.aggregate(pipeline).await
        }
        .map_err(|e| map_error(Operation::Query, e))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| map_error(Operation::Query, e))
    }
}
