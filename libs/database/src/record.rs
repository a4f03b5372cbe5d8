//! Persistable record contract and BSON conversion helpers

use bson::{Document, oid::ObjectId};
use serde::{Serialize, de::DeserializeOwned};
use validator::Validate;

use crate::common::{Operation, RepositoryError, RepositoryResult};

/// Field set on soft-deleted records
pub const DELETED_AT: &str = "deletedAt";
/// Flag set on soft-deleted records
pub const IS_DELETED: &str = "isDeleted";
/// Conventional creation timestamp, also the default pagination sort key
pub const CREATED_AT: &str = "createdAt";

/// A structured entity stored in one collection of the document store
///
/// Records are serialised with `_id: ObjectId` as their identity. Store-level
/// schema validation is expressed through [`Validate`] and re-run on every
/// create and update.
///
/// ```ignore
/// #[derive(Clone, Serialize, Deserialize, Validate)]
/// #[serde(rename_all = "camelCase")]
/// struct Note {
///     #[serde(rename = "_id")]
///     id: ObjectId,
///     #[validate(length(min = 1))]
///     title: String,
/// }
///
/// impl Record for Note {
///     const COLLECTION: &'static str = "notes";
///     const TEXT_FIELDS: &'static [&'static str] = &["title"];
///
///     fn id(&self) -> ObjectId {
///         self.id
///     }
/// }
/// ```
pub trait Record:
    Serialize + DeserializeOwned + Validate + Clone + Send + Sync + Unpin + 'static
{
    /// Collection holding records of this type
    const COLLECTION: &'static str;

    /// Whether the record carries `deletedAt`/`isDeleted` soft-delete markers
    const SOFT_DELETE: bool = false;

    /// Fields with a uniqueness constraint
    const UNIQUE_FIELDS: &'static [&'static str] = &[];

    /// Fields covered by full-text search
    const TEXT_FIELDS: &'static [&'static str] = &[];

    /// `(field, collection)` pairs that `populate` may expand
    const REFERENCES: &'static [(&'static str, &'static str)] = &[];

    /// Timestamp stamped on every update, if any
    const UPDATED_AT: Option<&'static str> = Some("updatedAt");

    fn id(&self) -> ObjectId;
}

/// Collection referenced by `path`; an undeclared path fails the query
pub fn reference_collection<T: Record>(path: &str) -> RepositoryResult<&'static str> {
    T::REFERENCES
        .iter()
        .find(|(field, _)| *field == path)
        .map(|(_, collection)| *collection)
        .ok_or_else(|| {
            RepositoryError::store(
                Operation::Query,
                format!("'{path}' is not a reference of {}", T::COLLECTION),
            )
        })
}

pub fn parse_object_id(id: &str, op: Operation) -> RepositoryResult<ObjectId> {
    ObjectId::parse_str(id.trim()).map_err(|_| RepositoryError::invalid_id(op, id))
}

pub fn to_document<T: Record>(record: &T, op: Operation) -> RepositoryResult<Document> {
    bson::to_document(record).map_err(|e| RepositoryError::decode(op, e))
}

pub fn from_document<T: Record>(document: Document, op: Operation) -> RepositoryResult<T> {
    bson::from_document(document).map_err(|e| RepositoryError::decode(op, e))
}

/// Run schema validation, mapping failures to [`RepositoryError::Validation`]
pub fn validate_record<T: Record>(record: &T, op: Operation) -> RepositoryResult<()> {
    record
        .validate()
        .map_err(|e| RepositoryError::validation(op, e))
}

/// Apply a partial update to a stored document and validate the outcome
///
/// Returns the merged document together with the `$set` payload to persist.
/// `changes` holds whole top-level fields: operator (`$inc`) and dotted
/// (`a.b`) keys are rejected. `_id` is ignored and the record's `UPDATED_AT`
/// field is stamped.
pub fn merge_update<T: Record>(
    current: &Document,
    changes: Document,
    now: bson::DateTime,
) -> RepositoryResult<(Document, Document)> {
    if let Some(key) = changes
        .keys()
        .find(|key| key.starts_with('$') || key.contains('.'))
    {
        return Err(RepositoryError::validation(
            Operation::Update,
            format!("'{key}' is not a top-level field name"),
        ));
    }

    let mut set = changes;
    set.remove("_id");
    if let Some(field) = T::UPDATED_AT {
        set.insert(field, now);
    }

    let mut merged = current.clone();
    for (key, value) in set.iter() {
        merged.insert(key.clone(), value.clone());
    }

    let record: T = bson::from_document(merged.clone())
        .map_err(|e| RepositoryError::validation(Operation::Update, e))?;
    validate_record(&record, Operation::Update)?;

    Ok((merged, set))
}
