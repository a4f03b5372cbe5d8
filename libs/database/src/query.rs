//! Store-neutral description of a read

use bson::{Bson, Document};

use crate::pagination::PaginationParams;

/// Relation expansion request
#[derive(Debug, Clone, PartialEq)]
pub struct Populate {
    /// Field holding the referenced id
    pub path: String,
    /// Projection applied to the referenced document
    pub select: Option<Document>,
}

/// A composed read against one collection
///
/// Stores apply the parts in a fixed order regardless of how the query was
/// built: filter, sort, projection, population, skip, limit. A zero `skip` or
/// `limit` is not applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filter: Document,
    /// Sort keys in priority order, each `1` or `-1`
    pub sort: Document,
    pub projection: Option<Document>,
    pub populate: Vec<Populate>,
    pub skip: u64,
    pub limit: u64,
}

impl Query {
    pub fn new(filter: Document) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    /// Window a filter according to pagination parameters
    pub fn page(filter: Document, params: &PaginationParams) -> Self {
        let mut sort = Document::new();
        sort.insert(params.sort_field(), params.sort_order().direction());
        Self {
            filter,
            sort,
            skip: params.skip(),
            limit: params.limit(),
            ..Self::default()
        }
    }

    /// Same query restricted to its first match, ignoring skip and limit
    pub fn first(&self) -> Self {
        Self {
            skip: 0,
            limit: 1,
            ..self.clone()
        }
    }
}

/// Parse a space separated field list into a projection
///
/// `"name email"` includes fields, `"-password"` excludes them. Returns `None`
/// for an empty list.
pub fn parse_projection(fields: &str) -> Option<Document> {
    let mut projection = Document::new();
    for field in fields.split_whitespace() {
        match field.strip_prefix('-') {
            Some(excluded) if !excluded.is_empty() => {
                projection.insert(excluded, 0);
            }
            Some(_) => {}
            None => {
                projection.insert(field, 1);
            }
        }
    }
    (!projection.is_empty()).then_some(projection)
}

/// Whether a projection value switches a field on
pub(crate) fn is_included(value: &Bson) -> bool {
    match value {
        Bson::Boolean(b) => *b,
        Bson::Int32(n) => *n != 0,
        Bson::Int64(n) => *n != 0,
        Bson::Double(n) => *n != 0.0,
        _ => true,
    }
}
