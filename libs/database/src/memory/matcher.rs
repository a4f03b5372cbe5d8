//! Filter evaluation, ordering and projection over plain BSON documents

use std::cmp::Ordering;

use bson::{Bson, Document};
use regex::RegexBuilder;

use crate::query::is_included;

/// Resolve a dotted path through nested documents
pub fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut segments = path.split('.');
    let mut current = document.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Bson::Document(inner) => inner.get(segment)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Whether `document` satisfies every condition in `filter`
///
/// `text_fields` backs `$text` searches. Unknown operators are errors.
pub fn matches(document: &Document, filter: &Document, text_fields: &[&str]) -> Result<bool, String> {
    for (key, condition) in filter {
        let satisfied = match key.as_str() {
            "$and" => all_of(document, condition, text_fields)?,
            "$or" => any_of(document, condition, text_fields)?,
            "$nor" => !any_of(document, condition, text_fields)?,
            "$text" => text_search(document, condition, text_fields)?,
            op if op.starts_with('$') => {
                return Err(format!("unsupported top-level operator {op}"));
            }
            path => field_matches(lookup(document, path), condition)?,
        };
        if !satisfied {
            return Ok(false);
        }
    }
    Ok(true)
}

fn sub_filters(condition: &Bson) -> Result<Vec<&Document>, String> {
    match condition {
        Bson::Array(items) => items
            .iter()
            .map(|item| match item {
                Bson::Document(doc) => Ok(doc),
                other => Err(format!("logical operator expects documents, got {other}")),
            })
            .collect(),
        other => Err(format!("logical operator expects an array, got {other}")),
    }
}

fn all_of(document: &Document, condition: &Bson, text_fields: &[&str]) -> Result<bool, String> {
    for filter in sub_filters(condition)? {
        if !matches(document, filter, text_fields)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn any_of(document: &Document, condition: &Bson, text_fields: &[&str]) -> Result<bool, String> {
    for filter in sub_filters(condition)? {
        if matches(document, filter, text_fields)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Case-insensitive word match of any search term against the text fields
fn text_search(document: &Document, condition: &Bson, text_fields: &[&str]) -> Result<bool, String> {
    let term = match condition {
        Bson::Document(text) => text
            .get_str("$search")
            .map_err(|_| "$text requires a string $search".to_string())?,
        _ => return Err("$text requires a document".to_string()),
    };
    if text_fields.is_empty() {
        return Err("text search requires text fields on the collection".to_string());
    }

    let terms: Vec<String> = term.split_whitespace().map(str::to_lowercase).collect();
    let found = text_fields.iter().any(|field| {
        let Some(Bson::String(text)) = lookup(document, field) else {
            return false;
        };
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .any(|word| terms.iter().any(|t| word.to_lowercase() == *t))
    });
    Ok(found)
}

fn field_matches(actual: Option<&Bson>, condition: &Bson) -> Result<bool, String> {
    match condition {
        Bson::Document(ops) if is_operator_document(ops) => {
            for (op, operand) in ops {
                let satisfied = match op.as_str() {
                    "$eq" => equals(actual, operand),
                    "$ne" => !equals(actual, operand),
                    "$gt" => compares(actual, operand, |o| o == Ordering::Greater),
                    "$gte" => compares(actual, operand, |o| o != Ordering::Less),
                    "$lt" => compares(actual, operand, |o| o == Ordering::Less),
                    "$lte" => compares(actual, operand, |o| o != Ordering::Greater),
                    "$in" => in_set(actual, operand)?,
                    "$nin" => !in_set(actual, operand)?,
                    "$exists" => actual.is_some() == truthy(operand),
                    "$regex" => regex_matches(actual, operand, ops.get_str("$options").ok())?,
                    "$options" => true,
                    other => return Err(format!("unsupported operator {other}")),
                };
                if !satisfied {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Bson::RegularExpression(re) => {
            regex_matches(actual, &Bson::String(re.pattern.clone()), Some(&re.options))
        }
        expected => Ok(equals(actual, expected)),
    }
}

fn is_operator_document(document: &Document) -> bool {
    document.keys().next().is_some_and(|key| key.starts_with('$'))
}

fn truthy(value: &Bson) -> bool {
    match value {
        Bson::Boolean(b) => *b,
        Bson::Null => false,
        other => is_included(other),
    }
}

/// Equality with array-contains semantics; a missing field equals `null`
fn equals(actual: Option<&Bson>, expected: &Bson) -> bool {
    match actual {
        None => matches!(expected, Bson::Null),
        Some(Bson::Array(items)) if !matches!(expected, Bson::Array(_)) => {
            items.iter().any(|item| values_equal(item, expected))
        }
        Some(value) => values_equal(value, expected),
    }
}

fn values_equal(a: &Bson, b: &Bson) -> bool {
    match (as_f64(a), as_f64(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn compares(actual: Option<&Bson>, operand: &Bson, accept: impl Fn(Ordering) -> bool) -> bool {
    let check = |value: &Bson| {
        if rank(value) != rank(operand) {
            return false;
        }
        compare_values(value, operand).is_some_and(&accept)
    };
    match actual {
        None => false,
        Some(Bson::Array(items)) => items.iter().any(check),
        Some(value) => check(value),
    }
}

fn in_set(actual: Option<&Bson>, operand: &Bson) -> Result<bool, String> {
    match operand {
        Bson::Array(candidates) => Ok(candidates.iter().any(|c| equals(actual, c))),
        other => Err(format!("$in/$nin expects an array, got {other}")),
    }
}

fn regex_matches(actual: Option<&Bson>, pattern: &Bson, options: Option<&str>) -> Result<bool, String> {
    let (pattern, inline_options) = match pattern {
        Bson::String(p) => (p.as_str(), None),
        Bson::RegularExpression(re) => (re.pattern.as_str(), Some(re.options.as_str())),
        other => return Err(format!("$regex expects a string, got {other}")),
    };
    let options = options.or(inline_options).unwrap_or_default();
    let regex = RegexBuilder::new(pattern)
        .case_insensitive(options.contains('i'))
        .multi_line(options.contains('m'))
        .build()
        .map_err(|e| e.to_string())?;

    Ok(match actual {
        Some(Bson::String(s)) => regex.is_match(s),
        Some(Bson::Array(items)) => items
            .iter()
            .any(|item| matches!(item, Bson::String(s) if regex.is_match(s))),
        _ => false,
    })
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(f64::from(*n)),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(n) => Some(*n),
        _ => None,
    }
}

/// Cross-type ordering bucket, following the store's BSON comparison order
fn rank(value: &Bson) -> u8 {
    match value {
        Bson::MinKey => 0,
        Bson::Null | Bson::Undefined => 1,
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_) => 2,
        Bson::String(_) | Bson::Symbol(_) => 3,
        Bson::Document(_) => 4,
        Bson::Array(_) => 5,
        Bson::Binary(_) => 6,
        Bson::ObjectId(_) => 7,
        Bson::Boolean(_) => 8,
        Bson::DateTime(_) => 9,
        Bson::Timestamp(_) => 10,
        Bson::RegularExpression(_) => 11,
        Bson::MaxKey => 13,
        _ => 12,
    }
}

fn compare_values(a: &Bson, b: &Bson) -> Option<Ordering> {
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => Some(x.cmp(y)),
        (Bson::ObjectId(x), Bson::ObjectId(y)) => Some(x.bytes().cmp(&y.bytes())),
        (Bson::Boolean(x), Bson::Boolean(y)) => Some(x.cmp(y)),
        (Bson::DateTime(x), Bson::DateTime(y)) => Some(x.timestamp_millis().cmp(&y.timestamp_millis())),
        (Bson::Timestamp(x), Bson::Timestamp(y)) => Some((x.time, x.increment).cmp(&(y.time, y.increment))),
        _ => match (as_f64(a), as_f64(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => None,
        },
    }
}

/// Total order used for sorting; missing fields sort as `null`
pub fn compare(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    let a = a.unwrap_or(&Bson::Null);
    let b = b.unwrap_or(&Bson::Null);
    rank(a)
        .cmp(&rank(b))
        .then_with(|| compare_values(a, b).unwrap_or(Ordering::Equal))
}

/// Stable multi-key sort; `sort` maps field to `1` or `-1`
pub fn sort_documents(documents: &mut [Document], sort: &Document) {
    if sort.is_empty() {
        return;
    }
    let keys: Vec<(&str, bool)> = sort
        .iter()
        .map(|(field, direction)| (field.as_str(), as_f64(direction).is_some_and(|d| d < 0.0)))
        .collect();

    documents.sort_by(|a, b| {
        for (field, descending) in &keys {
            let ordering = compare(lookup(a, field), lookup(b, field));
            let ordering = if *descending { ordering.reverse() } else { ordering };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

/// Apply an inclusion or exclusion projection to top-level fields
///
/// `_id` is kept unless explicitly excluded.
pub fn project(document: &Document, projection: &Document) -> Document {
    let inclusive = projection
        .iter()
        .any(|(field, value)| field != "_id" && is_included(value));

    if inclusive {
        let mut projected = Document::new();
        if projection.get("_id").is_none_or(is_included) {
            if let Some(id) = document.get("_id") {
                projected.insert("_id", id.clone());
            }
        }
        for (field, value) in projection {
            if field == "_id" || !is_included(value) {
                continue;
            }
            if let Some(found) = document.get(field) {
                projected.insert(field.clone(), found.clone());
            }
        }
        projected
    } else {
        let mut projected = document.clone();
        for (field, value) in projection {
            if !is_included(value) {
                projected.remove(field);
            }
        }
        projected
    }
}
