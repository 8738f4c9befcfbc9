//! The in-memory document store.
//!
//! [`MemoryStore`] keeps collections as plain vectors of JSON documents
//! behind an `RwLock` and evaluates the compiled query tree directly.
//! It is the reference implementation of the filter semantics and the
//! default backend for tests and single-process deployments.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use futures::stream::BoxStream;
use parking_lot::RwLock;
use regex::Regex;
use serde_json::Value;

use tickethub_model::field::is_date_like;

use crate::error::{StoreError, StoreResult};
use crate::query::coerce::parse_point_in_time;
use crate::query::{PageRequest, QueryDocument, QueryNode, ScalarValue, SortDirection, SortSpec};

use super::DocumentStore;

/// An in-memory, lock-protected document store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection, unfiltered.
    pub fn collection_len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map_or(0, Vec::len)
    }

    fn matching(&self, collection: &str, filter: &QueryDocument) -> StoreResult<Vec<Value>> {
        let collections = self.collections.read();
        let Some(documents) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut matches = Vec::new();
        for document in documents {
            if matches_filter(document, filter)? {
                matches.push(document.clone());
            }
        }
        Ok(matches)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn count(&self, collection: &str, filter: &QueryDocument) -> StoreResult<u64> {
        Ok(self.matching(collection, filter)?.len() as u64)
    }

    async fn find(
        &self,
        collection: &str,
        filter: &QueryDocument,
        sort: &SortSpec,
        page: Option<PageRequest>,
    ) -> StoreResult<Vec<Value>> {
        let mut documents = self.matching(collection, filter)?;
        sort_documents(&mut documents, sort);

        if let Some(page) = page {
            documents = documents
                .into_iter()
                .skip(page.offset as usize)
                .take(page.limit as usize)
                .collect();
        }

        Ok(documents)
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &QueryDocument,
    ) -> StoreResult<Option<Value>> {
        Ok(self.matching(collection, filter)?.into_iter().next())
    }

    async fn stream(
        &self,
        collection: &str,
        filter: &QueryDocument,
        sort: &SortSpec,
    ) -> StoreResult<BoxStream<'static, StoreResult<Value>>> {
        // Snapshot taken up front; the stream itself holds no lock, so a
        // slow or disconnecting consumer costs nothing but the snapshot.
        let mut documents = self.matching(collection, filter)?;
        sort_documents(&mut documents, sort);
        Ok(futures::stream::iter(documents.into_iter().map(Ok)).boxed())
    }

    async fn insert(&self, collection: &str, document: Value) -> StoreResult<()> {
        if !document.is_object() {
            return Err(StoreError::Serialization {
                message: "only objects can be stored".to_string(),
            });
        }
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .push(document);
        Ok(())
    }

    async fn delete_one(&self, collection: &str, filter: &QueryDocument) -> StoreResult<bool> {
        let mut collections = self.collections.write();
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(false);
        };

        let mut found = None;
        for (index, document) in documents.iter().enumerate() {
            if matches_filter(document, filter)? {
                found = Some(index);
                break;
            }
        }

        match found {
            Some(index) => {
                documents.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// --- query evaluation ---

fn matches_filter(document: &Value, filter: &QueryDocument) -> StoreResult<bool> {
    for (field, node) in filter.iter() {
        let actual = resolve_path(document, field);
        if !node_matches(actual, node)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn resolve_path<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = document;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn node_matches(actual: Option<&Value>, node: &QueryNode) -> StoreResult<bool> {
    match node {
        QueryNode::Scalar(expected) => Ok(scalar_eq(actual, expected)),
        QueryNode::Document(condition) => condition_matches(actual, condition),
        QueryNode::List(_) => Err(unsupported("bare list outside $in")),
    }
}

fn condition_matches(actual: Option<&Value>, condition: &QueryDocument) -> StoreResult<bool> {
    for (operator, operand) in condition.iter() {
        let holds = match (operator, operand) {
            ("$eq", QueryNode::Scalar(expected)) => scalar_eq(actual, expected),
            ("$ne", QueryNode::Scalar(expected)) => !scalar_eq(actual, expected),
            ("$gt", QueryNode::Scalar(expected)) => {
                ordering_holds(actual, expected, &[Ordering::Greater])
            }
            ("$gte", QueryNode::Scalar(expected)) => {
                ordering_holds(actual, expected, &[Ordering::Greater, Ordering::Equal])
            }
            ("$lt", QueryNode::Scalar(expected)) => {
                ordering_holds(actual, expected, &[Ordering::Less])
            }
            ("$lte", QueryNode::Scalar(expected)) => {
                ordering_holds(actual, expected, &[Ordering::Less, Ordering::Equal])
            }
            ("$regex", QueryNode::Scalar(ScalarValue::String(pattern))) => {
                let insensitive = matches!(
                    condition.get("$options"),
                    Some(QueryNode::Scalar(ScalarValue::String(options))) if options.contains('i')
                );
                regex_matches(actual, pattern, insensitive)?
            }
            ("$options", _) => continue,
            ("$not", QueryNode::Document(inner)) => !condition_matches(actual, inner)?,
            ("$in", QueryNode::List(candidates)) => in_matches(actual, candidates),
            ("$exists", QueryNode::Scalar(ScalarValue::Boolean(expected))) => {
                actual.is_some() == *expected
            }
            ("$size", QueryNode::Scalar(ScalarValue::Number(expected))) => actual
                .and_then(Value::as_array)
                .is_some_and(|items| items.len() as f64 == *expected),
            ("$type", QueryNode::Scalar(ScalarValue::String(name))) => {
                type_matches(actual, name)?
            }
            (other, _) => return Err(unsupported(other)),
        };

        if !holds {
            return Ok(false);
        }
    }
    Ok(true)
}

fn scalar_eq(actual: Option<&Value>, expected: &ScalarValue) -> bool {
    // Null compares equal to an absent field, as document stores do.
    if matches!(expected, ScalarValue::Null) {
        return matches!(actual, None | Some(Value::Null));
    }

    let Some(actual) = actual else { return false };

    // A filter scalar also matches any element of an array field.
    if let Value::Array(items) = actual {
        return items.iter().any(|item| value_eq(item, expected));
    }

    value_eq(actual, expected)
}

fn value_eq(actual: &Value, expected: &ScalarValue) -> bool {
    match expected {
        ScalarValue::Number(n) => actual.as_f64().is_some_and(|m| m == *n),
        ScalarValue::Boolean(b) => actual.as_bool().is_some_and(|a| a == *b),
        ScalarValue::String(s) => actual.as_str().is_some_and(|a| a == s),
        ScalarValue::Date(d) => document_date(actual).is_some_and(|a| a == *d),
        ScalarValue::Null => actual.is_null(),
    }
}

fn ordering_holds(actual: Option<&Value>, expected: &ScalarValue, accepted: &[Ordering]) -> bool {
    compare_to_scalar(actual, expected).is_some_and(|ordering| accepted.contains(&ordering))
}

/// Compares a document value against a filter scalar. `None` means the
/// two are not comparable, which never satisfies an ordering operator.
fn compare_to_scalar(actual: Option<&Value>, expected: &ScalarValue) -> Option<Ordering> {
    let actual = actual?;
    match expected {
        ScalarValue::Number(n) => actual.as_f64()?.partial_cmp(n),
        ScalarValue::String(s) => Some(actual.as_str()?.cmp(s.as_str())),
        ScalarValue::Date(d) => Some(document_date(actual)?.cmp(d)),
        ScalarValue::Boolean(b) => Some(actual.as_bool()?.cmp(b)),
        ScalarValue::Null => None,
    }
}

fn document_date(value: &Value) -> Option<DateTime<Utc>> {
    parse_point_in_time(value.as_str()?)
}

fn regex_matches(actual: Option<&Value>, pattern: &str, insensitive: bool) -> StoreResult<bool> {
    let source = if insensitive {
        format!("(?i){}", pattern)
    } else {
        pattern.to_string()
    };
    let regex = Regex::new(&source).map_err(|err| StoreError::Query {
        message: format!("invalid regular expression '{}': {}", pattern, err),
    })?;

    Ok(match actual {
        Some(Value::String(s)) => regex.is_match(s),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .any(|s| regex.is_match(s)),
        _ => false,
    })
}

fn in_matches(actual: Option<&Value>, candidates: &[ScalarValue]) -> bool {
    candidates.iter().any(|candidate| scalar_eq(actual, candidate))
}

fn type_matches(actual: Option<&Value>, name: &str) -> StoreResult<bool> {
    let Some(actual) = actual else {
        return Ok(false);
    };
    let matched = match name {
        "int" => actual.as_f64().is_some_and(|n| n.fract() == 0.0),
        "array" => actual.is_array(),
        "object" => actual.is_object(),
        "string" => actual.is_string(),
        "bool" => actual.is_boolean(),
        "date" => actual.as_str().is_some_and(is_date_like),
        other => return Err(unsupported(&format!("$type '{}'", other))),
    };
    Ok(matched)
}

fn unsupported(what: &str) -> StoreError {
    StoreError::Query {
        message: format!("unsupported operator: {}", what),
    }
}

// --- sorting ---

fn sort_documents(documents: &mut [Value], sort: &SortSpec) {
    if sort.is_natural() {
        return;
    }

    documents.sort_by(|a, b| {
        for key in sort.keys() {
            let ordering = compare_for_sort(
                resolve_path(a, &key.field),
                resolve_path(b, &key.field),
            );
            let ordering = match key.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

fn compare_for_sort(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let rank_a = sort_rank(a);
    let rank_b = sort_rank(b);
    if rank_a != rank_b {
        return rank_a.cmp(&rank_b);
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .zip(y.as_f64())
            .map_or(Ordering::Equal, |(x, y)| x.total_cmp(&y)),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

/// Missing and null first, then booleans, numbers, strings, containers.
fn sort_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Object(_)) => 5,
    }
}
