//! Typed scalar values and the abstract query tree.
//!
//! The tree mirrors a Mongo-style filter language without committing to
//! any wire protocol: a [`QueryDocument`] maps field paths to
//! [`QueryNode`]s, and operator fragments are themselves small documents
//! keyed by operator names such as `$eq` or `$regex`. Entries are kept
//! in a sorted map so the compiled tree is deterministic for a given
//! input.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

/// A typed value produced by coercion of a query-string literal.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    /// A numeric value. Integers are carried as floats, matching stores
    /// that have no distinct integer type.
    Number(f64),
    /// A boolean value.
    Boolean(bool),
    /// An uninterpreted string.
    String(String),
    /// A point in time.
    Date(DateTime<Utc>),
    /// The null literal, used by nature checks.
    Null,
}

impl ScalarValue {
    /// Renders the value as JSON, dates as RFC 3339 strings.
    pub fn to_json(&self) -> Value {
        match self {
            ScalarValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            ScalarValue::Boolean(b) => Value::Bool(*b),
            ScalarValue::String(s) => Value::String(s.clone()),
            ScalarValue::Date(d) => {
                Value::String(d.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            ScalarValue::Null => Value::Null,
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        ScalarValue::String(s.to_string())
    }
}

impl From<f64> for ScalarValue {
    fn from(n: f64) -> Self {
        ScalarValue::Number(n)
    }
}

impl From<bool> for ScalarValue {
    fn from(b: bool) -> Self {
        ScalarValue::Boolean(b)
    }
}

/// One node of the query tree.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryNode {
    /// A bare scalar, equality by convention.
    Scalar(ScalarValue),
    /// A list of scalars, as consumed by `$in`.
    List(Vec<ScalarValue>),
    /// A nested document of operator fragments.
    Document(QueryDocument),
}

/// An ordered map of field paths (or operator keys) to nodes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryDocument {
    entries: BTreeMap<String, QueryNode>,
}

impl QueryDocument {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a document holding a single entry.
    pub fn entry(key: impl Into<String>, node: QueryNode) -> Self {
        let mut doc = Self::new();
        doc.insert(key, node);
        doc
    }

    /// Inserts an entry, replacing any previous value under the key.
    pub fn insert(&mut self, key: impl Into<String>, node: QueryNode) {
        self.entries.insert(key.into(), node);
    }

    /// Merges all entries of `other` into `self`. Entries of `other`
    /// win on key collision (last-write semantics).
    pub fn merge_from(&mut self, other: QueryDocument) {
        for (key, node) in other.entries {
            self.entries.insert(key, node);
        }
    }

    /// Looks up an entry.
    pub fn get(&self, key: &str) -> Option<&QueryNode> {
        self.entries.get(key)
    }

    /// Returns `true` if the document has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryNode)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Renders the tree as JSON, mainly for logging.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (key, node) in &self.entries {
            map.insert(key.clone(), node_to_json(node));
        }
        Value::Object(map)
    }
}

fn node_to_json(node: &QueryNode) -> Value {
    match node {
        QueryNode::Scalar(s) => s.to_json(),
        QueryNode::List(items) => Value::Array(items.iter().map(ScalarValue::to_json).collect()),
        QueryNode::Document(doc) => doc.to_json(),
    }
}
