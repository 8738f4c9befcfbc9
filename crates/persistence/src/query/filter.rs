//! The filter compiler.
//!
//! Compiles the ordered query-parameter list of a request into one
//! [`QueryDocument`]. A key of the form `<field>[<operator>]` selects an
//! operator explicitly; a bare key means equality. Reserved control
//! parameters never become filters, with or without an operator suffix.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::QueryError;

use super::operator::Operator;
use super::value::{QueryDocument, QueryNode};

/// Control parameters excluded from filtering.
pub const RESERVED: &[&str] = &["limit", "offset", "sort", "fields", "filter"];

static KEY_WITH_OPERATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^\[]+)\[([^\]]+)\]$").unwrap());

/// Compiles query-parameter pairs into a filter tree.
///
/// Clauses on the same field are grouped: a single clause becomes the
/// field's fragment directly; multiple clauses are merged into one
/// sub-document keyed by each fragment's operator keys. When two
/// fragments of one field produce the identical operator key, the later
/// one silently wins; callers wanting both bounds of a range must use
/// distinct operators (`gte`/`lte`).
///
/// # Errors
///
/// [`QueryError::UnknownOperator`] or [`QueryError::UnknownNature`] on
/// the first unresolvable clause; nothing is partially applied.
pub fn compile_filter(pairs: &[(String, String)]) -> Result<QueryDocument, QueryError> {
    let mut clauses: BTreeMap<&str, Vec<QueryDocument>> = BTreeMap::new();

    for (key, value) in pairs {
        let (field, operator) = match KEY_WITH_OPERATOR.captures(key) {
            Some(captures) => {
                let field = captures.get(1).map_or("", |m| m.as_str());
                if RESERVED.contains(&field) {
                    continue;
                }
                (field, Operator::resolve(&captures[2])?)
            }
            None => {
                if RESERVED.contains(&key.as_str()) {
                    continue;
                }
                (key.as_str(), Operator::Equal)
            }
        };

        clauses
            .entry(field)
            .or_default()
            .push(operator.fragment(value)?);
    }

    let mut filter = QueryDocument::new();
    for (field, fragments) in clauses {
        let mut merged = QueryDocument::new();
        for fragment in fragments {
            merged.merge_from(fragment);
        }
        filter.insert(field, QueryNode::Document(merged));
    }

    debug!(filter = %filter.to_json(), "compiled query filter");

    Ok(filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::value::ScalarValue;

    fn pairs(input: &[(&str, &str)]) -> Vec<(String, String)> {
        input
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn field_doc<'a>(filter: &'a QueryDocument, field: &str) -> &'a QueryDocument {
        match filter.get(field) {
            Some(QueryNode::Document(doc)) => doc,
            other => panic!("expected document for '{}', got {:?}", field, other),
        }
    }

    #[test]
    fn test_bare_key_is_equality() {
        let filter = compile_filter(&pairs(&[("status", "open")])).unwrap();
        let doc = field_doc(&filter, "status");
        assert_eq!(
            doc.get("$eq"),
            Some(&QueryNode::Scalar(ScalarValue::String("open".into())))
        );
    }

    #[test]
    fn test_bare_key_equivalent_to_explicit_operator() {
        let bare = compile_filter(&pairs(&[("priority", "1")])).unwrap();
        let explicit = compile_filter(&pairs(&[("priority[==]", "1")])).unwrap();
        assert_eq!(bare, explicit);
    }

    #[test]
    fn test_operator_suffix() {
        let filter = compile_filter(&pairs(&[("name[=~]", "^T")])).unwrap();
        let doc = field_doc(&filter, "name");
        assert!(doc.get("$regex").is_some());
    }

    #[test]
    fn test_reserved_keys_excluded() {
        let filter = compile_filter(&pairs(&[
            ("limit", "10"),
            ("offset", "5"),
            ("sort", "name"),
            ("fields", "name"),
            ("filter", "x"),
            ("status", "open"),
        ]))
        .unwrap();
        assert_eq!(filter.len(), 1);
        assert!(filter.get("status").is_some());
    }

    #[test]
    fn test_reserved_keys_excluded_even_with_operator() {
        let filter = compile_filter(&pairs(&[("limit[>]", "10"), ("sort[in]", "a,b")])).unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn test_multiple_clauses_merge_into_one_document() {
        let filter = compile_filter(&pairs(&[
            ("priority[>=]", "1"),
            ("priority[<=]", "5"),
        ]))
        .unwrap();
        let doc = field_doc(&filter, "priority");
        assert_eq!(
            doc.get("$gte"),
            Some(&QueryNode::Scalar(ScalarValue::Number(1.0)))
        );
        assert_eq!(
            doc.get("$lte"),
            Some(&QueryNode::Scalar(ScalarValue::Number(5.0)))
        );
    }

    #[test]
    fn test_same_operator_key_last_write_wins() {
        let filter = compile_filter(&pairs(&[("priority[>]", "1"), ("priority[>]", "5")])).unwrap();
        let doc = field_doc(&filter, "priority");
        assert_eq!(doc.len(), 1);
        assert_eq!(
            doc.get("$gt"),
            Some(&QueryNode::Scalar(ScalarValue::Number(5.0)))
        );
    }

    #[test]
    fn test_unknown_operator_fails_naming_alias() {
        let err = compile_filter(&pairs(&[("name[xx]", "1")])).unwrap_err();
        assert!(matches!(err, QueryError::UnknownOperator { ref alias } if alias == "xx"));
    }

    #[test]
    fn test_distinct_fields_compile_independently() {
        let filter =
            compile_filter(&pairs(&[("status", "open"), ("severity[in]", "high,critical")]))
                .unwrap();
        assert_eq!(filter.len(), 2);
        assert!(field_doc(&filter, "severity").get("$in").is_some());
    }

    #[test]
    fn test_dotted_paths_are_fields() {
        let filter = compile_filter(&pairs(&[("foo.bar", "1")])).unwrap();
        let doc = field_doc(&filter, "foo.bar");
        assert_eq!(
            doc.get("$eq"),
            Some(&QueryNode::Scalar(ScalarValue::Number(1.0)))
        );
    }

    #[test]
    fn test_deterministic_output() {
        let input = pairs(&[("b", "2"), ("a", "1"), ("b[<]", "9")]);
        assert_eq!(
            compile_filter(&input).unwrap(),
            compile_filter(&input).unwrap()
        );
    }
}
