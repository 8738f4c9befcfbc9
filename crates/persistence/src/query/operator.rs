//! The operator registry.
//!
//! Each operator takes the raw string value of one query parameter and
//! builds a fragment document in the store's filter language. Aliases
//! are resolved case-insensitively; an alias nobody registered is a
//! client error that names the offending alias.

use crate::error::QueryError;

use super::coerce::coerce;
use super::value::{QueryDocument, QueryNode, ScalarValue};

/// A filter operator resolved from its textual alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Field equals the coerced value.
    Equal,
    /// Field differs from the coerced value.
    NotEqual,
    /// Strict ordering above the coerced value.
    GreaterThan,
    /// Ordering at or above the coerced value.
    GreaterThanOrEqual,
    /// Strict ordering below the coerced value.
    LessThan,
    /// Ordering at or below the coerced value.
    LessThanOrEqual,
    /// Case-insensitive regular-expression match.
    Match,
    /// Negated case-insensitive regular-expression match.
    NotMatch,
    /// Nature check (`null`, `exists`, `empty`, type names, ...).
    Is,
    /// Negated nature check.
    IsNot,
    /// Field value among the comma-separated, coerced candidates.
    In,
    /// Field value not among the candidates.
    NotIn,
}

impl Operator {
    /// Resolves an operator from its alias, trimmed and lowercased.
    ///
    /// # Errors
    ///
    /// [`QueryError::UnknownOperator`] naming the alias when it matches
    /// nothing in the registry.
    pub fn resolve(alias: &str) -> Result<Self, QueryError> {
        let normalized = alias.trim().to_lowercase();
        match normalized.as_str() {
            "eq" | "==" => Ok(Operator::Equal),
            "ne" | "!=" | "<>" => Ok(Operator::NotEqual),
            "gt" | ">" => Ok(Operator::GreaterThan),
            "gte" | ">=" => Ok(Operator::GreaterThanOrEqual),
            "lt" | "<" => Ok(Operator::LessThan),
            "lte" | "<=" => Ok(Operator::LessThanOrEqual),
            "match" | "regex" | "=~" => Ok(Operator::Match),
            "notmatch" | "notregex" | "!~" => Ok(Operator::NotMatch),
            "is" | "=" => Ok(Operator::Is),
            "isnot" | "isnt" | "not" | "nis" | "!" => Ok(Operator::IsNot),
            "in" => Ok(Operator::In),
            "nin" | "notin" => Ok(Operator::NotIn),
            _ => Err(QueryError::UnknownOperator {
                alias: alias.trim().to_string(),
            }),
        }
    }

    /// Builds the filter fragment for this operator and raw value.
    pub fn fragment(&self, value: &str) -> Result<QueryDocument, QueryError> {
        let fragment = match self {
            Operator::Equal => comparison("$eq", value),
            Operator::NotEqual => comparison("$ne", value),
            Operator::GreaterThan => comparison("$gt", value),
            Operator::GreaterThanOrEqual => comparison("$gte", value),
            Operator::LessThan => comparison("$lt", value),
            Operator::LessThanOrEqual => comparison("$lte", value),
            Operator::Match => regex(value),
            Operator::NotMatch => negate(regex(value)),
            Operator::In => members(value),
            Operator::NotIn => negate(members(value)),
            Operator::Is => nature(value)?,
            Operator::IsNot => negate(nature(value)?),
        };
        Ok(fragment)
    }
}

fn comparison(key: &str, value: &str) -> QueryDocument {
    QueryDocument::entry(key, QueryNode::Scalar(coerce(value)))
}

fn regex(pattern: &str) -> QueryDocument {
    let mut doc = QueryDocument::entry("$regex", QueryNode::Scalar(ScalarValue::from(pattern)));
    doc.insert("$options", QueryNode::Scalar(ScalarValue::from("i")));
    doc
}

fn members(value: &str) -> QueryDocument {
    let candidates = value.split(',').map(str::trim).map(coerce).collect();
    QueryDocument::entry("$in", QueryNode::List(candidates))
}

fn negate(inner: QueryDocument) -> QueryDocument {
    QueryDocument::entry("$not", QueryNode::Document(inner))
}

fn nature(value: &str) -> Result<QueryDocument, QueryError> {
    let doc = match value.to_lowercase().as_str() {
        "null" => QueryDocument::entry("$eq", QueryNode::Scalar(ScalarValue::Null)),
        "notnull" | "nnull" => QueryDocument::entry("$ne", QueryNode::Scalar(ScalarValue::Null)),
        "exists" => QueryDocument::entry("$exists", QueryNode::Scalar(ScalarValue::from(true))),
        "notexists" | "nexists" => {
            QueryDocument::entry("$exists", QueryNode::Scalar(ScalarValue::from(false)))
        }
        "empty" => QueryDocument::entry("$size", QueryNode::Scalar(ScalarValue::from(0.0))),
        "notempty" | "nempty" => negate(QueryDocument::entry(
            "$size",
            QueryNode::Scalar(ScalarValue::from(0.0)),
        )),
        "int" | "integer" => type_check("int"),
        "array" => type_check("array"),
        "object" => type_check("object"),
        "string" => type_check("string"),
        "bool" | "boolean" => type_check("bool"),
        "date" => type_check("date"),
        _ => {
            return Err(QueryError::UnknownNature {
                value: value.to_string(),
            });
        }
    };
    Ok(doc)
}

fn type_check(name: &str) -> QueryDocument {
    QueryDocument::entry("$type", QueryNode::Scalar(ScalarValue::from(name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_aliases() {
        assert_eq!(Operator::resolve("==").unwrap(), Operator::Equal);
        assert_eq!(Operator::resolve("eq").unwrap(), Operator::Equal);
        assert_eq!(Operator::resolve("<>").unwrap(), Operator::NotEqual);
        assert_eq!(Operator::resolve(">=").unwrap(), Operator::GreaterThanOrEqual);
        assert_eq!(Operator::resolve("=~").unwrap(), Operator::Match);
        assert_eq!(Operator::resolve("!~").unwrap(), Operator::NotMatch);
        assert_eq!(Operator::resolve("nin").unwrap(), Operator::NotIn);
        assert_eq!(Operator::resolve("!").unwrap(), Operator::IsNot);
    }

    #[test]
    fn test_resolve_trims_and_lowercases() {
        assert_eq!(Operator::resolve(" EQ ").unwrap(), Operator::Equal);
        assert_eq!(Operator::resolve("NotIn").unwrap(), Operator::NotIn);
    }

    #[test]
    fn test_resolve_unknown_alias() {
        let err = Operator::resolve("xx").unwrap_err();
        assert!(matches!(err, QueryError::UnknownOperator { ref alias } if alias == "xx"));
    }

    #[test]
    fn test_equal_coerces_value() {
        let frag = Operator::Equal.fragment("42").unwrap();
        assert_eq!(
            frag.get("$eq"),
            Some(&QueryNode::Scalar(ScalarValue::Number(42.0)))
        );
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let frag = Operator::Match.fragment("^T").unwrap();
        assert_eq!(
            frag.get("$regex"),
            Some(&QueryNode::Scalar(ScalarValue::String("^T".into())))
        );
        assert_eq!(
            frag.get("$options"),
            Some(&QueryNode::Scalar(ScalarValue::String("i".into())))
        );
    }

    #[test]
    fn test_not_match_wraps_in_not() {
        let frag = Operator::NotMatch.fragment("^T").unwrap();
        let Some(QueryNode::Document(inner)) = frag.get("$not") else {
            panic!("expected $not document");
        };
        assert!(inner.get("$regex").is_some());
    }

    #[test]
    fn test_in_coerces_each_candidate() {
        let frag = Operator::In.fragment("1, true , open").unwrap();
        let Some(QueryNode::List(items)) = frag.get("$in") else {
            panic!("expected $in list");
        };
        assert_eq!(
            items,
            &vec![
                ScalarValue::Number(1.0),
                ScalarValue::Boolean(true),
                ScalarValue::String("open".into()),
            ]
        );
    }

    #[test]
    fn test_not_in_wraps_in_not() {
        let frag = Operator::NotIn.fragment("1,2").unwrap();
        let Some(QueryNode::Document(inner)) = frag.get("$not") else {
            panic!("expected $not document");
        };
        assert!(inner.get("$in").is_some());
    }

    #[test]
    fn test_nature_fragments() {
        let null = Operator::Is.fragment("null").unwrap();
        assert_eq!(null.get("$eq"), Some(&QueryNode::Scalar(ScalarValue::Null)));

        let exists = Operator::Is.fragment("exists").unwrap();
        assert_eq!(
            exists.get("$exists"),
            Some(&QueryNode::Scalar(ScalarValue::Boolean(true)))
        );

        let empty = Operator::Is.fragment("empty").unwrap();
        assert_eq!(
            empty.get("$size"),
            Some(&QueryNode::Scalar(ScalarValue::Number(0.0)))
        );

        let int = Operator::Is.fragment("INTEGER").unwrap();
        assert_eq!(
            int.get("$type"),
            Some(&QueryNode::Scalar(ScalarValue::String("int".into())))
        );
    }

    #[test]
    fn test_is_not_negates_nature() {
        let frag = Operator::IsNot.fragment("null").unwrap();
        let Some(QueryNode::Document(inner)) = frag.get("$not") else {
            panic!("expected $not document");
        };
        assert_eq!(inner.get("$eq"), Some(&QueryNode::Scalar(ScalarValue::Null)));
    }

    #[test]
    fn test_unknown_nature_is_an_error() {
        let err = Operator::Is.fragment("wobbly").unwrap_err();
        assert!(matches!(err, QueryError::UnknownNature { ref value } if value == "wobbly"));
    }
}
