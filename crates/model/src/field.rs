//! Field descriptors.
//!
//! A [`FieldDescriptor`] declares one known field of an entity kind: its
//! name, the JSON shape it accepts, and the validation constraints the
//! proxy enforces on inbound writes.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// The JSON shape a known field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A JSON string.
    String,
    /// A JSON number.
    Number,
    /// A JSON boolean.
    Boolean,
    /// A string holding a date or date-time.
    Date,
    /// A JSON array.
    Array,
    /// A JSON object.
    Object,
}

impl FieldKind {
    /// Returns `true` if the value has the shape this kind accepts.
    ///
    /// `null` is never a shape mismatch; absence and nullability are
    /// handled by the required/ignored rules, not here.
    pub fn accepts(&self, value: &Value) -> bool {
        if value.is_null() {
            return true;
        }
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Number => value.is_number(),
            FieldKind::Boolean => value.is_boolean(),
            FieldKind::Date => value.as_str().is_some_and(is_date_like),
            FieldKind::Array => value.is_array(),
            FieldKind::Object => value.is_object(),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Date => "date",
            FieldKind::Array => "array",
            FieldKind::Object => "object",
        };
        write!(f, "{}", name)
    }
}

/// Returns `true` if the string parses as a calendar date or date-time.
pub fn is_date_like(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
}

/// One statically declared known field of an entity kind.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    /// The field name as it appears in the flat JSON representation.
    pub name: &'static str,
    /// The JSON shape the field accepts.
    pub kind: FieldKind,
    /// Whether the field must be present and non-blank on create.
    pub required: bool,
    /// Minimum length for string fields, if constrained.
    pub min_length: Option<usize>,
    /// Whether the field is system-managed and stripped from inbound
    /// writes.
    pub read_only: bool,
}

impl FieldDescriptor {
    /// Declares an optional, writable field of the given kind.
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            min_length: None,
            read_only: false,
        }
    }

    /// Marks the field as required on create.
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Constrains string values to a minimum length.
    pub const fn min_length(mut self, len: usize) -> Self {
        self.min_length = Some(len);
        self
    }

    /// Marks the field as system-managed.
    pub const fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_accepts_matching_shapes() {
        assert!(FieldKind::String.accepts(&json!("hello")));
        assert!(FieldKind::Number.accepts(&json!(12.5)));
        assert!(FieldKind::Boolean.accepts(&json!(true)));
        assert!(FieldKind::Array.accepts(&json!([1, 2])));
        assert!(FieldKind::Object.accepts(&json!({"a": 1})));
    }

    #[test]
    fn test_kind_rejects_mismatched_shapes() {
        assert!(!FieldKind::String.accepts(&json!(1)));
        assert!(!FieldKind::Number.accepts(&json!("1")));
        assert!(!FieldKind::Array.accepts(&json!({"a": 1})));
    }

    #[test]
    fn test_null_is_never_a_mismatch() {
        assert!(FieldKind::String.accepts(&Value::Null));
        assert!(FieldKind::Date.accepts(&Value::Null));
    }

    #[test]
    fn test_date_kind() {
        assert!(FieldKind::Date.accepts(&json!("2024-05-01")));
        assert!(FieldKind::Date.accepts(&json!("2024-05-01T10:30:00")));
        assert!(FieldKind::Date.accepts(&json!("2024-05-01T10:30:00+02:00")));
        assert!(!FieldKind::Date.accepts(&json!("tomorrow")));
    }

    #[test]
    fn test_descriptor_builder() {
        const NAME: FieldDescriptor =
            FieldDescriptor::new("name", FieldKind::String).required().min_length(5);
        assert!(NAME.required);
        assert_eq!(NAME.min_length, Some(5));
        assert!(!NAME.read_only);
    }
}
