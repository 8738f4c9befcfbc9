//! Validation of known fields against their descriptors.
//!
//! Validation runs on the known-field map produced by the entity mapper,
//! before anything reaches the store. Extension fields are never
//! validated; they are carried verbatim by design.

use std::fmt;

use serde_json::{Map, Value};

use crate::schema::EntitySchema;

/// One validation failure on a known field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// The offending field name.
    pub field: String,
    /// A human-readable description of the failure.
    pub message: String,
}

impl Violation {
    /// Creates a violation for the given field.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validates a known-field map against the schema's descriptors.
///
/// Returns every violation found; an empty vector means the entity is
/// acceptable. Checks, per descriptor:
///
/// - required fields must be present and, for strings, non-blank;
/// - string fields with a minimum length must meet it;
/// - present values must have the declared JSON shape.
///
/// Read-only fields are skipped: the mapper strips them from inbound
/// writes before validation runs.
pub fn validate(schema: &EntitySchema, known: &Map<String, Value>) -> Vec<Violation> {
    let mut violations = Vec::new();

    for descriptor in schema.fields {
        if descriptor.read_only {
            continue;
        }

        let value = known.get(descriptor.name);

        if descriptor.required && !has_content(value) {
            violations.push(Violation::new(descriptor.name, "must not be blank"));
            continue;
        }

        let Some(value) = value else { continue };

        if !descriptor.kind.accepts(value) {
            violations.push(Violation::new(
                descriptor.name,
                format!("expected a {} value", descriptor.kind),
            ));
            continue;
        }

        if let (Some(min), Some(text)) = (descriptor.min_length, value.as_str()) {
            if text.chars().count() < min {
                violations.push(Violation::new(
                    descriptor.name,
                    format!("must be at least {} characters long", min),
                ));
            }
        }
    }

    violations
}

fn has_content(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{NOTE, TROUBLE_TICKET};
    use serde_json::json;

    fn known(entries: &[(&str, Value)]) -> Map<String, Value> {
        entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_valid_ticket() {
        let map = known(&[("name", json!("t1")), ("priority", json!("High"))]);
        assert!(validate(&TROUBLE_TICKET, &map).is_empty());
    }

    #[test]
    fn test_missing_required_name() {
        let map = known(&[("priority", json!("High"))]);
        let violations = validate(&TROUBLE_TICKET, &map);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "name");
        assert!(violations[0].message.contains("blank"));
    }

    #[test]
    fn test_blank_required_name() {
        let map = known(&[("name", json!("   "))]);
        let violations = validate(&TROUBLE_TICKET, &map);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "name");
    }

    #[test]
    fn test_shape_mismatch() {
        let map = known(&[("name", json!("t1")), ("statusChangeDate", json!("soon"))]);
        let violations = validate(&TROUBLE_TICKET, &map);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "statusChangeDate");
        assert!(violations[0].message.contains("date"));
    }

    #[test]
    fn test_note_min_length() {
        let map = known(&[("text", json!("hey"))]);
        let violations = validate(&NOTE, &map);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "text");
        assert!(violations[0].message.contains("5"));

        let map = known(&[("text", json!("hey there"))]);
        assert!(validate(&NOTE, &map).is_empty());
    }

    #[test]
    fn test_read_only_fields_are_skipped() {
        // The mapper strips these on input; a record assembled from the
        // store may carry them and they must not be re-validated.
        let map = known(&[("name", json!("t1")), ("closed", json!("not-a-bool"))]);
        assert!(validate(&TROUBLE_TICKET, &map).is_empty());
    }
}
