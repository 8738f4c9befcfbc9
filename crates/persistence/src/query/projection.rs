//! Field projection of output maps.
//!
//! Reduces a flat output record to the fields a caller asked for via the
//! `fields` parameter. An empty request means "everything".

use std::collections::BTreeSet;

use serde_json::{Map, Value};

/// Reduces the map to the requested field set.
///
/// With an empty set the map passes through unchanged. Otherwise the
/// result is exactly the intersection of the map's keys with the set;
/// requested fields the map lacks are silently omitted, never emitted
/// as null.
pub fn project(map: Map<String, Value>, fields: &BTreeSet<String>) -> Map<String, Value> {
    if fields.is_empty() {
        return map;
    }

    map.into_iter()
        .filter(|(key, _)| fields.contains(key))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> Map<String, Value> {
        json!({"id": "1", "name": "t1", "priority": "High"})
            .as_object()
            .unwrap()
            .clone()
    }

    fn fields(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_empty_set_passes_through() {
        let projected = project(record(), &BTreeSet::new());
        assert_eq!(projected.len(), 3);
    }

    #[test]
    fn test_reduces_to_requested_fields() {
        let projected = project(record(), &fields(&["name"]));
        assert_eq!(projected.len(), 1);
        assert_eq!(projected["name"], json!("t1"));
    }

    #[test]
    fn test_missing_requested_fields_omitted() {
        let projected = project(record(), &fields(&["name", "nothere"]));
        assert_eq!(projected.len(), 1);
        assert!(!projected.contains_key("nothere"));
    }
}
