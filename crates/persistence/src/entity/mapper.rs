//! Mapping between flat JSON, typed records, and stored documents.
//!
//! Three shapes of one record:
//!
//! - **flat** - what clients send and receive: one JSON object, known
//!   and custom fields side by side, no bookkeeping keys;
//! - **typed** - [`EntityRecord`]: envelope + known map + extension bag;
//! - **stored** - the document persisted to the store: flat again, with
//!   the extension merged at top level (so custom fields are directly
//!   filterable, dot-paths included) plus the tenant marker.
//!
//! For any record, flattening after re-classifying yields the same
//! visible key/value set, timestamps the system regenerates aside.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use tickethub_model::EntitySchema;

use crate::error::StoreError;
use crate::tenant::TenantId;

use super::record::{
    CREATION_DATE_FIELD, EntityRecord, ID_FIELD, INTERNAL_FIELDS, LAST_UPDATE_FIELD, TENANT_FIELD,
};

/// Maps an inbound flat object to a typed record.
///
/// The schema's input-ignored keys are dropped first; clients cannot
/// set the envelope or computed state. Each remaining key is then
/// classified, in order: internal bookkeeping names always land in the
/// extension bag, even when the schema declares a field of the same
/// name; known names with non-null values become known attributes
/// (null-valued known keys are dropped); everything else goes to the
/// extension bag verbatim.
pub fn from_flat(schema: &EntitySchema, mut flat: Map<String, Value>) -> EntityRecord {
    for ignored in schema.input_ignored {
        flat.remove(*ignored);
    }

    let mut record = EntityRecord::new();
    for (key, value) in flat {
        if INTERNAL_FIELDS.contains(&key.as_str()) {
            record.extension.insert(key, value);
        } else if schema.is_known(&key) {
            if !value.is_null() {
                record.known.insert(key, value);
            }
        } else {
            record.extension.insert(key, value);
        }
    }

    record
}

/// Serializes a record into its stored document.
///
/// The document is flat: envelope, known fields, extension fields at
/// top level, plus the tenant marker when the record is owned.
pub fn to_document(record: &EntityRecord) -> Value {
    let mut doc = Map::new();
    doc.insert(ID_FIELD.to_string(), Value::String(record.id.clone()));
    doc.insert(
        CREATION_DATE_FIELD.to_string(),
        Value::String(render_date(&record.creation_date)),
    );
    if let Some(last_update) = &record.last_update {
        doc.insert(
            LAST_UPDATE_FIELD.to_string(),
            Value::String(render_date(last_update)),
        );
    }
    for (key, value) in &record.known {
        doc.insert(key.clone(), value.clone());
    }
    for (key, value) in &record.extension {
        doc.insert(key.clone(), value.clone());
    }
    if let Some(tenant) = &record.tenant {
        doc.insert(
            TENANT_FIELD.to_string(),
            Value::String(tenant.as_str().to_string()),
        );
    }
    Value::Object(doc)
}

/// Rebuilds a typed record from a stored document.
///
/// # Errors
///
/// [`StoreError::Serialization`] when the document is not an object or
/// its envelope is missing or malformed; only this layer ever writes
/// documents, so that indicates store corruption, not client input.
pub fn from_document(schema: &EntitySchema, document: Value) -> Result<EntityRecord, StoreError> {
    let Value::Object(doc) = document else {
        return Err(malformed("stored document is not an object"));
    };

    let mut record = EntityRecord::new();
    let mut id = None;
    let mut creation_date = None;

    for (key, value) in doc {
        if key == ID_FIELD {
            id = value.as_str().map(ToString::to_string);
        } else if key == CREATION_DATE_FIELD {
            creation_date = Some(parse_date(&value, CREATION_DATE_FIELD)?);
        } else if key == LAST_UPDATE_FIELD {
            record.last_update = Some(parse_date(&value, LAST_UPDATE_FIELD)?);
        } else if key == TENANT_FIELD {
            record.tenant = value.as_str().map(TenantId::new);
        } else if schema.is_known(&key) {
            record.known.insert(key, value);
        } else {
            record.extension.insert(key, value);
        }
    }

    record.id = id.ok_or_else(|| malformed("stored document has no id"))?;
    record.creation_date =
        creation_date.ok_or_else(|| malformed("stored document has no creation date"))?;

    Ok(record)
}

/// Flattens a record into its visible external representation.
///
/// Envelope and known fields first, extension keys merged on top,
/// internal bookkeeping keys stripped.
pub fn to_flat(record: &EntityRecord) -> Map<String, Value> {
    let mut flat = Map::new();
    flat.insert(ID_FIELD.to_string(), Value::String(record.id.clone()));
    flat.insert(
        CREATION_DATE_FIELD.to_string(),
        Value::String(render_date(&record.creation_date)),
    );
    if let Some(last_update) = &record.last_update {
        flat.insert(
            LAST_UPDATE_FIELD.to_string(),
            Value::String(render_date(last_update)),
        );
    }
    for (key, value) in &record.known {
        flat.insert(key.clone(), value.clone());
    }
    for (key, value) in &record.extension {
        flat.insert(key.clone(), value.clone());
    }
    for internal in INTERNAL_FIELDS {
        flat.remove(*internal);
    }
    flat
}

fn render_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_date(value: &Value, field: &str) -> Result<DateTime<Utc>, StoreError> {
    value
        .as_str()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|parsed| parsed.with_timezone(&Utc))
        .ok_or_else(|| malformed(format!("unparseable {} in stored document", field)))
}

fn malformed(message: impl Into<String>) -> StoreError {
    StoreError::Serialization {
        message: message.into(),
    }
}
