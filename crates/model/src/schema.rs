//! The entity-kind registry.
//!
//! Each record kind the proxy serves is declared here as a static
//! [`EntitySchema`]: the collection it lives in, the descriptor table of
//! its known fields, and the inbound keys that are always stripped
//! because the system owns them (identifiers, timestamps, computed
//! state).

use crate::field::{FieldDescriptor, FieldKind};

/// The statically declared schema of one entity kind.
#[derive(Debug, Clone, Copy)]
pub struct EntitySchema {
    /// The kind name, also used as the store collection name.
    pub kind: &'static str,
    /// Descriptors for the known fields of this kind.
    pub fields: &'static [FieldDescriptor],
    /// Inbound keys removed before mapping; clients cannot set these.
    pub input_ignored: &'static [&'static str],
}

impl EntitySchema {
    /// Looks up the descriptor for a known field.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns `true` if the name is a declared known field.
    pub fn is_known(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Returns `true` if the inbound key is stripped before mapping.
    pub fn is_input_ignored(&self, name: &str) -> bool {
        self.input_ignored.contains(&name)
    }
}

/// Trouble tickets: the primary record kind of the proxy.
pub static TROUBLE_TICKET: EntitySchema = EntitySchema {
    kind: "troubleticket",
    fields: &[
        FieldDescriptor::new("resolutionDate", FieldKind::Date).read_only(),
        FieldDescriptor::new("expectedResolutionDate", FieldKind::Date),
        FieldDescriptor::new("name", FieldKind::String).required(),
        FieldDescriptor::new("description", FieldKind::String),
        FieldDescriptor::new("priority", FieldKind::String),
        FieldDescriptor::new("severity", FieldKind::String),
        FieldDescriptor::new("externalId", FieldKind::String),
        FieldDescriptor::new("status", FieldKind::String),
        FieldDescriptor::new("statusChangeDate", FieldKind::Date),
        FieldDescriptor::new("statusChangeReason", FieldKind::String),
        FieldDescriptor::new("closed", FieldKind::Boolean).read_only(),
        FieldDescriptor::new("statusChange", FieldKind::Array).read_only(),
    ],
    input_ignored: &[
        "id",
        "creationDate",
        "lastUpdate",
        "resolutionDate",
        "closed",
        "statusChange",
    ],
};

/// Free-text notes attached to a ticket.
pub static NOTE: EntitySchema = EntitySchema {
    kind: "note",
    fields: &[
        FieldDescriptor::new("author", FieldKind::String),
        FieldDescriptor::new("text", FieldKind::String).required().min_length(5),
    ],
    input_ignored: &["id", "creationDate", "lastUpdate"],
};

/// File attachments; the blob itself lives in external storage, only the
/// metadata record is kept here.
pub static ATTACHMENT: EntitySchema = EntitySchema {
    kind: "attachment",
    fields: &[
        FieldDescriptor::new("size", FieldKind::Number),
        FieldDescriptor::new("name", FieldKind::String),
        FieldDescriptor::new("description", FieldKind::String),
        FieldDescriptor::new("mimeType", FieldKind::String),
        FieldDescriptor::new("status", FieldKind::String),
        FieldDescriptor::new("statusChangeDate", FieldKind::Date),
        FieldDescriptor::new("statusChangeReason", FieldKind::String),
        FieldDescriptor::new("statusChange", FieldKind::Array).read_only(),
    ],
    input_ignored: &["id", "creationDate", "lastUpdate"],
};

/// Looks up a schema by kind name.
pub fn by_kind(kind: &str) -> Option<&'static EntitySchema> {
    match kind {
        "troubleticket" => Some(&TROUBLE_TICKET),
        "note" => Some(&NOTE),
        "attachment" => Some(&ATTACHMENT),
        _ => None,
    }
}
