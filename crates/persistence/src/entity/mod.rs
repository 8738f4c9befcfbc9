//! Extensible entities.
//!
//! Records accepted by the proxy have an open shape: a handful of
//! schema-declared known fields plus anything else the client chose to
//! send. [`EntityRecord`] keeps the two apart; [`mapper`] converts
//! between the flat external JSON representation, the typed record, and
//! the flat stored document, preserving undeclared fields verbatim.

pub mod mapper;
mod record;

pub use record::EntityRecord;
pub use record::{CREATION_DATE_FIELD, EXTENSION_FIELD, ID_FIELD, INTERNAL_FIELDS, LAST_UPDATE_FIELD, TENANT_FIELD};
