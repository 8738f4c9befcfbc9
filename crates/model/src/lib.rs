//! Entity schemas for the Tickethub proxy.
//!
//! Every record kind handled by the proxy (trouble tickets, notes,
//! attachments) is described by a statically declared [`EntitySchema`]:
//! an explicit list of [`FieldDescriptor`]s for the fields the system
//! knows about, plus the set of inbound keys that clients are not
//! allowed to supply. Anything a client sends that is not declared here
//! is carried verbatim in the record's extension payload by the
//! persistence layer.
//!
//! The schemas are data, not types: adding a record kind means adding a
//! descriptor table, not writing a new struct or deriving anything.
//!
//! # Example
//!
//! ```
//! use tickethub_model::{schema, validate};
//! use serde_json::{Map, json};
//!
//! let schema = schema::by_kind("troubleticket").unwrap();
//! assert!(schema.field("priority").is_some());
//!
//! let mut known = Map::new();
//! known.insert("name".into(), json!("printer on fire"));
//! assert!(validate(schema, &known).is_empty());
//! ```

pub mod field;
pub mod schema;
pub mod validation;

pub use field::{FieldDescriptor, FieldKind};
pub use schema::EntitySchema;
pub use validation::{Violation, validate};
