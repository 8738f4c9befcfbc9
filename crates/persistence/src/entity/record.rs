//! The typed entity record.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::tenant::TenantId;

/// Key carrying the owning tenant in the stored document. Never exposed
/// to clients.
pub const TENANT_FIELD: &str = "tenant";

/// Key naming the extension container in the typed representation. The
/// stored document is flat; this key never appears in it, and inbound
/// maps may not claim it.
pub const EXTENSION_FIELD: &str = "extension";

/// Internal bookkeeping keys, checked before any known-field lookup so
/// a schema can never expose them even if it declares a field of the
/// same name.
pub const INTERNAL_FIELDS: &[&str] = &[EXTENSION_FIELD, TENANT_FIELD];

/// Envelope key for the record identifier.
pub const ID_FIELD: &str = "id";

/// Envelope key for the creation timestamp.
pub const CREATION_DATE_FIELD: &str = "creationDate";

/// Envelope key for the last-update timestamp.
pub const LAST_UPDATE_FIELD: &str = "lastUpdate";

/// A record split into its envelope, known fields, and extension
/// payload.
///
/// The envelope (`id`, timestamps, tenant) is system-owned. `known`
/// holds the schema-declared attributes that were present and non-null;
/// `extension` holds every other inbound field verbatim. The two key
/// sets never overlap.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    /// Unique identifier, generated at creation, immutable afterward.
    pub id: String,
    /// Owning tenant; set exactly once, at persistence time.
    pub tenant: Option<TenantId>,
    /// Set at creation, immutable afterward.
    pub creation_date: DateTime<Utc>,
    /// Set by the system on mutation.
    pub last_update: Option<DateTime<Utc>>,
    /// Schema-declared fields present on this record.
    pub known: Map<String, Value>,
    /// Everything else, preserved verbatim. Possibly empty, never
    /// semantically absent.
    pub extension: Map<String, Value>,
}

impl EntityRecord {
    /// Creates an empty record with a fresh identifier and creation
    /// timestamp.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tenant: None,
            creation_date: Utc::now(),
            last_update: None,
            known: Map::new(),
            extension: Map::new(),
        }
    }
}

impl Default for EntityRecord {
    fn default() -> Self {
        Self::new()
    }
}
