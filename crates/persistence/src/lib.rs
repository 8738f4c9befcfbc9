//! Tickethub persistence layer.
//!
//! This crate is the engine behind the Tickethub proxy API: it turns the
//! open-ended HTTP query syntax into document-store queries, maps between
//! the flexible external JSON representation of records and their stored
//! form, and scopes every operation to the calling tenant.
//!
//! # Architecture
//!
//! - [`query`] - coercion of string literals into typed values, the
//!   operator registry, and the filter/sort/projection compilers
//! - [`entity`] - the split between schema-declared known fields and the
//!   verbatim extension payload, in both mapping directions
//! - [`tenant`] - the tenant identifier required by every operation
//! - [`store`] - the abstract [`DocumentStore`](store::DocumentStore)
//!   trait and the in-memory backend
//! - [`repository`] - the orchestrator tying the pieces together for
//!   list, count, get, create, delete, and stream operations
//! - [`error`] - the error taxonomy shared by all of the above
//!
//! # Quick start
//!
//! ```
//! use std::sync::Arc;
//!
//! use serde_json::json;
//! use tickethub_model::schema;
//! use tickethub_persistence::repository::Repository;
//! use tickethub_persistence::store::MemoryStore;
//! use tickethub_persistence::tenant::TenantId;
//!
//! # async fn example() -> Result<(), tickethub_persistence::error::Error> {
//! let store = Arc::new(MemoryStore::new());
//! let tickets = Repository::new(store, &schema::TROUBLE_TICKET);
//! let tenant = TenantId::new("acme");
//!
//! let created = tickets
//!     .create(&tenant, json!({"name": "printer on fire"}).as_object().unwrap().clone())
//!     .await?;
//! assert_eq!(created["name"], json!("printer on fire"));
//! assert!(!created.contains_key("tenant")); // never exposed
//! # Ok(())
//! # }
//! ```
//!
//! The HTTP layer, blob storage, and message-bus notifications live
//! outside this crate; they interact with it through
//! [`repository::Hooks`] and the raw query-parameter list.

pub mod entity;
pub mod error;
pub mod query;
pub mod repository;
pub mod store;
pub mod tenant;

pub use error::{Error, Result};
pub use repository::{ListPage, Repository};
pub use tenant::TenantId;
