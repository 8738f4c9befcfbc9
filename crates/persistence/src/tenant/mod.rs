//! Tenant identity.
//!
//! Every repository operation requires a [`TenantId`]. There is no
//! escape hatch: callers without a usable tenant identity are rejected
//! before any query is built.

mod id;

pub use id::TenantId;
