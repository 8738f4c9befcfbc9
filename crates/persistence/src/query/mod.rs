//! The query engine.
//!
//! Turns the raw, string-typed query-parameter list of a request into a
//! structured, deterministic query tree plus a sort specification and a
//! field projection, ready for a document store to execute:
//!
//! - [`value`] - typed scalar values and the abstract query tree
//! - [`coerce`] - ordered heuristics from string literals to typed values
//! - [`operator`] - the operator registry (`==`, `in`, `is`, ...)
//! - [`filter`] - the `<field>[<operator>]` compiler
//! - [`sort`] - the `sort` parameter compiler
//! - [`params`] - reserved parameters (`limit`, `offset`, `sort`,
//!   `fields`, `filter`)
//! - [`projection`] - reduction of output maps to requested fields

pub mod coerce;
pub mod filter;
pub mod operator;
pub mod params;
pub mod projection;
pub mod sort;
pub mod value;

pub use coerce::coerce;
pub use filter::compile_filter;
pub use operator::Operator;
pub use params::{PageRequest, QueryParams};
pub use projection::project;
pub use sort::{SortDirection, SortKey, SortSpec};
pub use value::{QueryDocument, QueryNode, ScalarValue};
