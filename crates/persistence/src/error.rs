//! Error types for the persistence layer.
//!
//! Errors are organized into families mirroring where they arise:
//! [`QueryError`] for unparseable client input, [`TenantError`] for
//! authorization failures, [`ValidationError`] for rejected entities,
//! and [`StoreError`] for backend failures. The umbrella [`Error`]
//! aggregates them and classifies each into the surface the HTTP layer
//! cares about via [`Error::class`].
//!
//! Parsing-stage errors are always raised before any store call, so a
//! failed request never leaves partial side effects. Store-stage errors
//! are never retried here; retry policy belongs to the caller.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

use tickethub_model::Violation;

/// The primary error type for all repository operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The query string could not be compiled.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// The caller's tenant identity is unusable.
    #[error(transparent)]
    Tenant(#[from] TenantError),

    /// The entity failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No entity matches the tenant-scoped lookup.
    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    /// The document store failed.
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        // Store failures are server-class; log here so every path that
        // bubbles one up is covered, whatever the entry point.
        tracing::error!(error = %err, "document store failure");
        Error::Store(err)
    }
}

/// The surface an error belongs to, for callers that translate errors
/// into a transport-level response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The request was malformed; safe to echo details back.
    Client,
    /// The caller carries no usable tenant identity.
    Unauthorized,
    /// Nothing matched the scoped lookup.
    NotFound,
    /// An internal failure; only a generic message may leak out.
    Server,
}

impl Error {
    /// Classifies the error for the transport layer.
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::Query(_) | Error::Validation(_) => ErrorClass::Client,
            Error::Tenant(_) => ErrorClass::Unauthorized,
            Error::NotFound { .. } => ErrorClass::NotFound,
            Error::Store(_) => ErrorClass::Server,
        }
    }
}

/// Errors raised while compiling the query string.
#[derive(Error, Debug)]
pub enum QueryError {
    /// The bracket suffix named an operator alias nobody registered.
    #[error("unknown operator: {alias}")]
    UnknownOperator { alias: String },

    /// The `is`/`isNot` operator received an unrecognized nature token.
    #[error("unknown nature '{value}' for is operator")]
    UnknownNature { value: String },

    /// A reserved parameter carried an unparseable value.
    #[error("invalid {name} parameter: '{value}'")]
    InvalidParameter { name: &'static str, value: String },

    /// A reserved numeric parameter fell outside its allowed range.
    #[error("{name} out of range: {value} (allowed {min}..={max})")]
    OutOfRange {
        name: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}

/// Errors tied to the caller's tenant identity.
#[derive(Error, Debug)]
pub enum TenantError {
    /// The tenant identifier is absent or blank.
    #[error("missing or blank tenant identifier")]
    Missing,
}

/// Errors raised when an inbound entity is rejected.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// One or more known fields violated their declared constraints.
    #[error("entity validation failed: {}", summarize(violations))]
    Invalid { violations: Vec<Violation> },
}

impl ValidationError {
    /// The individual violations behind this error.
    pub fn violations(&self) -> &[Violation] {
        match self {
            ValidationError::Invalid { violations } => violations,
        }
    }
}

fn summarize(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors originating in the document store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The compiled query could not be evaluated.
    #[error("query evaluation failed: {message}")]
    Query { message: String },

    /// The backend itself failed.
    #[error("backend failure in {backend}: {message}")]
    Backend {
        backend: &'static str,
        message: String,
    },

    /// A stored document could not be decoded.
    #[error("serialization error: {message}")]
    Serialization { message: String },
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Result alias for repository operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Result alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
