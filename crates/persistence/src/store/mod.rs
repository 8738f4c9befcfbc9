//! The document store abstraction.
//!
//! The repository talks to storage exclusively through
//! [`DocumentStore`], which accepts compiled query trees and sort
//! specifications and returns raw JSON documents. Nothing in the trait
//! commits to a wire protocol; [`MemoryStore`] is the in-tree backend
//! and the reference for the query-tree semantics.

mod memory;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;

use crate::error::StoreResult;
use crate::query::{PageRequest, QueryDocument, SortSpec};

pub use memory::MemoryStore;

/// Abstract document storage consumed by the repository.
///
/// One call here is one query against the backend. Implementations own
/// their concurrency control; the repository never retries.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// A human-readable backend name, for logs and error messages.
    fn backend_name(&self) -> &'static str;

    /// Counts the documents matching the filter.
    async fn count(&self, collection: &str, filter: &QueryDocument) -> StoreResult<u64>;

    /// Returns the matching documents, sorted, optionally windowed.
    async fn find(
        &self,
        collection: &str,
        filter: &QueryDocument,
        sort: &SortSpec,
        page: Option<PageRequest>,
    ) -> StoreResult<Vec<Value>>;

    /// Returns the first matching document in natural order.
    async fn find_one(
        &self,
        collection: &str,
        filter: &QueryDocument,
    ) -> StoreResult<Option<Value>>;

    /// Streams every matching document, sorted, without pagination.
    ///
    /// The stream is lazy and pull-based; whatever the backend holds
    /// open for it (cursor, snapshot) is released when the stream is
    /// dropped, including on early consumer disconnect.
    async fn stream(
        &self,
        collection: &str,
        filter: &QueryDocument,
        sort: &SortSpec,
    ) -> StoreResult<BoxStream<'static, StoreResult<Value>>>;

    /// Persists one document.
    async fn insert(&self, collection: &str, document: Value) -> StoreResult<()>;

    /// Deletes the first document matching the filter. Returns whether
    /// anything was deleted.
    async fn delete_one(&self, collection: &str, filter: &QueryDocument) -> StoreResult<bool>;
}
