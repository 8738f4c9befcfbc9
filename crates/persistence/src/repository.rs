//! The tenant-scoped repository.
//!
//! `Repository` ties the query engine, the entity mapper, and a
//! [`DocumentStore`] together into the operation set the proxy serves:
//! list, count, get, create, delete, and a streaming list variant.
//!
//! Every operation requires a tenant identity. Callers in the
//! configured elevated set see across tenants on reads; everyone else is
//! confined to their own records by a tenant predicate conjoined to the
//! compiled filter after compilation, so no query parameter can widen
//! visibility. Deletion is tenant-exact even for elevated callers.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use tickethub_model::{EntitySchema, Violation, validate};

use crate::entity::{EntityRecord, ID_FIELD, TENANT_FIELD, mapper};
use crate::error::{Result, TenantError, ValidationError};
use crate::query::{
    QueryDocument, QueryNode, QueryParams, ScalarValue, compile_filter, project,
};
use crate::store::DocumentStore;
use crate::tenant::TenantId;

/// Boxed error for notification hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Extension points around the persistence flow.
///
/// All methods have no-op defaults; implementors override what they
/// need. Notification methods run after the store call committed, and
/// their failures are logged, never propagated: the write stands.
#[async_trait]
pub trait Hooks: Send + Sync {
    /// Adjusts a freshly mapped record before validation.
    fn transform(&self, record: EntityRecord) -> EntityRecord {
        record
    }

    /// Additional validation beyond the schema rules.
    fn validate(&self, _record: &EntityRecord) -> Vec<Violation> {
        Vec::new()
    }

    /// Invoked after a record was persisted.
    async fn notify_create(
        &self,
        _record: &Map<String, Value>,
    ) -> std::result::Result<(), BoxError> {
        Ok(())
    }

    /// Invoked after a record was deleted.
    async fn notify_delete(&self, _id: &str) -> std::result::Result<(), BoxError> {
        Ok(())
    }
}

/// The do-nothing hook set.
pub struct NoopHooks;

impl Hooks for NoopHooks {}

/// Repository configuration.
#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    /// Tenant identifiers with cross-tenant read visibility.
    pub elevated_tenants: Vec<String>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            elevated_tenants: vec!["admin".to_string()],
        }
    }
}

/// One page of list results.
#[derive(Debug, Clone)]
pub struct ListPage {
    /// The flattened, projected records of this page.
    pub items: Vec<Map<String, Value>>,
    /// Total number of records matching the filter, across all pages.
    pub total_count: u64,
}

impl ListPage {
    /// Number of records actually returned.
    pub fn result_count(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` when the page holds less than the full result
    /// set, letting the transport layer pick its partial-content status.
    pub fn is_partial(&self) -> bool {
        (self.items.len() as u64) < self.total_count
    }
}

/// Whether an id lookup may be relaxed for elevated callers.
#[derive(Clone, Copy)]
enum Scope {
    Read,
    Delete,
}

/// A tenant-scoped repository over one entity kind.
pub struct Repository<S> {
    store: Arc<S>,
    schema: &'static EntitySchema,
    config: RepositoryConfig,
    hooks: Arc<dyn Hooks>,
}

impl<S: DocumentStore> Repository<S> {
    /// Creates a repository with default configuration and no hooks.
    pub fn new(store: Arc<S>, schema: &'static EntitySchema) -> Self {
        Self {
            store,
            schema,
            config: RepositoryConfig::default(),
            hooks: Arc::new(NoopHooks),
        }
    }

    /// Replaces the hook set.
    pub fn with_hooks(mut self, hooks: Arc<dyn Hooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: RepositoryConfig) -> Self {
        self.config = config;
        self
    }

    /// The schema this repository serves.
    pub fn schema(&self) -> &'static EntitySchema {
        self.schema
    }

    /// Lists records matching the request's filter, sorted, windowed by
    /// `limit`/`offset`, reduced to the requested fields.
    ///
    /// `limit=0` returns an empty page while still reporting the true
    /// total, so callers can probe counts without paying for a page.
    pub async fn list(&self, tenant: &TenantId, params: &QueryParams) -> Result<ListPage> {
        self.ensure_tenant(tenant)?;
        let page = params.page()?;
        let fields = params.fields();
        let sort = params.sort();
        let filter = self.scoped_filter(tenant, params)?;

        let total_count = self.store.count(self.collection(), &filter).await?;

        let items = if page.limit == 0 {
            Vec::new()
        } else {
            let documents = self
                .store
                .find(self.collection(), &filter, &sort, Some(page))
                .await?;
            let mut items = Vec::with_capacity(documents.len());
            for document in documents {
                items.push(project(self.flatten(document)?, &fields));
            }
            items
        };

        Ok(ListPage { items, total_count })
    }

    /// Counts the records matching the request's filter.
    pub async fn count(&self, tenant: &TenantId, params: &QueryParams) -> Result<u64> {
        self.ensure_tenant(tenant)?;
        let filter = self.scoped_filter(tenant, params)?;
        Ok(self.store.count(self.collection(), &filter).await?)
    }

    /// Fetches one record by id.
    ///
    /// Elevated callers may read records of any tenant; everyone else
    /// only their own.
    pub async fn get(&self, tenant: &TenantId, id: &str) -> Result<Map<String, Value>> {
        self.ensure_tenant(tenant)?;
        let filter = self.id_filter(tenant, id, Scope::Read);
        match self.store.find_one(self.collection(), &filter).await? {
            Some(document) => self.flatten(document),
            None => Err(self.not_found(id)),
        }
    }

    /// Creates a record from its flat external representation.
    ///
    /// Mapping, the transform hook, tenant stamping, and validation all
    /// happen before the store call; a rejected record leaves no side
    /// effects. The create notification runs after the write committed
    /// and cannot unwind it.
    pub async fn create(
        &self,
        tenant: &TenantId,
        data: Map<String, Value>,
    ) -> Result<Map<String, Value>> {
        self.ensure_tenant(tenant)?;

        let record = mapper::from_flat(self.schema, data);
        let mut record = self.hooks.transform(record);
        record.tenant = Some(tenant.clone());

        let mut violations = validate(self.schema, &record.known);
        violations.extend(self.hooks.validate(&record));
        if !violations.is_empty() {
            return Err(ValidationError::Invalid { violations }.into());
        }

        self.store
            .insert(self.collection(), mapper::to_document(&record))
            .await?;
        debug!(kind = self.schema.kind, id = %record.id, tenant = %tenant, "created record");

        let flat = mapper::to_flat(&record);
        if let Err(error) = self.hooks.notify_create(&flat).await {
            warn!(kind = self.schema.kind, id = %record.id, %error, "create notification failed");
        }

        Ok(flat)
    }

    /// Deletes one record by id, always scoped to the caller's exact
    /// tenant; elevated identities get no relaxation here.
    pub async fn delete(&self, tenant: &TenantId, id: &str) -> Result<()> {
        self.ensure_tenant(tenant)?;
        let filter = self.id_filter(tenant, id, Scope::Delete);

        if !self.store.delete_one(self.collection(), &filter).await? {
            return Err(self.not_found(id));
        }
        debug!(kind = self.schema.kind, id, tenant = %tenant, "deleted record");

        if let Err(error) = self.hooks.notify_delete(id).await {
            warn!(kind = self.schema.kind, id, %error, "delete notification failed");
        }

        Ok(())
    }

    /// Streams every record matching the request's filter, sorted,
    /// ignoring `limit` and `offset` entirely.
    ///
    /// The stream is lazy; dropping it releases the underlying store
    /// resources. It is not restartable: a new request starts a fresh
    /// query.
    pub async fn stream(
        &self,
        tenant: &TenantId,
        params: &QueryParams,
    ) -> Result<BoxStream<'static, Result<Map<String, Value>>>> {
        self.ensure_tenant(tenant)?;
        let fields = params.fields();
        let sort = params.sort();
        let filter = self.scoped_filter(tenant, params)?;

        let schema = self.schema;
        let stream = self.store.stream(self.collection(), &filter, &sort).await?;

        Ok(stream
            .map(move |result| -> Result<Map<String, Value>> {
                let record = mapper::from_document(schema, result?)?;
                Ok(project(mapper::to_flat(&record), &fields))
            })
            .boxed())
    }

    fn collection(&self) -> &'static str {
        self.schema.kind
    }

    fn ensure_tenant(&self, tenant: &TenantId) -> Result<()> {
        if tenant.is_blank() {
            return Err(TenantError::Missing.into());
        }
        Ok(())
    }

    fn is_elevated(&self, tenant: &TenantId) -> bool {
        self.config
            .elevated_tenants
            .iter()
            .any(|elevated| elevated == tenant.as_str())
    }

    /// Compiles the request filter and conjoins the tenant predicate.
    /// The predicate is inserted after compilation, so a query parameter
    /// named like the tenant marker can never override it.
    fn scoped_filter(&self, tenant: &TenantId, params: &QueryParams) -> Result<QueryDocument> {
        let mut filter = compile_filter(params.pairs())?;
        if !self.is_elevated(tenant) {
            filter.insert(TENANT_FIELD, equals(tenant.as_str()));
        }
        Ok(filter)
    }

    fn id_filter(&self, tenant: &TenantId, id: &str, scope: Scope) -> QueryDocument {
        let mut filter = QueryDocument::entry(ID_FIELD, equals(id));
        let relaxed = matches!(scope, Scope::Read) && self.is_elevated(tenant);
        if !relaxed {
            filter.insert(TENANT_FIELD, equals(tenant.as_str()));
        }
        filter
    }

    fn flatten(&self, document: Value) -> Result<Map<String, Value>> {
        let record = mapper::from_document(self.schema, document)?;
        Ok(mapper::to_flat(&record))
    }

    fn not_found(&self, id: &str) -> crate::error::Error {
        crate::error::Error::NotFound {
            kind: self.schema.kind.to_string(),
            id: id.to_string(),
        }
    }
}

/// An exact-equality clause; ids and tenant markers are matched as
/// strings, never run through coercion.
fn equals(value: &str) -> QueryNode {
    QueryNode::Document(QueryDocument::entry(
        "$eq",
        QueryNode::Scalar(ScalarValue::from(value)),
    ))
}
