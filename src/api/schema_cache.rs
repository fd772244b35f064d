//! Introspection schema cache with TTL and single-flight refresh.
//!
//! The cache is an injected collaborator of the capabilities that need the
//! remote schema, never a module-level singleton.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use tokio::sync::Mutex;

use super::{ApiClient, ApiError};

/// Default time-to-live for a fetched schema (5 minutes).
pub const DEFAULT_SCHEMA_TTL: Duration = Duration::from_secs(300);

/// Introspection document sent to the API.
pub const INTROSPECTION_QUERY: &str = r#"query IntrospectionQuery {
  __schema {
    queryType { name }
    mutationType { name }
    types {
      kind
      name
      description
      fields(includeDeprecated: false) {
        name
        description
        args { name type { kind name ofType { kind name ofType { kind name } } } }
        type { kind name ofType { kind name ofType { kind name } } }
      }
      inputFields { name type { kind name ofType { kind name } } }
      enumValues(includeDeprecated: false) { name }
    }
  }
}"#;

#[async_trait]
pub trait SchemaCache: Send + Sync {
    /// Return the cached schema, fetching it first when stale or empty.
    async fn get(&self, client: &dyn ApiClient) -> Result<Arc<Value>, ApiError>;

    /// Fetch a new schema regardless of freshness.
    async fn refresh(&self, client: &dyn ApiClient) -> Result<Arc<Value>, ApiError>;

    fn is_fresh(&self) -> bool;
}

struct CacheEntry {
    schema: Arc<Value>,
    fetched_at: Instant,
}

/// In-memory [`SchemaCache`].
///
/// Concurrent callers that find the cache stale share a single fetch.
pub struct TtlSchemaCache {
    ttl: Duration,
    entry: RwLock<Option<CacheEntry>>,
    refresh_lock: Mutex<()>,
}

impl Default for TtlSchemaCache {
    fn default() -> Self {
        Self::new(DEFAULT_SCHEMA_TTL)
    }
}

impl TtlSchemaCache {
    /// Cache whose entries go stale after `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    fn fresh_schema(&self) -> Option<Arc<Value>> {
        self.entry
            .read()
            .as_ref()
            .filter(|e| e.fetched_at.elapsed() < self.ttl)
            .map(|e| Arc::clone(&e.schema))
    }

    /// Schema fetched at or after `since`, if any.
    fn schema_since(&self, since: Instant) -> Option<Arc<Value>> {
        self.entry
            .read()
            .as_ref()
            .filter(|e| e.fetched_at >= since)
            .map(|e| Arc::clone(&e.schema))
    }

    async fn fetch(&self, client: &dyn ApiClient) -> Result<Arc<Value>, ApiError> {
        log::debug!("Fetching remote schema");
        let schema = Arc::new(client.request(INTROSPECTION_QUERY, None).await?);
        *self.entry.write() = Some(CacheEntry {
            schema: Arc::clone(&schema),
            fetched_at: Instant::now(),
        });
        Ok(schema)
    }
}

#[async_trait]
impl SchemaCache for TtlSchemaCache {
    async fn get(&self, client: &dyn ApiClient) -> Result<Arc<Value>, ApiError> {
        if let Some(schema) = self.fresh_schema() {
            return Ok(schema);
        }
        let _guard = self.refresh_lock.lock().await;
        // Another caller may have refreshed while we waited.
        if let Some(schema) = self.fresh_schema() {
            return Ok(schema);
        }
        self.fetch(client).await
    }

    async fn refresh(&self, client: &dyn ApiClient) -> Result<Arc<Value>, ApiError> {
        let requested_at = Instant::now();
        let _guard = self.refresh_lock.lock().await;
        if let Some(schema) = self.schema_since(requested_at) {
            return Ok(schema);
        }
        self.fetch(client).await
    }

    fn is_fresh(&self) -> bool {
        self.fresh_schema().is_some()
    }
}
