//! In-process TTL cache for query results.
//!
//! Keys pair the SQL text with the serialized binding list, so two calls are
//! only considered identical when both match. The binding serialization is
//! order-sensitive: placeholder order is positional, so logically-equal but
//! reordered parameter lists are distinct keys. Only successful row sets are
//! stored; errors never are. There is no single-flight de-duplication — two
//! requests racing on one uncached key may both execute the query.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use serde_json::Value;
use tracing::debug;

/// Default TTL for cached row sets (100 seconds).
const DEFAULT_TTL_SECS: u64 = 100;

/// Maximum number of cached row sets.
const MAX_CAPACITY: u64 = 10_000;

/// A shared, immutable row set as stored in the cache.
pub type CachedRows = Arc<Vec<Value>>;

/// TTL-keyed store mapping (SQL text, bindings) to a fetched row set.
///
/// Scoped to one [`Table`](crate::table::Table) handle; handles built without
/// a cache perform no interposition at all.
#[derive(Clone)]
pub struct QueryCache {
    inner: Cache<String, CachedRows>,
}

impl QueryCache {
    /// Create a cache with the given entry TTL.
    pub fn new(ttl: Duration) -> Self {
        let inner = Cache::builder()
            .max_capacity(MAX_CAPACITY)
            .time_to_live(ttl)
            .build();
        Self { inner }
    }

    /// Create a cache with the default TTL.
    pub fn with_default_ttl() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TTL_SECS))
    }

    /// Derive the cache key for a query and its bindings.
    pub fn query_key(sql: &str, bindings: &[Value]) -> String {
        let serialized = Value::Array(bindings.to_vec()).to_string();
        format!("query:{sql}:{serialized}")
    }

    /// Derive the cache key for a table's schema lookup.
    pub fn schema_key(table: &str) -> String {
        format!("schema:{table}")
    }

    /// Look up a stored row set.
    pub fn get(&self, key: &str) -> Option<CachedRows> {
        let rows = self.inner.get(key);
        if rows.is_some() {
            debug!(key = %key, "query cache hit");
        }
        rows
    }

    /// Store a successfully fetched row set.
    pub fn insert(&self, key: String, rows: CachedRows) {
        debug!(key = %key, rows = rows.len(), "query cache set");
        self.inner.insert(key, rows);
    }

    /// Drop every entry.
    pub fn flush_all(&self) {
        self.inner.invalidate_all();
    }
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache").finish()
    }
}
