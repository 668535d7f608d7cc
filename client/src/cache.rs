//! Keyed cache of server reads. Concurrent fetches of one key share a single
//! request; failed loads are not kept; mutations invalidate by key prefix.

use crate::error::{ClientError, Result};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

/// Ordered key segments, e.g. `review/<book id>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new(root: impl Into<String>) -> Self {
        QueryKey(vec![root.into()])
    }

    pub fn with(mut self, segment: impl ToString) -> Self {
        self.0.push(segment.to_string());
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }

    pub fn books() -> Self {
        QueryKey::new("books")
    }

    pub fn shelf() -> Self {
        QueryKey::new("shelf")
    }

    pub fn review() -> Self {
        QueryKey::new("review")
    }

    pub fn goal() -> Self {
        QueryKey::new("goal")
    }

    pub fn statistics() -> Self {
        QueryKey::new("statistics")
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

type Slot = Arc<OnceCell<Arc<dyn Any + Send + Sync>>>;

#[derive(Default)]
pub struct QueryCache {
    entries: Mutex<HashMap<QueryKey, Slot>>,
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache").field("entries", &self.keys()).finish()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, key: &QueryKey) -> Slot {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.entry(key.clone()).or_default().clone()
    }

    /// Cached value for `key`, loading it with `loader` on a miss.
    pub async fn fetch<T, F, Fut>(&self, key: &QueryKey, loader: F) -> Result<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let slot = self.slot(key);
        let value = slot
            .get_or_try_init(|| async {
                tracing::debug!(key = %key, "cache miss");
                loader().await.map(|v| Arc::new(v) as Arc<dyn Any + Send + Sync>)
            })
            .await?;
        value
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| ClientError::CacheType(key.to_string()))
    }

    /// Cached value without loading.
    pub fn peek<T: Clone + 'static>(&self, key: &QueryKey) -> Option<T> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(key)?.get()?.downcast_ref::<T>().cloned()
    }

    /// Drops every entry under `prefix`. Loads already in flight finish for
    /// their callers but are not stored.
    pub fn invalidate(&self, prefix: &QueryKey) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.retain(|k, _| !k.starts_with(prefix));
        tracing::debug!(prefix = %prefix, "cache invalidated");
    }

    pub fn invalidate_all(&self, prefixes: &[QueryKey]) {
        for prefix in prefixes {
            self.invalidate(prefix);
        }
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    /// Keys holding a loaded value.
    pub fn keys(&self) -> Vec<QueryKey> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let mut keys: Vec<_> = entries
            .iter()
            .filter(|(_, slot)| slot.initialized())
            .map(|(k, _)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.peek_slot(key).is_some_and(|slot| slot.initialized())
    }

    fn peek_slot(&self, key: &QueryKey) -> Option<Slot> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }
}
