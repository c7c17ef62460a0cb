//! Snapshot-backed document cache.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use crate::pagination::{FieldPolicy, PageArgs};
use crate::snapshot::CacheSnapshot;

/// Contract the hydration layer requires from a cache implementation.
pub trait DocumentCache: Send + Sync {
    /// Snapshot the current contents.
    fn extract(&self) -> CacheSnapshot;

    /// Replace the contents with a previously extracted snapshot.
    fn restore(&self, snapshot: CacheSnapshot);
}

/// In-memory cache of root fields with optional per-field merge policies.
pub struct SnapshotCache {
    entries: RwLock<CacheSnapshot>,
    policies: HashMap<String, Arc<dyn FieldPolicy>>,
}

impl SnapshotCache {
    /// Create an empty cache with no field policies.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(CacheSnapshot::new()),
            policies: HashMap::new(),
        }
    }

    /// Register a merge policy for one root field.
    #[must_use]
    pub fn with_policy(mut self, field: impl Into<String>, policy: Arc<dyn FieldPolicy>) -> Self {
        self.policies.insert(field.into(), policy);
        self
    }

    /// Write one root field, routing through its merge policy when registered.
    pub fn write(&self, field: &str, incoming: &Value, args: &PageArgs) {
        let mut entries = self.entries.write();
        let value = match self.policies.get(field) {
            Some(policy) => policy.merge(entries.get(field), incoming, args),
            None => incoming.clone(),
        };
        entries.insert(field, value);
    }

    /// Read one root field.
    #[must_use]
    pub fn read(&self, field: &str) -> Option<Value> {
        self.entries.read().get(field).cloned()
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentCache for SnapshotCache {
    fn extract(&self) -> CacheSnapshot {
        self.entries.read().clone()
    }

    fn restore(&self, snapshot: CacheSnapshot) {
        *self.entries.write() = snapshot;
    }
}

impl fmt::Debug for SnapshotCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotCache")
            .field("entries", &self.entries.read().len())
            .field("policies", &self.policies.keys().collect::<Vec<_>>())
            .finish()
    }
}
