//! Serializable cache snapshot.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A complete, serializable view of cache contents at one instant.
///
/// The snapshot is an opaque mapping of root fields to values; nothing here
/// interprets its internal structure beyond "collection of entries". Deep
/// equality (`PartialEq`) drives both array deduplication during merges and
/// consumer-side memoization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheSnapshot(Map<String, Value>);

impl CacheSnapshot {
    /// Create an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the snapshot holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of root entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Look up a root field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Insert a root field, returning the previous value if any.
    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    /// Iterate over root entries.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Convert into a JSON value for transport.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Read a snapshot back from a JSON value; `None` unless it is an object.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(entries) => Some(Self(entries)),
            _ => None,
        }
    }

    pub(crate) fn entries(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for CacheSnapshot {
    fn from(entries: Map<String, Value>) -> Self {
        Self(entries)
    }
}
