//! Snapshot merge policy for hydration.

use serde_json::{Map, Value};

use crate::snapshot::CacheSnapshot;

/// Deep-merge two snapshots field by field.
///
/// `initial` is the state supplied by the previous render phase, `existing`
/// is what the working cache already holds. Where both define a scalar,
/// `initial` wins; nested objects merge recursively. Array fields keep all of
/// `initial`'s elements in order, then append each element of `existing` that
/// has no deep-equal counterpart anywhere in `initial`'s array. That keeps
/// items only known on one side while dropping duplicated paginated entries.
#[must_use]
pub fn merge_snapshots(initial: &CacheSnapshot, existing: &CacheSnapshot) -> CacheSnapshot {
    merge_objects(initial.entries(), existing.entries()).into()
}

fn merge_values(initial: &Value, existing: &Value) -> Value {
    match (initial, existing) {
        (Value::Object(lhs), Value::Object(rhs)) => Value::Object(merge_objects(lhs, rhs)),
        (Value::Array(lhs), Value::Array(rhs)) => Value::Array(merge_arrays(lhs, rhs)),
        // Scalars and mismatched shapes resolve to the initial side.
        (winner, _) => winner.clone(),
    }
}

fn merge_objects(initial: &Map<String, Value>, existing: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for (field, value) in initial {
        let merged = match existing.get(field) {
            Some(other) => merge_values(value, other),
            None => value.clone(),
        };
        out.insert(field.clone(), merged);
    }
    for (field, value) in existing {
        if !initial.contains_key(field) {
            out.insert(field.clone(), value.clone());
        }
    }
    out
}

fn merge_arrays(initial: &[Value], existing: &[Value]) -> Vec<Value> {
    let mut out = initial.to_vec();
    out.extend(
        existing
            .iter()
            .filter(|candidate| initial.iter().all(|kept| kept != *candidate))
            .cloned(),
    );
    out
}
