//! Per-field cache merge strategies.

use serde_json::Value;

/// Arguments a paginated field was queried with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageArgs {
    /// Number of items skipped before this page.
    pub skip: usize,
    /// Requested page size, when bounded.
    pub first: Option<usize>,
}

impl PageArgs {
    /// Arguments for a page starting at `skip`.
    #[must_use]
    pub const fn at(skip: usize) -> Self {
        Self { skip, first: None }
    }
}

/// Strategy for combining an incoming field value with what the cache holds.
pub trait FieldPolicy: Send + Sync {
    /// Produce the value to store for the field.
    fn merge(&self, existing: Option<&Value>, incoming: &Value, args: &PageArgs) -> Value;
}

/// Positional merge for offset-paginated collections.
///
/// Incoming page items are written into a copy of the existing array starting
/// at `args.skip`; the array grows as needed and earlier pages stay in place,
/// so result sets fetched out of order still land at their positions.
#[derive(Debug, Clone, Copy, Default)]
pub struct OffsetPagination;

impl FieldPolicy for OffsetPagination {
    fn merge(&self, existing: Option<&Value>, incoming: &Value, args: &PageArgs) -> Value {
        let Value::Array(page) = incoming else {
            return incoming.clone();
        };

        let mut merged = match existing {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        };
        if merged.len() < args.skip {
            merged.resize(args.skip, Value::Null);
        }
        for (offset, item) in page.iter().enumerate() {
            let slot = args.skip + offset;
            if slot < merged.len() {
                merged[slot] = item.clone();
            } else {
                merged.push(item.clone());
            }
        }
        Value::Array(merged)
    }
}
