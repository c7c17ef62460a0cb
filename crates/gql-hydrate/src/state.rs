//! Page-level state transfer between render passes.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Map, Value};
use tracing::debug;

use crate::client::ClientHandle;
use crate::hydrate::HydrationCoordinator;
use crate::snapshot::CacheSnapshot;

/// Well-known page property carrying serialized cache state.
pub const STATE_PROP_NAME: &str = "__GQL_STATE__";

/// Page-level properties mapping handed between render passes.
pub type PageProps = Map<String, Value>;

/// Stash `handle`'s current cache snapshot into `props` under
/// [`STATE_PROP_NAME`], and hand the mutated map back.
pub fn attach_client_state<'a>(
    handle: &ClientHandle,
    props: &'a mut PageProps,
) -> &'a mut PageProps {
    props.insert(STATE_PROP_NAME.to_string(), handle.extract().into_value());
    props
}

/// Consumption side: turns page properties back into a working client.
///
/// Lookups are memoized by snapshot equality, so repeated calls with an
/// unchanged snapshot return the same handle without re-merging.
pub struct PageStateReader {
    coordinator: Arc<HydrationCoordinator>,
    memo: Mutex<Option<(CacheSnapshot, Arc<ClientHandle>)>>,
}

impl PageStateReader {
    /// Create a reader feeding the given coordinator.
    #[must_use]
    pub const fn new(coordinator: Arc<HydrationCoordinator>) -> Self {
        Self {
            coordinator,
            memo: Mutex::new(None),
        }
    }

    /// Extract the well-known state property and initialize a client with it.
    pub fn client_for(&self, props: &PageProps) -> Arc<ClientHandle> {
        let snapshot = props
            .get(STATE_PROP_NAME)
            .cloned()
            .and_then(CacheSnapshot::from_value)
            .unwrap_or_default();

        let mut memo = self.memo.lock();
        if let Some((seen, handle)) = memo.as_ref() {
            if *seen == snapshot {
                debug!("reusing memoized client handle");
                return Arc::clone(handle);
            }
        }

        let handle = self.coordinator.initialize(Some(&snapshot));
        *memo = Some((snapshot, Arc::clone(&handle)));
        handle
    }
}

impl fmt::Debug for PageStateReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageStateReader")
            .field("coordinator", &self.coordinator)
            .field("memoized", &self.memo.lock().is_some())
            .finish()
    }
}
