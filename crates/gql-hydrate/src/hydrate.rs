//! Client lifecycle across rendering boundaries.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::client::{ClientFactory, ClientHandle};
use crate::merge::merge_snapshots;
use crate::snapshot::CacheSnapshot;

/// Execution environment the hosting framework runs the coordinator in.
///
/// Decided once at the framework boundary and passed in explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Long-lived session; one client instance serves every call.
    Persistent,
    /// Per-request execution; every call gets an isolated client.
    Stateless,
}

/// Decides which client handle serves a render pass and reconciles cache
/// state supplied by a previous phase.
pub struct HydrationCoordinator {
    mode: ExecutionMode,
    factory: ClientFactory,
    shared: Mutex<Option<Arc<ClientHandle>>>,
}

impl HydrationCoordinator {
    /// Create a coordinator owning the (initially empty) singleton slot.
    #[must_use]
    pub const fn new(mode: ExecutionMode, factory: ClientFactory) -> Self {
        Self {
            mode,
            factory,
            shared: Mutex::new(None),
        }
    }

    /// The mode this coordinator was built for.
    #[must_use]
    pub const fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Obtain the working client handle, merging `initial` into its cache.
    ///
    /// In `Persistent` mode the first call publishes its handle as the
    /// process-wide instance and every later call reuses it; a snapshot
    /// supplied later merges into that instance rather than replacing it. In
    /// `Stateless` mode every call returns a fresh, isolated handle and the
    /// shared slot is never written.
    pub fn initialize(&self, initial: Option<&CacheSnapshot>) -> Arc<ClientHandle> {
        let mut shared = self.shared.lock();
        let handle = shared
            .clone()
            .unwrap_or_else(|| self.factory.create());

        if let Some(initial) = initial.filter(|snapshot| !snapshot.is_empty()) {
            let existing = handle.extract();
            let merged = merge_snapshots(initial, &existing);
            debug!(entries = merged.len(), "hydrating client cache");
            handle.restore(merged);
        }

        if self.mode == ExecutionMode::Persistent && shared.is_none() {
            *shared = Some(Arc::clone(&handle));
        }
        handle
    }
}

impl fmt::Debug for HydrationCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HydrationCoordinator")
            .field("mode", &self.mode)
            .field("initialized", &self.shared.lock().is_some())
            .finish()
    }
}
