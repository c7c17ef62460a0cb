//! Cache hydration and client lifecycle for the storefront GraphQL layer.
//!
//! This crate provides:
//! - A serializable cache snapshot and the deep-merge policy used to
//!   reconcile server-rendered state with client-side state.
//! - A snapshot cache with per-field merge strategies (offset pagination).
//! - A client factory wiring transport, error logging, and cache policy.
//! - A hydration coordinator enforcing the client lifecycle rule across
//!   persistent and stateless execution.
//! - Page-property stash/consume helpers for state transfer between render
//!   passes.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

mod cache;
mod client;
mod hydrate;
mod merge;
mod pagination;
mod snapshot;
mod state;

pub use cache::{DocumentCache, SnapshotCache};
pub use client::{ClientConfig, ClientFactory, ClientHandle};
pub use hydrate::{ExecutionMode, HydrationCoordinator};
pub use merge::merge_snapshots;
pub use pagination::{FieldPolicy, OffsetPagination, PageArgs};
pub use snapshot::CacheSnapshot;
pub use state::{attach_client_state, PageProps, PageStateReader, STATE_PROP_NAME};
