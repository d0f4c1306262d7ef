//! Single-flight cache from member handles to current method descriptors.
//!
//! # Slots
//!
//! Each handle maps to one slot. A slot moves through three states:
//!
//! ```text
//! not requested   no slot in the table
//! in progress     slot present, its OnceLock being initialised by one thread
//! settled         Managed(descriptor) or Unmanaged
//! ```
//!
//! `Unmanaged` is the internal sentinel for "computed, nothing found": it
//! stops a genuinely absent member from being recomputed on every lookup.
//! Callers only ever see `Option`.
//!
//! # Thread Safety
//!
//! The key table is a `DashMap`, so unrelated handles rarely share a lock,
//! and no table lock is held while a result is computed. Threads racing on
//! the same new handle all reach the same slot; `OnceLock` runs exactly one
//! initialiser and parks the others until it finishes.
//!
//! # Bounding
//!
//! The table is bounded by a capacity. When inserting a new key would
//! exceed it, every settled slot is evicted first; in-progress slots are
//! never evicted. Eviction only costs a recomputation on the next lookup.
//! A capacity of zero disables the bound.
//!
//! Results are additionally evicted per declaring type with
//! [`HandleResolutionCache::invalidate_type`], which the store calls when a
//! new snapshot for that type is published.

use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use reclass_ir::{MemberHandle, MethodDescriptor, ScopeId};
use rustc_hash::FxBuildHasher;

use crate::SnapshotSource;

/// Settled result of one resolution.
#[derive(Clone, Debug)]
enum Resolution {
    Managed(Arc<MethodDescriptor>),
    Unmanaged,
}

impl Resolution {
    fn descriptor(&self) -> Option<Arc<MethodDescriptor>> {
        match self {
            Resolution::Managed(descriptor) => Some(Arc::clone(descriptor)),
            Resolution::Unmanaged => None,
        }
    }
}

#[derive(Debug, Default)]
struct Slot {
    resolution: OnceLock<Resolution>,
}

impl Slot {
    fn is_settled(&self) -> bool {
        self.resolution.get().is_some()
    }
}

/// Maps member handles to the method descriptors currently backing them.
pub struct HandleResolutionCache<S> {
    source: S,
    slots: DashMap<MemberHandle, Arc<Slot>, FxBuildHasher>,
    capacity: usize,
}

impl<S: SnapshotSource> HandleResolutionCache<S> {
    /// Create a cache with no capacity bound.
    pub fn new(source: S) -> Self {
        Self::with_capacity(source, 0)
    }

    /// Create a cache holding at most `capacity` handles; zero means unbounded.
    pub fn with_capacity(source: S, capacity: usize) -> Self {
        HandleResolutionCache {
            source,
            slots: DashMap::with_hasher(FxBuildHasher::default()),
            capacity,
        }
    }

    /// Resolve a handle to its current method descriptor.
    ///
    /// The first request for a handle computes the result exactly once,
    /// however many threads ask at the same time; the result, including
    /// absence, is then served from the cache until evicted.
    pub fn resolve(&self, handle: &MemberHandle) -> Option<Arc<MethodDescriptor>> {
        let slot = self.slot_for(handle);
        slot.resolution
            .get_or_init(|| self.compute(handle))
            .descriptor()
    }

    fn slot_for(&self, handle: &MemberHandle) -> Arc<Slot> {
        if let Some(slot) = self.slots.get(handle) {
            return Arc::clone(slot.value());
        }
        if self.capacity != 0 && self.slots.len() >= self.capacity {
            self.evict_settled();
        }
        let slot = self.slots.entry(handle.clone()).or_default();
        Arc::clone(slot.value())
    }

    fn compute(&self, handle: &MemberHandle) -> Resolution {
        let Some(snapshot) = self
            .source
            .modified_snapshot(handle.scope(), handle.declaring_type())
        else {
            tracing::trace!(%handle, "declaring type not managed");
            return Resolution::Unmanaged;
        };

        let found = snapshot
            .methods()
            .find(|m| m.name() == handle.name() && m.signature() == handle.signature());
        tracing::trace!(
            %handle,
            revision = snapshot.revision(),
            found = found.is_some(),
            "resolved handle"
        );
        found.map_or(Resolution::Unmanaged, |m| Resolution::Managed(Arc::clone(m)))
    }

    fn evict_settled(&self) {
        let before = self.slots.len();
        self.slots.retain(|_, slot| !slot.is_settled());
        tracing::debug!(
            evicted = before.saturating_sub(self.slots.len()),
            capacity = self.capacity,
            "handle cache at capacity"
        );
    }

    /// Drop every cached entry whose declaring type is `qualified_name` in `scope`.
    ///
    /// Threads already waiting on a dropped in-progress slot still receive
    /// its result; later requests compute afresh.
    pub fn invalidate_type(&self, scope: ScopeId, qualified_name: &str) -> usize {
        let before = self.slots.len();
        self.slots.retain(|handle, _| {
            handle.scope() != scope || handle.declaring_type() != qualified_name
        });
        let evicted = before.saturating_sub(self.slots.len());
        if evicted > 0 {
            tracing::debug!(%scope, qualified_name, evicted, "invalidated cached handles");
        }
        evicted
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        self.slots.clear();
    }

    /// Number of handles with a slot, settled or in progress.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Configured capacity; zero means unbounded.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The source snapshots are resolved from.
    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S> std::fmt::Debug for HandleResolutionCache<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandleResolutionCache")
            .field("entries", &self.slots.len())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
