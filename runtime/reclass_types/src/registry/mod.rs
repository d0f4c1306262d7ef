//! Process-wide map from (scope, qualified name) to the current snapshot.
//!
//! # Tables
//!
//! ```text
//! modified: snapshots published by the redefinition pipeline
//! parsed:   snapshots of first observations
//! ```
//!
//! `get`/`put` address the modified table. Hierarchy walks and handle
//! resolution only ever consult it, so a type that has never been
//! structurally redefined is invisible to them.
//!
//! # Thread Safety
//!
//! Entries are sharded by qualified name, one `RwLock` per shard. A snapshot
//! is fully built before `put` takes the write lock, and publication swaps
//! one `Arc` for another, so readers never see a partially built snapshot
//! and never block on snapshot construction.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::RwLock;
use reclass_ir::{MethodDescriptor, ScopeId};
use rustc_hash::{FxHashMap, FxHasher};

use crate::TypeSnapshot;

/// Number of shards for registry entries.
const NUM_SHARDS: usize = 16;

type ScopeTable = FxHashMap<ScopeId, FxHashMap<Box<str>, Arc<TypeSnapshot>>>;

#[derive(Default)]
struct RegistryShard {
    modified: ScopeTable,
    parsed: ScopeTable,
}

fn lookup(table: &ScopeTable, scope: ScopeId, qualified_name: &str) -> Option<Arc<TypeSnapshot>> {
    table.get(&scope)?.get(qualified_name).cloned()
}

fn insert(table: &mut ScopeTable, snapshot: Arc<TypeSnapshot>) -> Option<Arc<TypeSnapshot>> {
    table
        .entry(snapshot.scope().id())
        .or_default()
        .insert(snapshot.qualified_name().into(), snapshot)
}

/// Drop entries whose scope is gone, returning how many were dropped.
fn retain_live(table: &mut ScopeTable) -> usize {
    let mut dropped = 0;
    table.retain(|_, types| {
        let before = types.len();
        types.retain(|_, snapshot| snapshot.scope().is_live());
        dropped += before - types.len();
        !types.is_empty()
    });
    dropped
}

/// Read access to published snapshots.
///
/// The seam the handle cache resolves through; tests substitute an
/// instrumented source to count resolutions.
pub trait SnapshotSource: Send + Sync {
    /// The current modified snapshot for a type, if it has one.
    fn modified_snapshot(&self, scope: ScopeId, qualified_name: &str) -> Option<Arc<TypeSnapshot>>;
}

/// Current snapshot per (scope, qualified name).
pub struct TypeRegistry {
    shards: [RwLock<RegistryShard>; NUM_SHARDS],
}

impl TypeRegistry {
    pub fn new() -> Self {
        TypeRegistry {
            shards: std::array::from_fn(|_| RwLock::new(RegistryShard::default())),
        }
    }

    /// Shard holding entries for this qualified name.
    #[inline]
    fn shard(&self, qualified_name: &str) -> &RwLock<RegistryShard> {
        let mut hasher = FxHasher::default();
        qualified_name.hash(&mut hasher);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "truncation is fine for hash-based shard selection"
        )]
        let hash = hasher.finish() as usize;
        &self.shards[hash % NUM_SHARDS]
    }

    /// The current modified snapshot for a type.
    pub fn get(&self, scope: ScopeId, qualified_name: &str) -> Option<Arc<TypeSnapshot>> {
        let found = lookup(&self.shard(qualified_name).read().modified, scope, qualified_name);
        tracing::trace!(%scope, qualified_name, hit = found.is_some(), "registry get");
        found
    }

    /// Publish a snapshot as the current modified entry for its type.
    ///
    /// The key is the snapshot's own scope and qualified name. Returns the
    /// entry it replaced.
    pub fn put(&self, snapshot: Arc<TypeSnapshot>) -> Option<Arc<TypeSnapshot>> {
        let scope = snapshot.scope().id();
        let revision = snapshot.revision();
        let shard = self.shard(snapshot.qualified_name());
        let type_name: Box<str> = snapshot.qualified_name().into();
        let previous = insert(&mut shard.write().modified, snapshot);
        tracing::debug!(
            %scope,
            type_name = %type_name,
            revision,
            replaced = previous.is_some(),
            "published snapshot"
        );
        previous
    }

    /// The snapshot recorded at a type's first observation.
    pub fn get_parsed(&self, scope: ScopeId, qualified_name: &str) -> Option<Arc<TypeSnapshot>> {
        lookup(&self.shard(qualified_name).read().parsed, scope, qualified_name)
    }

    /// Record a first-observation snapshot. Returns the entry it replaced.
    pub fn put_parsed(&self, snapshot: Arc<TypeSnapshot>) -> Option<Arc<TypeSnapshot>> {
        let shard = self.shard(snapshot.qualified_name());
        insert(&mut shard.write().parsed, snapshot)
    }

    /// The modified snapshot if there is one, otherwise the parsed one.
    pub fn current(&self, scope: ScopeId, qualified_name: &str) -> Option<Arc<TypeSnapshot>> {
        let shard = self.shard(qualified_name).read();
        lookup(&shard.modified, scope, qualified_name)
            .or_else(|| lookup(&shard.parsed, scope, qualified_name))
    }

    /// Substitute one method in the published modified snapshot.
    ///
    /// Copy-on-write under the shard's write lock: the published snapshot is
    /// cloned, the bucket for the method's key is replaced, and the copy is
    /// swapped in. Returns the new snapshot, or `None` when the type has no
    /// modified entry.
    pub fn replace_member(
        &self,
        scope: ScopeId,
        qualified_name: &str,
        method: impl Into<Arc<MethodDescriptor>>,
    ) -> Option<Arc<TypeSnapshot>> {
        let mut shard = self.shard(qualified_name).write();
        let slot = shard.modified.get_mut(&scope)?.get_mut(qualified_name)?;
        let next = Arc::new(slot.with_replaced(method));
        *slot = Arc::clone(&next);
        tracing::debug!(%scope, qualified_name, "replaced member in published snapshot");
        Some(next)
    }

    /// Drop every entry whose defining scope has been torn down.
    ///
    /// Entries published with a detached scope reference are dropped too.
    pub fn purge_unreachable_scopes(&self) -> usize {
        let mut dropped = 0;
        for shard in &self.shards {
            let mut shard = shard.write();
            dropped += retain_live(&mut shard.modified);
            dropped += retain_live(&mut shard.parsed);
        }
        if dropped > 0 {
            tracing::debug!(dropped, "purged entries of unreachable scopes");
        }
        dropped
    }

    /// Number of modified entries.
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| shard.read().modified.values().map(|types| types.len()).sum::<usize>())
            .sum()
    }

    /// Number of parsed entries.
    pub fn parsed_len(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| shard.read().parsed.values().map(|types| types.len()).sum::<usize>())
            .sum()
    }

    /// True when there are no modified entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("modified", &self.len())
            .field("parsed", &self.parsed_len())
            .finish()
    }
}

impl SnapshotSource for TypeRegistry {
    fn modified_snapshot(&self, scope: ScopeId, qualified_name: &str) -> Option<Arc<TypeSnapshot>> {
        self.get(scope, qualified_name)
    }
}

impl<T: SnapshotSource + ?Sized> SnapshotSource for &T {
    fn modified_snapshot(&self, scope: ScopeId, qualified_name: &str) -> Option<Arc<TypeSnapshot>> {
        (**self).modified_snapshot(scope, qualified_name)
    }
}

impl<T: SnapshotSource + ?Sized> SnapshotSource for Arc<T> {
    fn modified_snapshot(&self, scope: ScopeId, qualified_name: &str) -> Option<Arc<TypeSnapshot>> {
        (**self).modified_snapshot(scope, qualified_name)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
