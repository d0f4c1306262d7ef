//! The metadata store: registry, hierarchy resolution and the handle cache
//! wired together behind one publication path.
//!
//! # Lifecycle of a type
//!
//! ```text
//! observe(shape)         parsed entry, revision 0, invisible to resolution
//! redefine(.., diff)     modified entry, revision n + 1, handles re-resolve
//! replace_member(..)     modified entry swapped copy-on-write, same revision
//! ```
//!
//! # Thread Safety
//!
//! Reads never take the writer lock. Redefinitions and member replacements
//! are serialised per store by one writer mutex, so a diff is always merged
//! onto the snapshot that is current when the merge starts, and a replaced
//! member cannot be overwritten by a merge of an older base. Publication happens before cache
//! eviction: a handle resolved after `redefine` returns sees the new
//! snapshot.

use std::sync::Arc;

use parking_lot::Mutex;
use reclass_ir::{LinkedScopes, MemberHandle, MethodDescriptor, ScopeHierarchy, ScopeId};
use reclass_types::{
    HandleResolutionCache, HierarchyResolver, ParsedShape, StructuralDiff, TypeRegistry,
    TypeSnapshot,
};

use crate::{StoreConfig, StoreError};

/// Versioned metadata for every managed type in the process.
pub struct MetadataStore<H = LinkedScopes> {
    registry: Arc<TypeRegistry>,
    handles: HandleResolutionCache<Arc<TypeRegistry>>,
    hierarchy: H,
    config: StoreConfig,
    writer: Mutex<()>,
}

impl MetadataStore {
    /// Store with default configuration over linked scopes.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self::with_hierarchy(LinkedScopes, config)
    }

    /// Store configured from the process environment.
    pub fn from_env() -> Result<Self, StoreError> {
        Ok(Self::with_config(StoreConfig::from_env()?))
    }
}

impl Default for MetadataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ScopeHierarchy> MetadataStore<H> {
    /// Store walking scopes through a caller-supplied hierarchy.
    pub fn with_hierarchy(hierarchy: H, config: StoreConfig) -> Self {
        let registry = Arc::new(TypeRegistry::new());
        let handles =
            HandleResolutionCache::with_capacity(Arc::clone(&registry), config.handle_cache_capacity);
        MetadataStore {
            registry,
            handles,
            hierarchy,
            config,
            writer: Mutex::new(()),
        }
    }

    /// Record the first observed shape of a type.
    ///
    /// The snapshot becomes the base for later redefinitions. It is not
    /// visible to superclass or handle resolution until the type has been
    /// redefined at least once.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(scope = %shape.scope.id(), type_name = %shape.qualified_name)
    )]
    pub fn observe(&self, shape: ParsedShape) -> Arc<TypeSnapshot> {
        let snapshot = Arc::new(TypeSnapshot::build_from_parse(shape));
        self.registry.put_parsed(Arc::clone(&snapshot));
        snapshot
    }

    /// Merge a structural diff onto the current snapshot of a type and
    /// publish the result.
    #[tracing::instrument(level = "debug", skip(self, diff), fields(%scope))]
    pub fn redefine(
        &self,
        scope: ScopeId,
        name: &str,
        diff: &StructuralDiff,
    ) -> Result<Arc<TypeSnapshot>, StoreError> {
        let _writer = self.writer.lock();
        let base = self.base_snapshot(scope, name)?;
        Ok(self.publish(TypeSnapshot::build_from_diff(&base, diff)))
    }

    /// Redefine a type from a freshly parsed shape.
    ///
    /// The diff against the current snapshot is computed here; members
    /// missing from the new shape are merged as removed, not dropped.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(scope = %shape.scope.id(), type_name = %shape.qualified_name)
    )]
    pub fn redefine_shape(&self, shape: &ParsedShape) -> Result<Arc<TypeSnapshot>, StoreError> {
        let _writer = self.writer.lock();
        let base = self.base_snapshot(shape.scope.id(), &shape.qualified_name)?;
        let diff = StructuralDiff::between(&base, shape);
        tracing::debug!(
            added_methods = diff.added_methods().len(),
            removed_methods = diff.removed_methods().len(),
            added_fields = diff.added_fields().len(),
            removed_fields = diff.removed_fields().len(),
            "computed structural diff"
        );
        Ok(self.publish(TypeSnapshot::build_from_diff(&base, &diff)))
    }

    /// Substitute a single method body in the published snapshot of a type.
    ///
    /// Returns `None` when the type has no published modified snapshot.
    #[tracing::instrument(level = "debug", skip(self, method), fields(%scope))]
    pub fn replace_member(
        &self,
        scope: ScopeId,
        name: &str,
        method: impl Into<Arc<MethodDescriptor>>,
    ) -> Option<Arc<TypeSnapshot>> {
        let _writer = self.writer.lock();
        let next = self.registry.replace_member(scope, name, method)?;
        if self.config.evict_on_redefine {
            self.handles.invalidate_type(scope, name);
        }
        Some(next)
    }

    /// Current snapshot of a type, modified if redefined, parsed otherwise.
    pub fn snapshot(&self, scope: ScopeId, name: &str) -> Option<Arc<TypeSnapshot>> {
        self.registry.current(scope, name)
    }

    /// Resolve a member handle to the method descriptor currently backing it.
    #[tracing::instrument(level = "trace", skip_all, fields(%handle))]
    pub fn resolve_handle(&self, handle: &MemberHandle) -> Option<Arc<MethodDescriptor>> {
        self.handles.resolve(handle)
    }

    /// Find the snapshot of `snapshot`'s superclass along the scope chain.
    pub fn resolve_superclass(&self, snapshot: &TypeSnapshot) -> Option<Arc<TypeSnapshot>> {
        self.resolver().resolve_superclass(snapshot)
    }

    /// Hierarchy resolver over this store's registry and scope hierarchy.
    pub fn resolver(&self) -> HierarchyResolver<'_, H> {
        HierarchyResolver::new(&self.registry, &self.hierarchy)
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn handle_cache(&self) -> &HandleResolutionCache<Arc<TypeRegistry>> {
        &self.handles
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Drop metadata of every torn-down scope.
    ///
    /// Cached handle resolutions are cleared when anything was dropped,
    /// since handles only carry a scope id.
    pub fn purge_unreachable_scopes(&self) -> usize {
        let dropped = self.registry.purge_unreachable_scopes();
        if dropped > 0 {
            self.handles.clear();
        }
        dropped
    }

    fn base_snapshot(&self, scope: ScopeId, name: &str) -> Result<Arc<TypeSnapshot>, StoreError> {
        self.registry
            .current(scope, name)
            .ok_or_else(|| StoreError::UnknownType {
                scope,
                name: name.to_owned(),
            })
    }

    fn publish(&self, snapshot: TypeSnapshot) -> Arc<TypeSnapshot> {
        let snapshot = Arc::new(snapshot);
        self.registry.put(Arc::clone(&snapshot));
        if self.config.evict_on_redefine {
            self.handles
                .invalidate_type(snapshot.scope().id(), snapshot.qualified_name());
        }
        snapshot
    }
}

impl<H> std::fmt::Debug for MetadataStore<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataStore")
            .field("registry", &self.registry)
            .field("handles", &self.handles)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
