//! Supertype resolution across the scope hierarchy.
//!
//! A type's superclass is named, not linked. To find its snapshot the
//! resolver asks the registry under the type's own defining scope, then
//! under each ancestor scope in turn:
//!
//! ```text
//! L0 (defining scope) -> L1 -> ... -> root -> (none: absent)
//! ```
//!
//! Only modified entries are consulted. A supertype that was parsed but
//! never structurally redefined under a scope is not found at that scope.

use std::sync::Arc;

use reclass_ir::{MethodDescriptor, ScopeHierarchy, ScopeId};
use rustc_hash::FxHashSet;

use crate::{TypeRegistry, TypeSnapshot};

/// Walks scopes upward to find supertype snapshots.
pub struct HierarchyResolver<'a, H: ScopeHierarchy + ?Sized> {
    registry: &'a TypeRegistry,
    hierarchy: &'a H,
}

impl<'a, H: ScopeHierarchy + ?Sized> HierarchyResolver<'a, H> {
    pub fn new(registry: &'a TypeRegistry, hierarchy: &'a H) -> Self {
        HierarchyResolver {
            registry,
            hierarchy,
        }
    }

    /// Find the snapshot of `snapshot`'s superclass.
    ///
    /// Returns `None` for a root type, and when no scope on the chain holds a
    /// modified entry for the superclass name. A torn-down scope ends the
    /// walk after its own entries have been checked.
    pub fn resolve_superclass(&self, snapshot: &TypeSnapshot) -> Option<Arc<TypeSnapshot>> {
        let superclass = snapshot.superclass_name()?;
        let mut scope = snapshot.scope().clone();
        loop {
            if let Some(found) = self.registry.get(scope.id(), superclass) {
                tracing::trace!(
                    type_name = snapshot.qualified_name(),
                    superclass,
                    found_in = %scope.id(),
                    "resolved superclass"
                );
                return Some(found);
            }
            scope = self.hierarchy.parent(&scope)?;
        }
    }

    /// Resolve supertypes repeatedly, nearest first.
    ///
    /// Stops at the first supertype that cannot be resolved, and on a cycle.
    pub fn superclass_chain(&self, snapshot: &TypeSnapshot) -> Vec<Arc<TypeSnapshot>> {
        let mut chain: Vec<Arc<TypeSnapshot>> = Vec::new();
        let mut seen: FxHashSet<(ScopeId, Box<str>)> = FxHashSet::default();
        seen.insert((snapshot.scope().id(), snapshot.qualified_name().into()));

        let mut next = self.resolve_superclass(snapshot);
        while let Some(current) = next {
            if !seen.insert((current.scope().id(), current.qualified_name().into())) {
                tracing::debug!(
                    type_name = current.qualified_name(),
                    "cycle in superclass chain"
                );
                break;
            }
            next = self.resolve_superclass(&current);
            chain.push(current);
        }
        chain
    }

    /// Look a method up on `snapshot`, then on each resolvable supertype.
    pub fn resolve_method(
        &self,
        snapshot: &TypeSnapshot,
        name: &str,
        signature: &str,
    ) -> Option<Arc<MethodDescriptor>> {
        if let Some(found) = snapshot.lookup(name, signature) {
            return Some(Arc::clone(found));
        }
        self.superclass_chain(snapshot)
            .iter()
            .find_map(|ancestor| ancestor.lookup(name, signature).cloned())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
