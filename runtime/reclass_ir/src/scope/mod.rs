//! Defining scopes and non-owning references to them.
//!
//! A scope is the loading context a type belongs to. Scopes are owned by the
//! runtime, which shares them as `Arc<Scope>`; a scope holds its parent
//! strongly, so a live child keeps its ancestors alive.
//!
//! Metadata never owns a scope. A `TypeSnapshot` stores a [`ScopeRef`]: the
//! scope's id (always available, used as a registry key) plus a weak pointer
//! that is upgraded, with an explicit liveness check, only when the hierarchy
//! needs to be walked.
//!
//! ```text
//! Arc<Scope L0> --parent--> Arc<Scope L1> --parent--> Arc<Scope root>
//!      ^
//!      | Weak (ScopeRef)
//! TypeSnapshot
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Weak};

/// Process-unique scope identifier.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct ScopeId(u32);

/// Next id handed out by `ScopeId::fresh`. Zero is never allocated.
static NEXT_SCOPE_ID: AtomicU32 = AtomicU32::new(1);

impl ScopeId {
    /// Allocate a new, never before seen id.
    pub fn fresh() -> Self {
        ScopeId(NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Create from raw u32 value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        ScopeId(raw)
    }

    /// Get raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScopeId({})", self.0)
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A defining scope, owned by the runtime.
#[derive(Debug)]
pub struct Scope {
    id: ScopeId,
    label: Box<str>,
    parent: Option<Arc<Scope>>,
}

impl Scope {
    /// Create a scope with no parent.
    pub fn root(label: &str) -> Arc<Scope> {
        Arc::new(Scope {
            id: ScopeId::fresh(),
            label: label.into(),
            parent: None,
        })
    }

    /// Create a scope whose parent is `parent`.
    pub fn child(parent: &Arc<Scope>, label: &str) -> Arc<Scope> {
        Arc::new(Scope {
            id: ScopeId::fresh(),
            label: label.into(),
            parent: Some(Arc::clone(parent)),
        })
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    /// Human-readable label, for diagnostics only.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn parent(&self) -> Option<&Arc<Scope>> {
        self.parent.as_ref()
    }
}

/// Non-owning reference to a [`Scope`].
///
/// The id survives scope teardown; the scope itself may not.
#[derive(Clone, Debug)]
pub struct ScopeRef {
    id: ScopeId,
    scope: Weak<Scope>,
}

impl ScopeRef {
    /// Take a weak reference to a live scope.
    pub fn new(scope: &Arc<Scope>) -> Self {
        ScopeRef {
            id: scope.id,
            scope: Arc::downgrade(scope),
        }
    }

    /// A reference that names a scope id but can never be upgraded.
    ///
    /// Used for scopes this process never held, and behaves exactly like a
    /// reference whose scope has been torn down.
    pub fn detached(id: ScopeId) -> Self {
        ScopeRef {
            id,
            scope: Weak::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> ScopeId {
        self.id
    }

    /// Upgrade to the scope, or `None` if it has been torn down.
    pub fn upgrade(&self) -> Option<Arc<Scope>> {
        self.scope.upgrade()
    }

    /// Check whether the scope is still alive.
    pub fn is_live(&self) -> bool {
        self.scope.strong_count() > 0
    }
}

impl PartialEq for ScopeRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ScopeRef {}

impl From<&Arc<Scope>> for ScopeRef {
    fn from(scope: &Arc<Scope>) -> Self {
        ScopeRef::new(scope)
    }
}

/// Provides the parent of a scope.
///
/// Returning `None` ends a hierarchy walk. Implementations must answer
/// `None`, not panic, for a scope that has been torn down.
pub trait ScopeHierarchy: Send + Sync {
    fn parent(&self, scope: &ScopeRef) -> Option<ScopeRef>;
}

/// Follows the parent links stored on [`Scope`] itself.
#[derive(Copy, Clone, Debug, Default)]
pub struct LinkedScopes;

impl ScopeHierarchy for LinkedScopes {
    fn parent(&self, scope: &ScopeRef) -> Option<ScopeRef> {
        let live = scope.upgrade()?;
        live.parent().map(ScopeRef::new)
    }
}

impl<H: ScopeHierarchy + ?Sized> ScopeHierarchy for Arc<H> {
    fn parent(&self, scope: &ScopeRef) -> Option<ScopeRef> {
        (**self).parent(scope)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
