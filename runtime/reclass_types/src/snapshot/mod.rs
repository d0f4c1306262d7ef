//! Point-in-time shape of one type.
//!
//! A `TypeSnapshot` is built once per structural event, either from a fresh
//! parse or by merging a structural diff onto the preceding snapshot, and is
//! read-only once published. Snapshots are shared as `Arc<TypeSnapshot>`;
//! descriptors inside are shared as `Arc` too, so a merge copies pointers,
//! not member data.
//!
//! # Member tables
//!
//! ```text
//! methods: name -> canonical signature -> bucket of MethodDescriptor
//! fields:  name -> FieldDescriptor
//! ```
//!
//! A bucket is a set: it never holds two equal descriptors, but it can hold
//! several unequal ones under the same key after a merge (for example two
//! owners contributing the same name and signature). Buckets are never empty.

use std::sync::Arc;

use reclass_ir::{internal_name, FieldDescriptor, MethodDescriptor, ScopeRef};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::{smallvec, SmallVec};

use crate::shape::{ParsedShape, StructuralDiff};

/// Descriptors sharing one (name, signature) key.
pub type MethodBucket = SmallVec<[Arc<MethodDescriptor>; 1]>;

type MethodTable = FxHashMap<Box<str>, FxHashMap<Box<str>, MethodBucket>>;

/// Full member shape of one type at one point in its redefinition history.
#[derive(Clone, Debug)]
pub struct TypeSnapshot {
    qualified_name: Box<str>,
    internal_name: Box<str>,
    scope: ScopeRef,
    superclass: Option<Box<str>>,
    methods: MethodTable,
    fields: FxHashMap<Box<str>, Arc<FieldDescriptor>>,
    structurally_modified: bool,
    revision: u32,
}

impl TypeSnapshot {
    fn empty(
        qualified_name: Box<str>,
        internal_name: Box<str>,
        scope: ScopeRef,
        superclass: Option<Box<str>>,
        structurally_modified: bool,
        revision: u32,
    ) -> Self {
        TypeSnapshot {
            qualified_name,
            internal_name,
            scope,
            superclass,
            methods: FxHashMap::default(),
            fields: FxHashMap::default(),
            structurally_modified,
            revision,
        }
    }

    /// Build the snapshot of a type's first observation.
    pub fn build_from_parse(shape: ParsedShape) -> Self {
        let internal = internal_name(&shape.qualified_name);
        let mut snapshot = TypeSnapshot::empty(
            shape.qualified_name.into_boxed_str(),
            internal.into_boxed_str(),
            shape.scope,
            shape.superclass.map(String::into_boxed_str),
            false,
            0,
        );
        for method in shape.methods {
            snapshot.add(method);
        }
        for field in shape.fields {
            snapshot.add_field_descriptor(field);
        }
        snapshot
    }

    /// Build the successor of `base` after a structural redefinition.
    ///
    /// The insertion order is fixed: retained methods, retained fields,
    /// removed fields, added fields, removed methods, added methods. Removed
    /// members are put back so references minted against `base` still
    /// resolve, and added members go in last so they join an existing bucket
    /// instead of displacing it.
    pub fn build_from_diff(base: &TypeSnapshot, diff: &StructuralDiff) -> Self {
        let mut next = TypeSnapshot::empty(
            base.qualified_name.clone(),
            base.internal_name.clone(),
            base.scope.clone(),
            base.superclass.clone(),
            true,
            base.revision.saturating_add(1),
        );

        let removed_methods: FxHashSet<&MethodDescriptor> =
            diff.removed_methods().iter().map(|m| &**m).collect();
        let removed_fields: FxHashSet<&FieldDescriptor> =
            diff.removed_fields().iter().map(|f| &**f).collect();

        // 1. retained methods
        for method in base.methods() {
            if !removed_methods.contains(&**method) {
                next.add(Arc::clone(method));
            }
        }
        // 2. retained fields
        for field in base.fields.values() {
            if !removed_fields.contains(&**field) {
                next.add_field_descriptor(Arc::clone(field));
            }
        }
        // 3. removed fields, kept resolvable
        for field in diff.removed_fields() {
            next.add_field_descriptor(Arc::clone(field));
        }
        // 4. added fields
        for field in diff.added_fields() {
            next.add_field_descriptor(Arc::clone(field));
        }
        // 5. removed methods, kept resolvable
        for method in diff.removed_methods() {
            next.add(Arc::clone(method));
        }
        // 6. added methods
        for method in diff.added_methods() {
            next.add(Arc::clone(method));
        }

        tracing::debug!(
            type_name = %next.qualified_name,
            revision = next.revision,
            methods = next.method_count(),
            fields = next.fields.len(),
            "merged structural diff"
        );
        next
    }

    /// Find a method by name and canonical signature.
    ///
    /// When the bucket holds several descriptors, which one is returned is
    /// unspecified.
    pub fn lookup(&self, name: &str, signature: &str) -> Option<&Arc<MethodDescriptor>> {
        self.methods.get(name)?.get(signature)?.first()
    }

    /// All descriptors under one (name, signature) key.
    pub fn bucket(&self, name: &str, signature: &str) -> Option<&[Arc<MethodDescriptor>]> {
        self.methods
            .get(name)?
            .get(signature)
            .map(|bucket| bucket.as_slice())
    }

    /// Iterate every method descriptor, in no particular order.
    pub fn methods(&self) -> impl Iterator<Item = &Arc<MethodDescriptor>> {
        self.methods
            .values()
            .flat_map(|signatures| signatures.values())
            .flat_map(|bucket| bucket.iter())
    }

    /// Iterate every field descriptor, in no particular order.
    pub fn fields(&self) -> impl Iterator<Item = &Arc<FieldDescriptor>> {
        self.fields.values()
    }

    /// Collect every method descriptor.
    pub fn all_members(&self) -> Vec<Arc<MethodDescriptor>> {
        self.methods().cloned().collect()
    }

    /// Collect every field descriptor.
    pub fn all_fields(&self) -> Vec<Arc<FieldDescriptor>> {
        self.fields.values().cloned().collect()
    }

    pub fn get_field_descriptor(&self, name: &str) -> Option<&Arc<FieldDescriptor>> {
        self.fields.get(name)
    }

    /// Insert a method, creating intermediate levels as needed.
    ///
    /// An equal descriptor already in the bucket is kept; unequal ones
    /// sharing the key coexist.
    pub fn add(&mut self, method: impl Into<Arc<MethodDescriptor>>) {
        let method = method.into();
        let bucket = self
            .methods
            .entry(method.name().into())
            .or_default()
            .entry(method.signature_key().into())
            .or_default();
        if !bucket.iter().any(|existing| **existing == *method) {
            bucket.push(method);
        }
    }

    /// Insert a method, discarding everything previously under its key.
    pub fn replace(&mut self, method: impl Into<Arc<MethodDescriptor>>) {
        let method = method.into();
        self.methods
            .entry(method.name().into())
            .or_default()
            .insert(method.signature_key().into(), smallvec![method]);
    }

    /// Copy-on-write form of [`replace`](Self::replace) for a published snapshot.
    #[must_use]
    pub fn with_replaced(&self, method: impl Into<Arc<MethodDescriptor>>) -> TypeSnapshot {
        let mut next = self.clone();
        next.replace(method);
        next
    }

    /// Insert or overwrite the field with this name.
    pub fn add_field_descriptor(&mut self, field: impl Into<Arc<FieldDescriptor>>) {
        let field = field.into();
        self.fields.insert(field.name().into(), field);
    }

    /// Dotted qualified name.
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// Slash-delimited internal name.
    pub fn internal_name(&self) -> &str {
        &self.internal_name
    }

    /// Weak reference to the defining scope.
    pub fn scope(&self) -> &ScopeRef {
        &self.scope
    }

    /// Qualified name of the superclass; `None` for a root type.
    pub fn superclass_name(&self) -> Option<&str> {
        self.superclass.as_deref()
    }

    /// True only for snapshots built by [`build_from_diff`](Self::build_from_diff).
    pub fn is_structurally_modified(&self) -> bool {
        self.structurally_modified
    }

    /// Number of structural redefinitions between this snapshot and the first parse.
    pub fn revision(&self) -> u32 {
        self.revision
    }

    pub fn method_count(&self) -> usize {
        self.methods().count()
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
