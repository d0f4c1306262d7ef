//! Inputs to snapshot construction.
//!
//! `ParsedShape` is what the external parser hands over for a type it has
//! just read. `StructuralDiff` is what the redefinition pipeline hands over
//! for each structural event: descriptors, not names, because overload
//! identity needs both name and signature.

use std::sync::Arc;

use reclass_ir::{internal_name, FieldDescriptor, MethodDescriptor, ScopeRef};
use rustc_hash::FxHashSet;

use crate::TypeSnapshot;

/// A type's full shape as read by the parser.
#[derive(Clone, Debug)]
pub struct ParsedShape {
    /// Dotted qualified name.
    pub qualified_name: String,

    /// Defining scope.
    pub scope: ScopeRef,

    /// Qualified superclass name; `None` for a root type.
    pub superclass: Option<String>,

    /// Every declared method.
    pub methods: Vec<MethodDescriptor>,

    /// Every declared field.
    pub fields: Vec<FieldDescriptor>,
}

impl ParsedShape {
    /// Create a shape with no superclass and no members.
    pub fn new(qualified_name: &str, scope: ScopeRef) -> Self {
        ParsedShape {
            qualified_name: qualified_name.to_owned(),
            scope,
            superclass: None,
            methods: Vec::new(),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_superclass(mut self, superclass: &str) -> Self {
        self.superclass = Some(superclass.to_owned());
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    #[must_use]
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Slash-delimited form of the qualified name.
    pub fn internal_name(&self) -> String {
        internal_name(&self.qualified_name)
    }
}

/// Members added and removed by one structural redefinition.
#[derive(Clone, Debug, Default)]
pub struct StructuralDiff {
    added_methods: Vec<Arc<MethodDescriptor>>,
    removed_methods: Vec<Arc<MethodDescriptor>>,
    added_fields: Vec<Arc<FieldDescriptor>>,
    removed_fields: Vec<Arc<FieldDescriptor>>,
}

impl StructuralDiff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the delta that turns `base` into the freshly parsed `shape`.
    ///
    /// Members of `base` missing from `shape` are removed; members of `shape`
    /// missing from `base` are added. Descriptors that appear in both are
    /// left out of the diff and retained by the merge.
    pub fn between(base: &TypeSnapshot, shape: &ParsedShape) -> Self {
        let mut diff = StructuralDiff::new();

        let base_methods: FxHashSet<&MethodDescriptor> = base.methods().map(|m| &**m).collect();
        let shape_methods: FxHashSet<&MethodDescriptor> = shape.methods.iter().collect();
        for method in &shape.methods {
            if !base_methods.contains(method) {
                diff.added_methods.push(Arc::new(method.clone()));
            }
        }
        for method in base.methods() {
            if !shape_methods.contains(&**method) {
                diff.removed_methods.push(Arc::clone(method));
            }
        }

        let shape_fields: FxHashSet<&FieldDescriptor> = shape.fields.iter().collect();
        for field in &shape.fields {
            let unchanged = base
                .get_field_descriptor(field.name())
                .is_some_and(|existing| **existing == *field);
            if !unchanged {
                diff.added_fields.push(Arc::new(field.clone()));
            }
        }
        for field in base.fields() {
            if !shape_fields.contains(&**field) {
                diff.removed_fields.push(Arc::clone(field));
            }
        }

        diff
    }

    #[must_use]
    pub fn add_method(mut self, method: impl Into<Arc<MethodDescriptor>>) -> Self {
        self.added_methods.push(method.into());
        self
    }

    #[must_use]
    pub fn remove_method(mut self, method: impl Into<Arc<MethodDescriptor>>) -> Self {
        self.removed_methods.push(method.into());
        self
    }

    #[must_use]
    pub fn add_field(mut self, field: impl Into<Arc<FieldDescriptor>>) -> Self {
        self.added_fields.push(field.into());
        self
    }

    #[must_use]
    pub fn remove_field(mut self, field: impl Into<Arc<FieldDescriptor>>) -> Self {
        self.removed_fields.push(field.into());
        self
    }

    pub fn added_methods(&self) -> &[Arc<MethodDescriptor>] {
        &self.added_methods
    }

    pub fn removed_methods(&self) -> &[Arc<MethodDescriptor>] {
        &self.removed_methods
    }

    pub fn added_fields(&self) -> &[Arc<FieldDescriptor>] {
        &self.added_fields
    }

    pub fn removed_fields(&self) -> &[Arc<FieldDescriptor>] {
        &self.removed_fields
    }

    /// True when the redefinition changes no member.
    pub fn is_empty(&self) -> bool {
        self.added_methods.is_empty()
            && self.removed_methods.is_empty()
            && self.added_fields.is_empty()
            && self.removed_fields.is_empty()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
