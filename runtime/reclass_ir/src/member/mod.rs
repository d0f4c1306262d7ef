//! Member descriptors: immutable value records for methods and fields.
//!
//! Methods and fields are kept as two separate descriptor types because their
//! identity rules differ: a method is identified by name plus signature (it
//! has an overload axis), a field by name alone within its owner.
//!
//! # Equality
//!
//! Equality is structural, not by identity. The same logical member observed
//! in two successive shapes yields two distinct values that compare equal.
//! Modifiers and body tokens are deliberately outside the identity key.

use std::fmt;
use std::hash::{Hash, Hasher};

use bitflags::bitflags;

use crate::descriptor::{MethodSignature, TypeDesc};

bitflags! {
    /// Access and property modifiers of a member.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct Modifiers: u16 {
        const PUBLIC = 1 << 0;
        const PRIVATE = 1 << 1;
        const PROTECTED = 1 << 2;
        const STATIC = 1 << 3;
        const FINAL = 1 << 4;
        const SYNCHRONIZED = 1 << 5;
        const VOLATILE = 1 << 6;
        const TRANSIENT = 1 << 7;
        const NATIVE = 1 << 8;
        const ABSTRACT = 1 << 10;
        const SYNTHETIC = 1 << 12;
    }
}

impl Modifiers {
    /// Check whether the member is static.
    #[inline]
    pub fn is_static(self) -> bool {
        self.contains(Modifiers::STATIC)
    }
}

/// Opaque location of a method body, meaningful only to the collaborator that minted it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BodyToken(u64);

impl BodyToken {
    /// Wrap a raw token value.
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        BodyToken(raw)
    }

    /// Get the raw token value.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// One method of one type, as observed in one shape.
#[derive(Clone, Debug)]
pub struct MethodDescriptor {
    name: Box<str>,
    signature: MethodSignature,
    owner: Box<str>,
    modifiers: Modifiers,
    body: Option<BodyToken>,
}

impl MethodDescriptor {
    /// Create a descriptor with no modifiers and no body token.
    pub fn new(name: &str, signature: MethodSignature, owner: &str) -> Self {
        MethodDescriptor {
            name: name.into(),
            signature,
            owner: owner.into(),
            modifiers: Modifiers::empty(),
            body: None,
        }
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: BodyToken) -> Self {
        self.body = Some(body);
        self
    }

    /// Method name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full signature.
    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    /// Canonical signature string, the second level of the method table key.
    pub fn signature_key(&self) -> &str {
        self.signature.canonical()
    }

    /// Qualified name of the owning type.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn body(&self) -> Option<BodyToken> {
        self.body
    }
}

impl PartialEq for MethodDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.signature == other.signature && self.owner == other.owner
    }
}

impl Eq for MethodDescriptor {}

impl Hash for MethodDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.signature.hash(state);
        self.owner.hash(state);
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}{}", self.owner, self.name, self.signature)
    }
}

/// One field of one type, as observed in one shape.
#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    name: Box<str>,
    field_type: TypeDesc,
    owner: Box<str>,
    modifiers: Modifiers,
}

impl FieldDescriptor {
    /// Create a descriptor with no modifiers.
    pub fn new(name: &str, field_type: TypeDesc, owner: &str) -> Self {
        FieldDescriptor {
            name: name.into(),
            field_type,
            owner: owner.into(),
            modifiers: Modifiers::empty(),
        }
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Field name, the only key of the field table.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type.
    pub fn field_type(&self) -> &TypeDesc {
        &self.field_type
    }

    /// Qualified name of the owning type.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }
}

impl PartialEq for FieldDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.field_type == other.field_type && self.owner == other.owner
    }
}

impl Eq for FieldDescriptor {}

impl Hash for FieldDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.field_type.hash(state);
        self.owner.hash(state);
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}:{}", self.owner, self.name, self.field_type)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
