//! Opaque external member handles.
//!
//! A handle is what a caller holds when it has a native reference to a
//! method (a reflective method object, a call-site target) and wants the
//! structural data currently backing it. The handle names the declaring
//! type by scope and qualified name, plus the member name and signature.

use std::fmt;

use crate::descriptor::{DescriptorError, MethodSignature};
use crate::scope::ScopeId;

/// Reference to a method, resolved against whatever shape is current.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MemberHandle {
    scope: ScopeId,
    declaring_type: Box<str>,
    name: Box<str>,
    signature: MethodSignature,
}

impl MemberHandle {
    pub fn new(scope: ScopeId, declaring_type: &str, name: &str, signature: MethodSignature) -> Self {
        MemberHandle {
            scope,
            declaring_type: declaring_type.into(),
            name: name.into(),
            signature,
        }
    }

    /// Build a handle from source-level parameter and return type names.
    pub fn from_source_names<S: AsRef<str>>(
        scope: ScopeId,
        declaring_type: &str,
        name: &str,
        params: &[S],
        ret: &str,
    ) -> Result<Self, DescriptorError> {
        let signature = MethodSignature::from_source_names(params, ret)?;
        Ok(MemberHandle::new(scope, declaring_type, name, signature))
    }

    /// Scope the declaring type was defined in.
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// Qualified name of the declaring type.
    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }
}

impl fmt::Display for MemberHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}.{}{}",
            self.declaring_type, self.scope, self.name, self.signature
        )
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
