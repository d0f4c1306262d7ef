//! Store-level errors.
//!
//! Lookups report absence as `None`. Only operations whose inputs can be
//! wrong return an error.

use reclass_ir::ScopeId;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A redefinition named a type that was never observed in that scope.
    #[error("type `{name}` has not been observed in scope {scope}")]
    UnknownType { scope: ScopeId, name: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}
