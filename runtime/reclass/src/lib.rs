//! Reclass - a concurrent, versioned type-metadata store.
//!
//! Tracks what each managed type looks like across successive in-place
//! redefinitions, and resolves member references minted against any of its
//! shapes to the member currently backing them.
//!
//! # Crates
//!
//! - `reclass_ir`: descriptors, signatures, scopes and member handles
//! - `reclass_types`: snapshots, the registry, hierarchy resolution and the
//!   handle cache
//! - `reclass` (this crate): the [`MetadataStore`] facade, configuration and
//!   tracing setup
//!
//! # Example
//!
//! ```
//! use reclass::{MetadataStore, MethodDescriptor, MethodSignature, ParsedShape, Scope, ScopeRef,
//!               StructuralDiff};
//!
//! let store = MetadataStore::new();
//! let scope = Scope::root("app");
//! let run = MethodDescriptor::new("run", MethodSignature::parse("()V").unwrap(), "com.acme.Job");
//! store.observe(ParsedShape::new("com.acme.Job", ScopeRef::new(&scope)).with_method(run));
//!
//! let stop = MethodDescriptor::new("stop", MethodSignature::parse("()V").unwrap(), "com.acme.Job");
//! let diff = StructuralDiff::new().add_method(stop);
//! let current = store.redefine(scope.id(), "com.acme.Job", &diff).unwrap();
//! assert!(current.lookup("stop", "()V").is_some());
//! assert!(current.lookup("run", "()V").is_some());
//! ```

mod config;
mod error;
mod store;

use std::sync::Once;

pub use config::{
    ConfigError, StoreConfig, DEFAULT_HANDLE_CACHE_CAPACITY, EVICT_ON_REDEFINE_VAR,
    HANDLE_CACHE_CAPACITY_VAR,
};
pub use error::StoreError;
pub use store::MetadataStore;

pub use reclass_ir::{
    internal_name, BodyToken, DescriptorError, FieldDescriptor, LinkedScopes, MemberHandle,
    MethodDescriptor, MethodSignature, Modifiers, Primitive, Scope, ScopeHierarchy, ScopeId,
    ScopeRef, TypeDesc,
};
pub use reclass_types::{
    HandleResolutionCache, HierarchyResolver, MethodBucket, ParsedShape, SnapshotSource,
    StructuralDiff, TypeRegistry, TypeSnapshot,
};

/// Environment variable selecting the indented tree log format.
pub const LOG_TREE_VAR: &str = "RECLASS_LOG_TREE";

static TRACING_INIT: Once = Once::new();

/// Initialize tracing subscriber for debug output.
///
/// Call once at startup. Controlled by `RUST_LOG`, e.g.
/// `RUST_LOG=reclass_types=debug`. Does nothing when `RUST_LOG` is unset.
/// With `RECLASS_LOG_TREE` set, spans are rendered as an indented tree.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let filter = EnvFilter::from_default_env();
        let tree = std::env::var(LOG_TREE_VAR).is_ok();
        let tree_layer = tree.then(|| {
            tracing_tree::HierarchicalLayer::new(2)
                .with_targets(true)
                .with_bracketed_fields(true)
        });
        let fmt_layer = (!tree).then(|| fmt::layer().with_target(true).with_level(true));
        // A subscriber installed by the host wins.
        if let Err(e) = tracing_subscriber::registry()
            .with(tree_layer)
            .with(fmt_layer)
            .with(filter)
            .try_init()
        {
            tracing::debug!(%e, "global subscriber already installed");
        }
    });
}
