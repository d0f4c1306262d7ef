//! Reclass Types - versioned snapshots of managed types.
//!
//! A type's structure changes over the life of the process. Each change is
//! captured as a new immutable [`TypeSnapshot`], built off to the side and
//! then published to the [`TypeRegistry`] by swapping one `Arc` for another.
//!
//! # Architecture
//!
//! ```text
//! ParsedShape ──build_from_parse──> TypeSnapshot (revision 0)
//!                                        │
//! StructuralDiff ──build_from_diff──> TypeSnapshot (revision n + 1)
//!                                        │ put
//!                                        v
//!                                   TypeRegistry ──> HierarchyResolver
//!                                        │
//!                                        └─────────> HandleResolutionCache
//! ```
//!
//! Snapshots never change after publication. Readers that obtained a
//! snapshot keep a consistent view of it regardless of later redefinitions.

mod handle_cache;
mod hierarchy;
mod registry;
mod shape;
mod snapshot;

pub use handle_cache::HandleResolutionCache;
pub use hierarchy::HierarchyResolver;
pub use registry::{SnapshotSource, TypeRegistry};
pub use shape::{ParsedShape, StructuralDiff};
pub use snapshot::{MethodBucket, TypeSnapshot};
