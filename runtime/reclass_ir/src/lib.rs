//! Reclass IR - value types shared by every layer of the metadata store.
//!
//! This crate contains the leaf data structures:
//! - Canonical type and method descriptors (`TypeDesc`, `MethodSignature`)
//! - Member descriptors (`MethodDescriptor`, `FieldDescriptor`)
//! - Defining scopes and weak references to them (`Scope`, `ScopeRef`)
//! - Opaque member handles (`MemberHandle`)
//!
//! # Design Philosophy
//!
//! - **Values, not identities**: descriptors compare by their identity key
//!   (name, signature, owner), never by address. The same member re-observed
//!   in a later shape is a new value that compares equal.
//! - **Methods and fields are separate**: their keys differ (methods are
//!   signature-qualified, fields are name-only), so there is no unified
//!   member enum.
//! - **Scopes are borrowed, never owned**: the runtime owns scope lifetime.

pub mod descriptor;
pub mod handle;
pub mod member;
pub mod scope;

pub use descriptor::{internal_name, DescriptorError, MethodSignature, Primitive, TypeDesc};
pub use handle::MemberHandle;
pub use member::{BodyToken, FieldDescriptor, MethodDescriptor, Modifiers};
pub use scope::{LinkedScopes, Scope, ScopeHierarchy, ScopeId, ScopeRef};
