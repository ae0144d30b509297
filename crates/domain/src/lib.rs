//! Domain model for the Eventdesk portal: permissions, access policy,
//! and the event resource.

#![forbid(unsafe_code)]

mod event;
mod permission;

pub use event::{EventRecord, FieldKind, FormField};
pub use permission::{AccessScope, AccessTier, Permission, PermissionSet};
