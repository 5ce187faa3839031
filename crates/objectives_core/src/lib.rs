//! # objectives_core - Objective Tracking Primitives
//!
//! Small, dependency-free building blocks shared by every objectives crate:
//! - **Identifiers**: interactable type ids and instance handles
//! - **Context**: the network role a tracker runs under, passed explicitly
//!   at construction instead of living in a process-wide flag
//!
//! The optional `serde` feature derives serialization for the identifiers.

pub mod context;
pub mod id;

pub use context::*;
pub use id::*;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::context::{NetworkRole, TrackerContext};
    pub use crate::id::{HandleAllocator, InstanceHandle, InteractableTypeId};
}
