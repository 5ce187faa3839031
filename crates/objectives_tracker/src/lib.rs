//! Objectives Tracker - Interactable Objective Bookkeeping
//!
//! Tracks spawned interactables (chests, lockboxes, multishop terminals)
//! per round and reports which of them are still to be used, so a host can
//! show them as objectives.
//!
//! # Features
//!
//! - Registration table keyed by interactable type id
//! - Per-round spawn/completion counters with a reverse handle index
//! - Two-phase round tables tolerant of early spawn notifications
//! - Multishop groups and client-only display tracking
//! - Event router attachable to an `objectives_event::EventBus`
//! - TOML configuration of enabled objectives and network role
//!
//! # Example
//!
//! ```ignore
//! use objectives_tracker::prelude::*;
//!
//! let config = ObjectivesConfig::load(None)?;
//! let router = ObjectiveRouter::new(ObjectiveTracker::from_config(&config)?);
//!
//! router.on_spawned("lockbox", InstanceHandle::from_raw(1));
//! router.start_round();
//! for objective in router.collect_pending() {
//!     println!("{} ({}/{})", objective.display_token(),
//!         objective.completed_count, objective.total_spawned);
//! }
//! ```

pub mod collector;
pub mod config;
pub mod error;
pub mod registration;
pub mod router;
pub mod tracker;
pub mod tracking;

pub mod prelude {
    pub use crate::collector::{ObjectiveDescriptor, PLURAL_SUFFIX};
    pub use crate::config::{NetworkConfig, ObjectivesConfig};
    pub use crate::error::{Result, TrackerError};
    pub use crate::registration::{
        DiscoverySource, InteractableKind, Registration, RegistrationTable, TrackingStrategy,
    };
    pub use crate::router::{InteractableEvent, ObjectiveRouter, RouterSubscription};
    pub use crate::tracker::{CompletionOutcome, ObjectiveTracker, RoundSlot, SpawnOutcome};
    pub use crate::tracking::{TrackingState, TrackingTable};
    pub use objectives_core::prelude::*;
}

pub use prelude::*;
