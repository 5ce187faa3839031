//! Objective source collection
//!
//! Produces read-only snapshots of the incomplete objectives of the
//! current round for a renderer.

use std::borrow::Cow;

use objectives_core::InteractableTypeId;
use serde::{Deserialize, Serialize};

use crate::registration::TrackingStrategy;
use crate::tracker::ObjectiveTracker;

/// Suffix appended to an objective token when more than one instance exists.
///
/// `LOCKBOX_OBJECTIVE` reads "Open the Rusty Lockbox" while
/// `LOCKBOX_OBJECTIVE_PLURAL` reads "Open Rusty Lockboxes ({0}/{1})".
pub const PLURAL_SUFFIX: &str = "_PLURAL";

/// Snapshot of one incomplete objective
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectiveDescriptor {
    /// Interactable type
    pub type_id: InteractableTypeId,
    /// Instances used up this round
    pub completed_count: u32,
    /// Instances spawned this round
    pub total_spawned: u32,
    /// Objective token, singular form
    pub token: String,
    /// How the type is tracked
    #[serde(default)]
    pub strategy: TrackingStrategy,
}

impl ObjectiveDescriptor {
    /// Whether the counts mean anything to a reader.
    ///
    /// Display-only objectives never see completions, so a count would
    /// stay at zero for the whole round.
    pub fn shows_counts(&self) -> bool {
        self.strategy != TrackingStrategy::DisplayOnly
    }

    /// Token the renderer should localise: plural when more than one
    /// instance was spawned and counts are shown
    pub fn display_token(&self) -> Cow<'_, str> {
        if self.total_spawned > 1 && self.shows_counts() {
            Cow::Owned(format!("{}{}", self.token, PLURAL_SUFFIX))
        } else {
            Cow::Borrowed(&self.token)
        }
    }

    /// Instances still to be used up
    pub fn remaining(&self) -> u32 {
        self.total_spawned.saturating_sub(self.completed_count)
    }
}

impl ObjectiveTracker {
    /// Incomplete objectives of the current round, in registration order.
    ///
    /// Empty when nothing is pending.
    pub fn collect_pending(&self) -> Vec<ObjectiveDescriptor> {
        self.registrations()
            .iter()
            .filter_map(|registration| {
                let state = self.state(registration.type_id.as_str())?;
                (state.completed() < state.total_spawned()).then(|| ObjectiveDescriptor {
                    type_id: registration.type_id.clone(),
                    completed_count: state.completed(),
                    total_spawned: state.total_spawned(),
                    token: registration.token.clone(),
                    strategy: registration.strategy,
                })
            })
            .collect()
    }
}
