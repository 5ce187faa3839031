//! Recorded session scripts
//!
//! ```json
//! {
//!   "rounds": [
//!     {
//!       "name": "stage 1",
//!       "events": [
//!         { "event": "round_reset" },
//!         { "event": "spawned", "type_id": "lockbox", "handle": 1 },
//!         { "event": "round_populated" },
//!         { "event": "completed", "handle": 1 }
//!       ]
//!     }
//!   ]
//! }
//! ```

use std::path::Path;

use objectives_event::EventBus;
use objectives_tracker::{InteractableEvent, ObjectiveDescriptor, ObjectiveRouter};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Replay errors
#[derive(Debug, Error)]
pub enum ReplayError {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed session script
    #[error("Invalid session script: {0}")]
    Script(#[from] serde_json::Error),
    /// Tracker setup error
    #[error("Tracker error: {0}")]
    Tracker(#[from] objectives_tracker::TrackerError),
}

/// One recorded round
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoundScript {
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Notifications in delivery order
    pub events: Vec<InteractableEvent>,
}

/// A recorded session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionScript {
    pub rounds: Vec<RoundScript>,
}

impl SessionScript {
    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse JSON
    pub fn from_json(content: &str) -> Result<Self, ReplayError> {
        Ok(serde_json::from_str(content)?)
    }
}

/// Objective panel after one round
#[derive(Debug, Clone, Serialize)]
pub struct RoundReport {
    pub name: String,
    pub objectives: Vec<ObjectiveDescriptor>,
}

/// Feed every round through the bus into the router, snapshotting the
/// objective panel after each
pub fn replay(script: &SessionScript, router: &ObjectiveRouter) -> Vec<RoundReport> {
    let mut bus = EventBus::new();
    let subscription = router.attach(&mut bus);

    let reports = script
        .rounds
        .iter()
        .enumerate()
        .map(|(i, round)| {
            for event in &round.events {
                bus.publish(event.clone());
            }
            let delivered = bus.process();
            let name = round
                .name
                .clone()
                .unwrap_or_else(|| format!("round {}", i + 1));
            log::debug!("Replayed {} events for {}", delivered, name);

            RoundReport {
                name,
                objectives: router.collect_pending(),
            }
        })
        .collect();

    router.detach(&mut bus, subscription);
    reports
}

/// Render a panel line the way the objective text reads
pub fn format_objective(objective: &ObjectiveDescriptor) -> String {
    if objective.total_spawned > 1 && objective.shows_counts() {
        format!(
            "{} ({}/{})",
            objective.display_token(),
            objective.completed_count,
            objective.total_spawned
        )
    } else {
        objective.display_token().into_owned()
    }
}
