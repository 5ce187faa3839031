//! Registration table
//!
//! Static mapping from interactable type id to its objective token and
//! tracking behaviour. Written once at start-up, read afterwards.

use std::collections::HashMap;

use objectives_core::{InteractableTypeId, NetworkRole};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};

/// What kind of object an interactable is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractableKind {
    /// A single purchasable object (chest, lockbox)
    #[default]
    Chest,
    /// A group of terminals, any one of which uses up the whole group
    Multishop,
}

/// How instances of a type are discovered by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoverySource {
    /// Announced while the next level is populated, before the round starts
    #[default]
    Spawned,
    /// Found by searching the level after the round started
    StageScan,
}

/// Tracking behaviour, chosen once per registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingStrategy {
    /// Every handle counts and is completed on its own
    #[default]
    Individual,
    /// A handle stands for a group; completing any member completes it
    Grouped,
    /// Completions cannot be observed; the objective is shown for the round
    DisplayOnly,
}

impl TrackingStrategy {
    /// Pick the strategy for an interactable kind under a network role
    pub fn select(kind: InteractableKind, role: NetworkRole) -> Self {
        if !role.observes_completions() {
            return Self::DisplayOnly;
        }
        match kind {
            InteractableKind::Chest => Self::Individual,
            InteractableKind::Multishop => Self::Grouped,
        }
    }
}

/// A registered interactable type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Type identifier
    pub type_id: InteractableTypeId,
    /// Localization token of the objective text
    pub token: String,
    /// Object kind
    #[serde(default)]
    pub kind: InteractableKind,
    /// Discovery source
    #[serde(default)]
    pub discovery: DiscoverySource,
    /// Tracking behaviour
    #[serde(default)]
    pub strategy: TrackingStrategy,
}

impl Registration {
    /// Create a registration for a plain spawned chest
    pub fn new(type_id: impl Into<InteractableTypeId>, token: impl Into<String>) -> Self {
        Self {
            type_id: type_id.into(),
            token: token.into(),
            kind: InteractableKind::Chest,
            discovery: DiscoverySource::Spawned,
            strategy: TrackingStrategy::Individual,
        }
    }

    /// Set kind
    pub fn with_kind(mut self, kind: InteractableKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set discovery source
    pub fn with_discovery(mut self, discovery: DiscoverySource) -> Self {
        self.discovery = discovery;
        self
    }
}

/// Registration table, in registration order
#[derive(Debug, Default)]
pub struct RegistrationTable {
    entries: Vec<Registration>,
    index: HashMap<InteractableTypeId, usize>,
    frozen: bool,
}

impl RegistrationTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plain type id with its objective token
    pub fn register(
        &mut self,
        type_id: impl Into<InteractableTypeId>,
        token: impl Into<String>,
    ) -> Result<()> {
        self.register_with(Registration::new(type_id, token))
    }

    /// Register a full registration record
    pub fn register_with(&mut self, registration: Registration) -> Result<()> {
        if self.frozen {
            return Err(TrackerError::RegistrationFrozen(registration.type_id));
        }
        if self.index.contains_key(&registration.type_id) {
            return Err(TrackerError::DuplicateRegistration(registration.type_id));
        }

        log::debug!(
            "Registering interactable {} ({:?}, {:?})",
            registration.type_id,
            registration.kind,
            registration.strategy
        );
        self.index
            .insert(registration.type_id.clone(), self.entries.len());
        self.entries.push(registration);
        Ok(())
    }

    /// Look up the objective token of a type
    pub fn lookup(&self, type_id: &str) -> Result<&str> {
        self.get(type_id)
            .map(|r| r.token.as_str())
            .ok_or_else(|| TrackerError::UnknownType(type_id.into()))
    }

    /// Get a registration
    pub fn get(&self, type_id: &str) -> Option<&Registration> {
        self.index.get(type_id).map(|&i| &self.entries[i])
    }

    /// Check if a type is registered
    pub fn contains(&self, type_id: &str) -> bool {
        self.index.contains_key(type_id)
    }

    /// Position of a type in registration order
    pub fn position(&self, type_id: &str) -> Option<usize> {
        self.index.get(type_id).copied()
    }

    /// Iterate registrations in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Registration> {
        self.entries.iter()
    }

    /// Number of registrations
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Refuse any further registration
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Check if frozen
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}
