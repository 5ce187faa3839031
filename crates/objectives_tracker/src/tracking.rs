//! Per-round tracking tables
//!
//! A [`TrackingTable`] holds the counters and live instances of one round,
//! plus the reverse index used to resolve a completed handle to its type.

use std::collections::{HashMap, HashSet};

use objectives_core::{InstanceHandle, InteractableTypeId};

/// Tracking state of one interactable type within a round
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackingState {
    total_spawned: u32,
    completed: u32,
    live: HashSet<InstanceHandle>,
}

impl TrackingState {
    /// Number of instances spawned this round
    pub fn total_spawned(&self) -> u32 {
        self.total_spawned
    }

    /// Number of instances used up this round
    pub fn completed(&self) -> u32 {
        self.completed
    }

    /// Instances not yet used up
    pub fn live(&self) -> &HashSet<InstanceHandle> {
        &self.live
    }

    /// Number of live instances
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Whether every spawned instance has been used up
    pub fn is_complete(&self) -> bool {
        self.completed == self.total_spawned
    }

    /// `completed + |live| == total_spawned`
    pub fn is_consistent(&self) -> bool {
        self.completed as usize + self.live.len() == self.total_spawned as usize
    }
}

/// One round's worth of tracking
#[derive(Debug, Default)]
pub struct TrackingTable {
    states: HashMap<InteractableTypeId, TrackingState>,
    /// Tracked handle -> owning type
    owners: HashMap<InstanceHandle, InteractableTypeId>,
    /// Group member -> group handle
    aliases: HashMap<InstanceHandle, InstanceHandle>,
    /// Group handle -> members
    members: HashMap<InstanceHandle, Vec<InstanceHandle>>,
}

impl TrackingTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if nothing has been tracked
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Check if a handle is known, directly or as a group member
    pub fn contains(&self, handle: InstanceHandle) -> bool {
        self.owners.contains_key(&handle) || self.aliases.contains_key(&handle)
    }

    /// Get the state of a type
    pub fn state(&self, type_id: &str) -> Option<&TrackingState> {
        self.states.get(type_id)
    }

    /// Iterate all type states
    pub fn states(&self) -> impl Iterator<Item = (&InteractableTypeId, &TrackingState)> {
        self.states.iter()
    }

    /// Type that owns a handle
    pub fn owner(&self, handle: InstanceHandle) -> Option<&InteractableTypeId> {
        self.owners.get(&self.resolve(handle)?)
    }

    /// Resolve a handle to the tracked instance it belongs to
    pub fn resolve(&self, handle: InstanceHandle) -> Option<InstanceHandle> {
        if self.owners.contains_key(&handle) {
            Some(handle)
        } else {
            self.aliases.get(&handle).copied()
        }
    }

    /// Track a new instance. Returns false if the handle is already known.
    pub fn insert(&mut self, type_id: &InteractableTypeId, handle: InstanceHandle) -> bool {
        if self.contains(handle) {
            return false;
        }
        let state = self.states.entry(type_id.clone()).or_default();
        state.total_spawned += 1;
        state.live.insert(handle);
        self.owners.insert(handle, type_id.clone());
        true
    }

    /// Track a group as one instance, aliasing every member to it.
    ///
    /// Returns false, tracking nothing, if the group or any member is
    /// already known.
    pub fn insert_group(
        &mut self,
        type_id: &InteractableTypeId,
        group: InstanceHandle,
        members: &[InstanceHandle],
    ) -> bool {
        if self.contains(group) || members.iter().any(|m| self.contains(*m)) {
            return false;
        }
        self.insert(type_id, group);

        let members: Vec<_> = members.iter().copied().filter(|m| *m != group).collect();
        for member in &members {
            self.aliases.insert(*member, group);
        }
        if !members.is_empty() {
            self.members.insert(group, members);
        }
        true
    }

    /// Mark the instance a handle resolves to as used up.
    ///
    /// Returns the owning type, or `None` if the handle is not live here.
    pub fn complete(&mut self, handle: InstanceHandle) -> Option<InteractableTypeId> {
        let tracked = self.resolve(handle)?;
        let type_id = self.owners.remove(&tracked)?;

        if let Some(members) = self.members.remove(&tracked) {
            for member in members {
                self.aliases.remove(&member);
            }
        }

        if let Some(state) = self.states.get_mut(&type_id) {
            state.live.remove(&tracked);
            state.completed += 1;
        }
        Some(type_id)
    }

    /// Drop everything
    pub fn clear(&mut self) {
        self.states.clear();
        self.owners.clear();
        self.aliases.clear();
        self.members.clear();
    }

    /// Check the counting invariant and the reverse index together
    pub fn check_invariants(&self) -> bool {
        let counts_hold = self.states.values().all(TrackingState::is_consistent);
        let live_total: usize = self.states.values().map(TrackingState::live_count).sum();
        let index_matches = live_total == self.owners.len()
            && self.owners.iter().all(|(handle, type_id)| {
                self.states
                    .get(type_id)
                    .map(|s| s.live.contains(handle))
                    .unwrap_or(false)
            });
        let aliases_resolve = self
            .aliases
            .values()
            .all(|group| self.owners.contains_key(group));
        counts_hold && index_matches && aliases_resolve
    }
}
