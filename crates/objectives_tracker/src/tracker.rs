//! Objective tracker
//!
//! Owns the registration table and two round tables. Spawn notifications
//! for the next level can arrive before the round-start notification, so
//! spawned instances accumulate in a pending table while the current one
//! is still rendered; at the round boundary the current table is discarded
//! and the pending one promoted.

use std::collections::HashSet;

use objectives_core::{InstanceHandle, InteractableTypeId, NetworkRole, TrackerContext};

use crate::error::{Result, TrackerError};
use crate::registration::{
    DiscoverySource, Registration, RegistrationTable, TrackingStrategy,
};
use crate::tracking::{TrackingState, TrackingTable};

/// Which round table an instance landed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoundSlot {
    /// The round being displayed
    Current,
    /// The next round, not yet promoted
    Pending,
}

/// Result of a spawn notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnOutcome {
    /// Instance is now tracked
    Tracked(RoundSlot),
    /// Type is not registered; ignored
    Unregistered,
    /// Type is disabled in the configuration; ignored
    Disabled,
    /// Handle is already tracked; ignored
    Duplicate,
}

impl SpawnOutcome {
    /// Whether the instance was tracked
    pub fn is_tracked(&self) -> bool {
        matches!(self, Self::Tracked(_))
    }
}

/// Result of a completion notification for a known handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Counted as completed
    Completed {
        type_id: InteractableTypeId,
        slot: RoundSlot,
    },
    /// The type's completions cannot be observed in this role; nothing changed
    Unobservable { type_id: InteractableTypeId },
}

/// Registry and two-phase round tracking
#[derive(Debug)]
pub struct ObjectiveTracker {
    context: TrackerContext,
    registrations: RegistrationTable,
    disabled: HashSet<InteractableTypeId>,
    current: TrackingTable,
    pending: TrackingTable,
    /// Set by `reset()` until the matching `promote_pending()`
    awaiting_promote: bool,
    round: u64,
}

impl ObjectiveTracker {
    /// Create a tracker for the given context
    pub fn new(context: TrackerContext) -> Self {
        if context.role == NetworkRole::Unknown {
            log::warn!("Network role unknown, tracking as host");
        }
        Self {
            context,
            registrations: RegistrationTable::new(),
            disabled: HashSet::new(),
            current: TrackingTable::new(),
            pending: TrackingTable::new(),
            awaiting_promote: false,
            round: 0,
        }
    }

    /// Get the context
    pub fn context(&self) -> TrackerContext {
        self.context
    }

    // ========== Registration ==========

    /// Register a plain spawned chest type
    pub fn register(
        &mut self,
        type_id: impl Into<InteractableTypeId>,
        token: impl Into<String>,
    ) -> Result<()> {
        self.register_with(Registration::new(type_id, token))
    }

    /// Register a type. Its strategy is selected here from its kind and the
    /// tracker's network role; any strategy set on the record is replaced.
    pub fn register_with(&mut self, mut registration: Registration) -> Result<()> {
        registration.strategy = TrackingStrategy::select(registration.kind, self.context.role);
        self.registrations.register_with(registration)
    }

    /// Refuse further registrations
    pub fn freeze(&mut self) {
        self.registrations.freeze();
    }

    /// Registration table
    pub fn registrations(&self) -> &RegistrationTable {
        &self.registrations
    }

    /// Objective token of a type
    pub fn lookup(&self, type_id: &str) -> Result<&str> {
        self.registrations.lookup(type_id)
    }

    /// Enable or disable tracking of a registered type.
    ///
    /// Takes effect for subsequent spawns; already tracked instances stay.
    pub fn set_enabled(&mut self, type_id: &str, enabled: bool) -> Result<()> {
        let registration = self
            .registrations
            .get(type_id)
            .ok_or_else(|| TrackerError::UnknownType(type_id.into()))?;
        if enabled {
            self.disabled.remove(type_id);
        } else {
            self.disabled.insert(registration.type_id.clone());
        }
        Ok(())
    }

    /// Whether a registered type is enabled
    pub fn is_enabled(&self, type_id: &str) -> bool {
        self.registrations.contains(type_id) && !self.disabled.contains(type_id)
    }

    // ========== Notifications ==========

    /// A new instance of a type appeared
    pub fn on_spawned(&mut self, type_id: &str, handle: InstanceHandle) -> SpawnOutcome {
        self.spawn(type_id, handle, &[])
    }

    /// A multishop group appeared. Completing any member completes the group.
    pub fn on_spawned_group(
        &mut self,
        type_id: &str,
        group: InstanceHandle,
        members: &[InstanceHandle],
    ) -> SpawnOutcome {
        self.spawn(type_id, group, members)
    }

    fn spawn(
        &mut self,
        type_id: &str,
        handle: InstanceHandle,
        members: &[InstanceHandle],
    ) -> SpawnOutcome {
        let Some(registration) = self.registrations.get(type_id) else {
            log::debug!("Ignoring spawn of untracked interactable {}", type_id);
            return SpawnOutcome::Unregistered;
        };
        if self.disabled.contains(type_id) {
            log::debug!("Ignoring spawn of disabled interactable {}", type_id);
            return SpawnOutcome::Disabled;
        }

        let known = |h: InstanceHandle| self.current.contains(h) || self.pending.contains(h);
        if known(handle) || members.iter().any(|m| known(*m)) {
            log::debug!("Duplicate spawn notification for {} ({})", handle, type_id);
            return SpawnOutcome::Duplicate;
        }

        // A level scanned between reset and promote belongs to the incoming round
        let slot = match registration.discovery {
            DiscoverySource::StageScan if !self.awaiting_promote => RoundSlot::Current,
            _ => RoundSlot::Pending,
        };
        let type_id = registration.type_id.clone();
        let table = match slot {
            RoundSlot::Current => &mut self.current,
            RoundSlot::Pending => &mut self.pending,
        };
        if members.is_empty() {
            table.insert(&type_id, handle);
        } else {
            table.insert_group(&type_id, handle, members);
        }

        log::info!("Tracking interactable {} as {} ({:?})", handle, type_id, slot);
        SpawnOutcome::Tracked(slot)
    }

    /// An instance was used up.
    ///
    /// Fails with the recoverable [`TrackerError::UnknownHandle`] when the
    /// handle is not live in either round, e.g. because its round was
    /// already discarded.
    pub fn on_completed(&mut self, handle: InstanceHandle) -> Result<CompletionOutcome> {
        let (slot, table) = if self.current.contains(handle) {
            (RoundSlot::Current, &mut self.current)
        } else if self.pending.contains(handle) {
            (RoundSlot::Pending, &mut self.pending)
        } else {
            log::debug!("Completion for untracked instance {}", handle);
            return Err(TrackerError::UnknownHandle(handle));
        };

        let strategy = table
            .owner(handle)
            .and_then(|type_id| self.registrations.get(type_id.as_str()))
            .map(|r| r.strategy)
            .unwrap_or_default();
        if strategy == TrackingStrategy::DisplayOnly {
            let type_id = table
                .owner(handle)
                .cloned()
                .ok_or(TrackerError::UnknownHandle(handle))?;
            return Ok(CompletionOutcome::Unobservable { type_id });
        }

        let type_id = table
            .complete(handle)
            .ok_or(TrackerError::UnknownHandle(handle))?;
        log::info!("Tracked interactable {} ({}) used", handle, type_id);
        Ok(CompletionOutcome::Completed { type_id, slot })
    }

    // ========== Round lifecycle ==========

    /// Discard the current round's tracking
    pub fn reset(&mut self) {
        log::debug!("Resetting tracked interactables for round {}", self.round);
        self.current.clear();
        self.awaiting_promote = true;
    }

    /// Make the pending table current and start a new pending one.
    ///
    /// Whatever is still in the current table is discarded.
    pub fn promote_pending(&mut self) {
        self.current = std::mem::take(&mut self.pending);
        self.awaiting_promote = false;
        self.round += 1;
        log::debug!("Promoted pending interactables to round {}", self.round);
    }

    /// Round boundary: reset then promote
    pub fn start_round(&mut self) {
        self.reset();
        self.promote_pending();
    }

    /// Number of promotions so far
    pub fn round(&self) -> u64 {
        self.round
    }

    /// Enabled stage-scan registrations, in registration order, that the
    /// host should search the level for after a round starts
    pub fn scan_targets(&self) -> Vec<&Registration> {
        self.registrations
            .iter()
            .filter(|r| r.discovery == DiscoverySource::StageScan)
            .filter(|r| !self.disabled.contains(&r.type_id))
            .collect()
    }

    // ========== Inspection ==========

    /// State of a type in the current round
    pub fn state(&self, type_id: &str) -> Option<&TrackingState> {
        self.current.state(type_id)
    }

    /// State of a type in the pending round
    pub fn pending_state(&self, type_id: &str) -> Option<&TrackingState> {
        self.pending.state(type_id)
    }

    /// Current round table
    pub fn current(&self) -> &TrackingTable {
        &self.current
    }

    /// Pending round table
    pub fn pending(&self) -> &TrackingTable {
        &self.pending
    }

    /// Check both tables' invariants
    pub fn check_invariants(&self) -> bool {
        self.current.check_invariants() && self.pending.check_invariants()
    }
}

impl Default for ObjectiveTracker {
    fn default() -> Self {
        Self::new(TrackerContext::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::InteractableKind;

    fn h(n: u64) -> InstanceHandle {
        InstanceHandle::from_raw(n)
    }

    fn host_tracker() -> ObjectiveTracker {
        let mut tracker = ObjectiveTracker::new(TrackerContext::host());
        tracker.register("lockbox", "LOCKBOX_OBJECTIVE").unwrap();
        tracker
            .register_with(
                Registration::new("free_chest", "FREE_CHEST_OBJECTIVE")
                    .with_kind(InteractableKind::Multishop),
            )
            .unwrap();
        tracker
            .register_with(
                Registration::new("gold_chest", "GOLD_CHEST_OBJECTIVE")
                    .with_discovery(DiscoverySource::StageScan),
            )
            .unwrap();
        tracker
    }

    #[test]
    fn test_spawn_lands_in_pending() {
        let mut tracker = host_tracker();

        assert_eq!(
            tracker.on_spawned("lockbox", h(1)),
            SpawnOutcome::Tracked(RoundSlot::Pending)
        );
        assert!(tracker.state("lockbox").is_none());
        assert_eq!(tracker.pending_state("lockbox").unwrap().total_spawned(), 1);

        tracker.promote_pending();
        assert_eq!(tracker.state("lockbox").unwrap().total_spawned(), 1);
        assert!(tracker.pending().is_empty());
        assert_eq!(tracker.round(), 1);
    }

    #[test]
    fn test_stage_scan_lands_in_current() {
        let mut tracker = host_tracker();
        tracker.start_round();

        assert_eq!(
            tracker.on_spawned("gold_chest", h(7)),
            SpawnOutcome::Tracked(RoundSlot::Current)
        );
        assert_eq!(tracker.state("gold_chest").unwrap().live_count(), 1);
    }

    #[test]
    fn test_stage_scan_after_reset_joins_next_round() {
        let mut tracker = host_tracker();
        tracker.on_spawned("lockbox", h(1));
        tracker.reset();

        assert_eq!(
            tracker.on_spawned("gold_chest", h(20)),
            SpawnOutcome::Tracked(RoundSlot::Pending)
        );
        tracker.promote_pending();
        assert_eq!(tracker.state("gold_chest").unwrap().live_count(), 1);
        assert_eq!(tracker.state("lockbox").unwrap().live_count(), 1);

        // Once promoted, scans land in the displayed round again
        assert_eq!(
            tracker.on_spawned("gold_chest", h(21)),
            SpawnOutcome::Tracked(RoundSlot::Current)
        );
        assert!(tracker.check_invariants());
    }

    #[test]
    fn test_unregistered_and_disabled_ignored() {
        let mut tracker = host_tracker();

        assert_eq!(tracker.on_spawned("barrel", h(1)), SpawnOutcome::Unregistered);

        tracker.set_enabled("lockbox", false).unwrap();
        assert_eq!(tracker.on_spawned("lockbox", h(2)), SpawnOutcome::Disabled);
        assert!(tracker.pending().is_empty());

        tracker.set_enabled("lockbox", true).unwrap();
        assert!(tracker.on_spawned("lockbox", h(2)).is_tracked());

        assert!(matches!(
            tracker.set_enabled("barrel", false),
            Err(TrackerError::UnknownType(_))
        ));
    }

    #[test]
    fn test_duplicate_across_tables() {
        let mut tracker = host_tracker();
        tracker.on_spawned("lockbox", h(1));
        tracker.promote_pending();

        assert_eq!(tracker.on_spawned("lockbox", h(1)), SpawnOutcome::Duplicate);
        assert!(tracker.pending().is_empty());
    }

    #[test]
    fn test_completion_in_pending_round() {
        let mut tracker = host_tracker();
        tracker.on_spawned("lockbox", h(1));

        let outcome = tracker.on_completed(h(1)).unwrap();
        assert_eq!(
            outcome,
            CompletionOutcome::Completed {
                type_id: "lockbox".into(),
                slot: RoundSlot::Pending
            }
        );
        assert_eq!(tracker.pending_state("lockbox").unwrap().completed(), 1);
    }

    #[test]
    fn test_multishop_member_completion() {
        let mut tracker = host_tracker();
        tracker.on_spawned_group("free_chest", h(10), &[h(11), h(12), h(13)]);
        tracker.promote_pending();

        assert!(tracker.on_completed(h(13)).is_ok());
        assert!(tracker.on_completed(h(11)).unwrap_err().is_recoverable());

        let state = tracker.state("free_chest").unwrap();
        assert_eq!((state.completed(), state.total_spawned()), (1, 1));
    }

    #[test]
    fn test_client_role_is_display_only() {
        let mut tracker = ObjectiveTracker::new(TrackerContext::client());
        tracker.register("lockbox", "LOCKBOX_OBJECTIVE").unwrap();
        assert_eq!(
            tracker.registrations().get("lockbox").unwrap().strategy,
            TrackingStrategy::DisplayOnly
        );

        tracker.on_spawned("lockbox", h(1));
        tracker.promote_pending();

        let outcome = tracker.on_completed(h(1)).unwrap();
        assert!(matches!(outcome, CompletionOutcome::Unobservable { .. }));
        let state = tracker.state("lockbox").unwrap();
        assert_eq!(state.completed(), 0);
        assert_eq!(state.live_count(), 1);
    }

    #[test]
    fn test_scan_targets_skip_disabled_only() {
        let mut tracker = ObjectiveTracker::new(TrackerContext::host());
        for id in ["gold_chest", "altar", "vault"] {
            tracker
                .register_with(
                    Registration::new(id, id.to_uppercase())
                        .with_discovery(DiscoverySource::StageScan),
                )
                .unwrap();
        }
        tracker.register("lockbox", "LOCKBOX_OBJECTIVE").unwrap();
        tracker.set_enabled("gold_chest", false).unwrap();

        let targets: Vec<_> = tracker
            .scan_targets()
            .iter()
            .map(|r| r.type_id.as_str())
            .collect();
        assert_eq!(targets, vec!["altar", "vault"]);
    }

    #[test]
    fn test_invariants_hold_through_round() {
        let mut tracker = host_tracker();
        for n in 1..=4 {
            tracker.on_spawned("lockbox", h(n));
            assert!(tracker.check_invariants());
        }
        tracker.start_round();
        tracker.on_completed(h(2)).unwrap();
        tracker.on_spawned("lockbox", h(9));
        assert!(tracker.check_invariants());
        tracker.start_round();
        assert!(tracker.check_invariants());
        assert_eq!(tracker.state("lockbox").unwrap().total_spawned(), 1);
    }
}
