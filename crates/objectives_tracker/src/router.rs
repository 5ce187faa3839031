//! Event router
//!
//! Single entry point translating host notifications into tracker calls.
//! The router shares the tracker behind a mutex so it can be wired onto an
//! [`EventBus`] and still be queried by the renderer; every operation is
//! serialised through that lock.

use std::sync::Arc;

use objectives_core::{InstanceHandle, InteractableTypeId};
use objectives_event::{EventBus, SubscriberId};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::collector::ObjectiveDescriptor;
use crate::tracker::{CompletionOutcome, ObjectiveTracker, SpawnOutcome};

/// Notifications a host can deliver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InteractableEvent {
    /// A new instance of a type appeared
    Spawned {
        type_id: InteractableTypeId,
        handle: InstanceHandle,
    },
    /// A multishop group appeared
    GroupSpawned {
        type_id: InteractableTypeId,
        group: InstanceHandle,
        members: Vec<InstanceHandle>,
    },
    /// An instance was used up
    Completed { handle: InstanceHandle },
    /// The previous round's tracking should be discarded
    RoundReset,
    /// All initial spawns of the new round were delivered
    RoundPopulated,
    /// Round boundary: reset and promote in one step
    RoundStarted,
}

/// Subscription created by [`ObjectiveRouter::attach`]
#[must_use = "dropping the subscription leaves the router attached with no way to detach it"]
#[derive(Debug)]
pub struct RouterSubscription {
    id: SubscriberId,
}

/// Routes notifications into a shared tracker
#[derive(Clone)]
pub struct ObjectiveRouter {
    tracker: Arc<Mutex<ObjectiveTracker>>,
}

impl ObjectiveRouter {
    /// Create a router owning the tracker
    pub fn new(tracker: ObjectiveTracker) -> Self {
        Self {
            tracker: Arc::new(Mutex::new(tracker)),
        }
    }

    /// Run a closure with exclusive access to the tracker
    pub fn with_tracker<R>(&self, f: impl FnOnce(&mut ObjectiveTracker) -> R) -> R {
        f(&mut self.tracker.lock())
    }

    /// Deliver one notification
    pub fn dispatch(&self, event: &InteractableEvent) {
        match event {
            InteractableEvent::Spawned { type_id, handle } => {
                self.on_spawned(type_id.as_str(), *handle);
            }
            InteractableEvent::GroupSpawned {
                type_id,
                group,
                members,
            } => {
                self.tracker
                    .lock()
                    .on_spawned_group(type_id.as_str(), *group, members);
            }
            InteractableEvent::Completed { handle } => {
                self.on_completed(*handle);
            }
            InteractableEvent::RoundReset => self.reset(),
            InteractableEvent::RoundPopulated => self.promote_pending(),
            InteractableEvent::RoundStarted => self.start_round(),
        }
    }

    /// Spawn source entry point
    pub fn on_spawned(&self, type_id: &str, handle: InstanceHandle) -> SpawnOutcome {
        self.tracker.lock().on_spawned(type_id, handle)
    }

    /// Completion source entry point. Unknown handles are logged and ignored.
    pub fn on_completed(&self, handle: InstanceHandle) -> Option<CompletionOutcome> {
        match self.tracker.lock().on_completed(handle) {
            Ok(outcome) => Some(outcome),
            Err(e) if e.is_recoverable() => {
                log::debug!("Ignoring completion: {}", e);
                None
            }
            Err(e) => {
                log::error!("Completion failed: {}", e);
                None
            }
        }
    }

    /// Round boundary: discard the current round
    pub fn reset(&self) {
        self.tracker.lock().reset();
    }

    /// Round boundary: promote the pending round
    pub fn promote_pending(&self) {
        self.tracker.lock().promote_pending();
    }

    /// Round boundary: reset and promote
    pub fn start_round(&self) {
        self.tracker.lock().start_round();
    }

    /// Renderer entry point: snapshot of incomplete objectives
    pub fn collect_pending(&self) -> Vec<ObjectiveDescriptor> {
        self.tracker.lock().collect_pending()
    }

    /// Subscribe this router to [`InteractableEvent`]s on a bus
    pub fn attach(&self, bus: &mut EventBus) -> RouterSubscription {
        let router = self.clone();
        let id = bus.subscribe(move |event: &InteractableEvent| router.dispatch(event));
        log::debug!("Objective router attached ({:?})", id);
        RouterSubscription { id }
    }

    /// Remove a subscription created by [`attach`](Self::attach)
    pub fn detach(&self, bus: &mut EventBus, subscription: RouterSubscription) {
        bus.unsubscribe(subscription.id);
        log::debug!("Objective router detached ({:?})", subscription.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use objectives_core::TrackerContext;

    fn h(n: u64) -> InstanceHandle {
        InstanceHandle::from_raw(n)
    }

    fn router() -> ObjectiveRouter {
        let mut tracker = ObjectiveTracker::new(TrackerContext::host());
        tracker.register("lockbox", "LOCKBOX_OBJECTIVE").unwrap();
        ObjectiveRouter::new(tracker)
    }

    #[test]
    fn test_dispatch_round() {
        let router = router();
        router.dispatch(&InteractableEvent::Spawned {
            type_id: "lockbox".into(),
            handle: h(1),
        });
        router.dispatch(&InteractableEvent::RoundStarted);

        let pending = router.collect_pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].total_spawned, 1);
    }

    #[test]
    fn test_unknown_completion_swallowed() {
        let router = router();
        assert!(router.on_completed(h(42)).is_none());
        assert!(router.with_tracker(|t| t.check_invariants()));
    }

    #[test]
    fn test_attach_detach() {
        let router = router();
        let mut bus = EventBus::new();

        let subscription = router.attach(&mut bus);
        bus.publish(InteractableEvent::Spawned {
            type_id: "lockbox".into(),
            handle: h(1),
        });
        bus.publish(InteractableEvent::RoundStarted);
        bus.process();
        assert_eq!(router.collect_pending().len(), 1);

        router.detach(&mut bus, subscription);
        assert_eq!(bus.subscriber_count(), 0);

        bus.publish(InteractableEvent::RoundStarted);
        bus.process();
        assert_eq!(router.collect_pending().len(), 1);
    }

    #[test]
    fn test_event_json_shape() {
        let event: InteractableEvent =
            serde_json::from_str(r#"{"event":"spawned","type_id":"lockbox","handle":3}"#).unwrap();
        assert_eq!(
            event,
            InteractableEvent::Spawned {
                type_id: "lockbox".into(),
                handle: h(3)
            }
        );
        let event: InteractableEvent = serde_json::from_str(r#"{"event":"round_started"}"#).unwrap();
        assert_eq!(event, InteractableEvent::RoundStarted);
    }
}
