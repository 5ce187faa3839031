//! Round lifecycle scenarios for objectives_tracker

use objectives_tracker::*;

fn h(n: u64) -> InstanceHandle {
    InstanceHandle::from_raw(n)
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn lockbox_partially_opened() {
    let mut tracker = ObjectiveTracker::new(TrackerContext::host());
    tracker.register("lockbox", "LOCKBOX_OBJ").unwrap();

    for i in 1..=3 {
        tracker.on_spawned("lockbox", h(i));
    }
    tracker.promote_pending();
    tracker.on_completed(h(1)).unwrap();
    tracker.on_completed(h(3)).unwrap();

    assert_eq!(
        tracker.collect_pending(),
        vec![ObjectiveDescriptor {
            type_id: "lockbox".into(),
            completed_count: 2,
            total_spawned: 3,
            token: "LOCKBOX_OBJ".into(),
            strategy: TrackingStrategy::Individual,
        }]
    );
}

#[test]
fn handle_from_previous_round_is_dropped() {
    init_logging();
    let router = {
        let mut tracker = ObjectiveTracker::new(TrackerContext::host());
        tracker.register("lockbox", "LOCKBOX_OBJ").unwrap();
        ObjectiveRouter::new(tracker)
    };

    // Round 1
    router.on_spawned("lockbox", h(1));
    router.start_round();
    assert_eq!(router.collect_pending().len(), 1);

    // Round 2 begins without H being opened
    router.reset();
    router.promote_pending();
    assert!(router.collect_pending().is_empty());

    assert!(router.on_completed(h(1)).is_none());
    router.with_tracker(|tracker| {
        assert!(tracker.state("lockbox").is_none());
        assert!(tracker.pending().is_empty());
        assert!(tracker.check_invariants());
    });
}

#[test]
fn early_discoveries_do_not_touch_displayed_round() {
    let mut tracker = ObjectiveTracker::new(TrackerContext::host());
    tracker.register("lockbox", "LOCKBOX_OBJ").unwrap();

    tracker.on_spawned("lockbox", h(1));
    tracker.start_round();
    let round_one = tracker.collect_pending();

    // Next level populates before the round-start notification
    tracker.on_spawned("lockbox", h(2));
    tracker.on_spawned("lockbox", h(3));
    assert_eq!(tracker.collect_pending(), round_one);

    tracker.start_round();
    let round_two = tracker.collect_pending();
    assert_eq!(round_two.len(), 1);
    assert_eq!(round_two[0].total_spawned, 2);
    assert_eq!(round_two[0].display_token(), "LOCKBOX_OBJ_PLURAL");
}

#[test]
fn stock_session_through_event_bus() {
    init_logging();
    let config = ObjectivesConfig::default();
    let router = ObjectiveRouter::new(ObjectiveTracker::from_config(&config).unwrap());
    let mut bus = objectives_event::EventBus::new();
    let subscription = router.attach(&mut bus);

    bus.publish(InteractableEvent::RoundReset);
    bus.publish(InteractableEvent::Spawned {
        type_id: "lockbox".into(),
        handle: h(1),
    });
    bus.publish(InteractableEvent::GroupSpawned {
        type_id: "free_chest".into(),
        group: h(10),
        members: vec![h(11), h(12), h(13)],
    });
    bus.publish(InteractableEvent::RoundPopulated);
    bus.process();

    // Stage-scan types are found after the round started
    let targets: Vec<_> = router.with_tracker(|t| {
        t.scan_targets()
            .iter()
            .map(|r| r.type_id.to_string())
            .collect()
    });
    assert_eq!(targets, vec!["gold_chest"]);
    bus.publish(InteractableEvent::Spawned {
        type_id: "gold_chest".into(),
        handle: h(20),
    });
    bus.process();

    let ids: Vec<_> = router
        .collect_pending()
        .into_iter()
        .map(|d| d.type_id.to_string())
        .collect();
    assert_eq!(ids, vec!["lockbox", "free_chest", "gold_chest"]);

    // Buying from one terminal uses up the whole multishop
    bus.publish(InteractableEvent::Completed { handle: h(12) });
    bus.publish(InteractableEvent::Completed { handle: h(1) });
    bus.process();

    let ids: Vec<_> = router
        .collect_pending()
        .into_iter()
        .map(|d| d.type_id.to_string())
        .collect();
    assert_eq!(ids, vec!["gold_chest"]);

    router.detach(&mut bus, subscription);
}

#[test]
fn stage_scan_between_reset_and_populate_survives() {
    init_logging();
    let router =
        ObjectiveRouter::new(ObjectiveTracker::from_config(&ObjectivesConfig::default()).unwrap());
    router.on_spawned("lockbox", h(1));

    router.dispatch(&InteractableEvent::RoundReset);
    router.dispatch(&InteractableEvent::Spawned {
        type_id: "gold_chest".into(),
        handle: h(20),
    });
    router.dispatch(&InteractableEvent::RoundPopulated);

    let ids: Vec<_> = router
        .collect_pending()
        .into_iter()
        .map(|d| d.type_id.to_string())
        .collect();
    assert_eq!(ids, vec!["lockbox", "gold_chest"]);

    assert!(router.on_completed(h(20)).is_some());
    assert!(router.with_tracker(|t| t.check_invariants()));
}

#[test]
fn client_only_objectives_stay_visible() {
    init_logging();
    let mut config = ObjectivesConfig::default();
    config.apply_overrides(Some("client"), Some("lockbox_void"));
    let mut tracker = ObjectiveTracker::from_config(&config).unwrap();

    tracker.start_round();
    tracker.on_spawned("gold_chest", h(5));
    assert_eq!(tracker.on_spawned("lockbox_void", h(6)), SpawnOutcome::Disabled);

    let outcome = tracker.on_completed(h(5)).unwrap();
    assert!(matches!(outcome, CompletionOutcome::Unobservable { .. }));
    assert_eq!(tracker.collect_pending().len(), 1);
}

#[test]
fn config_change_between_rounds() {
    init_logging();
    let mut config = ObjectivesConfig::default();
    let mut tracker = ObjectiveTracker::from_config(&config).unwrap();

    tracker.on_spawned("lockbox", h(1));
    tracker.start_round();

    config.objectives.insert("lockbox".into(), false);
    tracker.apply_config(&config);

    // Already tracked instances stay, new ones are ignored
    assert_eq!(tracker.on_spawned("lockbox", h(2)), SpawnOutcome::Disabled);
    assert_eq!(tracker.collect_pending().len(), 1);
    tracker.start_round();
    assert!(tracker.collect_pending().is_empty());
}
