//! Integration tests for hazard monitoring through the service: arming,
//! disarming, catch-up after a late poll, and ordering against the
//! countdown.

use guardian::app::events::AppEvent;
use guardian::escalation::EscalationState;
use guardian::profile::PreferenceChange;

use crate::mock_device::{Harness, ScriptedHazards};

fn hazards(h: &Harness) -> usize {
    h.sink
        .count(|e| matches!(e, AppEvent::HazardDetected(_)))
}

#[test]
fn stop_before_first_emission_suppresses_it() {
    let mut h = Harness::new(ScriptedHazards::low_every(6_000));
    h.service
        .start_monitor(0, &mut h.store, &mut h.sink)
        .unwrap();
    h.run(0, 2_900);

    assert!(
        h.service
            .stop_monitor(&mut h.store, &mut h.sink)
            .unwrap()
    );
    assert!(h.sink.contains(&AppEvent::MonitorDisarmed));

    h.run(3_000, 60_000);
    assert_eq!(hazards(&h), 0);
    assert_eq!(h.service.last_alert(), None);
    assert_eq!(h.service.next_due(), None);
}

#[test]
fn start_twice_arms_once() {
    let mut h = Harness::new(ScriptedHazards::low_every(6_000));
    assert!(
        h.service
            .start_monitor(0, &mut h.store, &mut h.sink)
            .unwrap()
    );
    assert!(
        !h.service
            .start_monitor(3_000, &mut h.store, &mut h.sink)
            .unwrap()
    );
    assert_eq!(h.sink.count(|e| *e == AppEvent::MonitorArmed), 1);
    assert_eq!(h.service.next_due(), Some(6_000));
}

#[test]
fn stop_when_disarmed_is_noop() {
    let mut h = Harness::new(ScriptedHazards::low_every(6_000));
    assert!(
        !h.service
            .stop_monitor(&mut h.store, &mut h.sink)
            .unwrap()
    );
    assert!(!h.sink.contains(&AppEvent::MonitorDisarmed));
}

#[test]
fn late_advance_catches_up_every_missed_emission() {
    let mut h = Harness::new(ScriptedHazards::low_every(6_000));
    h.service
        .start_monitor(0, &mut h.store, &mut h.sink)
        .unwrap();
    h.advance(30_000);
    assert_eq!(hazards(&h), 5);
    assert_eq!(h.service.next_due(), Some(36_000));
}

#[test]
fn rearm_schedules_from_new_start_time() {
    let mut h = Harness::new(ScriptedHazards::low_every(6_000));
    h.service
        .start_monitor(0, &mut h.store, &mut h.sink)
        .unwrap();
    h.advance(6_000);
    h.service
        .stop_monitor(&mut h.store, &mut h.sink)
        .unwrap();
    h.service
        .start_monitor(20_000, &mut h.store, &mut h.sink)
        .unwrap();
    assert_eq!(h.service.next_due(), Some(26_000));
    h.advance(25_900);
    assert_eq!(hazards(&h), 1);
    h.advance(26_000);
    assert_eq!(hazards(&h), 2);
}

#[test]
fn countdown_runs_before_hazard_due_at_same_instant() {
    let mut h = Harness::new(ScriptedHazards::high_every(6_000));
    h.service
        .change_preference(PreferenceChange::Countdown(5), &mut h.store, &mut h.sink)
        .unwrap();
    h.service
        .start_monitor(0, &mut h.store, &mut h.sink)
        .unwrap();
    h.service
        .trigger_escalation(1_000, &mut h.device, &mut h.sink)
        .unwrap();

    // Countdown reaches zero at 6000, the same instant the hazard is due.
    h.advance(6_000);

    let dispatched = h
        .sink
        .events
        .iter()
        .position(|e| matches!(e, AppEvent::Dispatched(_)))
        .unwrap();
    let detected = h
        .sink
        .events
        .iter()
        .position(|e| matches!(e, AppEvent::HazardDetected(_)))
        .unwrap();
    assert!(dispatched < detected);

    // The hazard found the controller idle again and started a new escalation.
    assert_eq!(
        h.service.escalation_state(),
        EscalationState::CountingDown {
            remaining: 5,
            deadline_ms: 11_000
        }
    );
}
