//! Integration tests for the GuardianService → escalation → device pipeline.
//!
//! The harness clock is manual: every call passes an explicit
//! millisecond timestamp, so countdown and hazard timing is exact.

use guardian::alert::{HIGH_SEVERITY_PATTERN, SOS_PATTERN, STANDARD_PATTERN};
use guardian::app::commands::AppCommand;
use guardian::app::events::AppEvent;
use guardian::app::ports::Location;
use guardian::capability::CapabilityKind;
use guardian::error::{Error, ProfileError};
use guardian::escalation::{CancelOutcome, EscalationState, TriggerOutcome};
use guardian::profile::{NewContact, PreferenceChange};

use crate::mock_device::{
    DeviceCall, Harness, MockDevice, ScriptedHazards, construction, vehicle,
};

fn contact(name: &str) -> NewContact {
    NewContact {
        name: name.into(),
        phone: "+15550100".into(),
        relationship: String::new(),
    }
}

fn quiet() -> Harness {
    Harness::new(ScriptedHazards::low_every(600_000))
}

fn set_countdown(h: &mut Harness, secs: u32) {
    h.service
        .change_preference(PreferenceChange::Countdown(secs), &mut h.store, &mut h.sink)
        .unwrap();
}

fn add(h: &mut Harness, name: &str) -> String {
    h.service
        .add_contact(contact(name), &mut h.store, &mut h.sink)
        .unwrap()
}

// ── Manual SOS ────────────────────────────────────────────────

#[test]
fn manual_sos_counts_down_then_notifies_every_contact() {
    let mut h = quiet();
    set_countdown(&mut h, 5);
    add(&mut h, "Ana");
    add(&mut h, "Ben");
    h.sink.clear();

    let out = h
        .service
        .trigger_escalation(0, &mut h.device, &mut h.sink)
        .unwrap();
    assert_eq!(
        out,
        TriggerOutcome::Started {
            remaining: 5,
            deadline_ms: 5_000
        }
    );
    assert_eq!(h.device.vibrations(), vec![SOS_PATTERN.to_vec()]);

    h.run(0, 4_900);
    assert!(h.device.notified().is_empty(), "nobody notified before the deadline");
    assert_eq!(
        h.service.escalation_state(),
        EscalationState::CountingDown {
            remaining: 1,
            deadline_ms: 5_000
        }
    );

    h.advance(5_000);
    assert_eq!(h.device.notified(), ["Ana", "Ben"]);
    assert_eq!(h.service.escalation_state(), EscalationState::Idle);

    let ticks: Vec<u32> = h
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::CountdownTick { remaining } => Some(*remaining),
            _ => None,
        })
        .collect();
    assert_eq!(ticks, [4, 3, 2, 1, 0]);
    assert!(h.sink.contains(&AppEvent::DispatchStarted { contacts: 2 }));

    let report = h.service.last_report().unwrap();
    assert_eq!(report.succeeded, 2);
    assert!(report.failed.is_empty());
}

#[test]
fn cancel_at_three_seconds_never_notifies() {
    let mut h = quiet();
    set_countdown(&mut h, 5);
    add(&mut h, "Ana");

    h.service
        .trigger_escalation(0, &mut h.device, &mut h.sink)
        .unwrap();
    h.run(0, 3_000);

    assert_eq!(
        h.service.cancel(&mut h.sink),
        CancelOutcome::Cancelled { remaining: 2 }
    );
    assert!(h.sink.contains(&AppEvent::EscalationCancelled { remaining: 2 }));
    assert_eq!(h.service.escalation_state(), EscalationState::Idle);

    h.run(3_100, 60_000);
    assert!(h.device.notified().is_empty());
    assert_eq!(h.service.next_due(), None);
    assert_eq!(
        h.sink.count(|e| matches!(e, AppEvent::Dispatched(_))),
        0
    );
}

#[test]
fn cancel_from_idle_emits_nothing() {
    let mut h = quiet();
    h.sink.clear();
    assert_eq!(h.service.cancel(&mut h.sink), CancelOutcome::NotActive);
    assert!(h.sink.events.is_empty());
}

#[test]
fn second_trigger_during_countdown_is_ignored() {
    let mut h = quiet();
    h.service
        .trigger_escalation(0, &mut h.device, &mut h.sink)
        .unwrap();
    let again = h
        .service
        .trigger_escalation(2_500, &mut h.device, &mut h.sink)
        .unwrap();
    assert_eq!(again, TriggerOutcome::AlreadyActive);
    assert_eq!(
        h.sink
            .count(|e| matches!(e, AppEvent::EscalationStarted { .. })),
        1
    );
    assert_eq!(h.device.vibrations().len(), 1);
}

#[test]
fn countdown_change_mid_escalation_keeps_running_countdown() {
    let mut h = quiet();
    add(&mut h, "Ana");
    h.service
        .trigger_escalation(0, &mut h.device, &mut h.sink)
        .unwrap();
    h.run(0, 2_000);
    set_countdown(&mut h, 5);

    h.run(2_100, 9_900);
    assert!(h.device.notified().is_empty());
    h.advance(10_000);
    assert_eq!(h.device.notified(), ["Ana"]);
}

#[test]
fn dispatch_continues_past_unreachable_contact_and_attaches_location() {
    let mut h = quiet();
    set_countdown(&mut h, 5);
    add(&mut h, "Ana");
    let ben = add(&mut h, "Ben");
    add(&mut h, "Cy");
    h.service
        .set_medical_info("Type 1 diabetes", &mut h.store, &mut h.sink)
        .unwrap();

    let here = Location {
        latitude: 52.37,
        longitude: 4.89,
        accuracy_m: Some(12.0),
    };
    h.device.location = Some(here);
    h.device.unreachable.push("Ben".into());

    h.service
        .trigger_escalation(0, &mut h.device, &mut h.sink)
        .unwrap();
    h.advance(5_000);

    assert_eq!(h.device.notified(), ["Ana", "Ben", "Cy"]);
    let report = h.service.last_report().unwrap();
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, vec![ben]);

    let first = h
        .device
        .calls
        .iter()
        .find(|c| matches!(c, DeviceCall::Notify { .. }))
        .unwrap();
    assert_eq!(
        first,
        &DeviceCall::Notify {
            name: "Ana".into(),
            medical_info: "Type 1 diabetes".into(),
            location: Some(here),
        }
    );
}

#[test]
fn dispatch_with_no_contacts_completes_empty() {
    let mut h = quiet();
    set_countdown(&mut h, 5);
    h.service
        .trigger_escalation(0, &mut h.device, &mut h.sink)
        .unwrap();
    h.advance(5_000);
    let report = h.service.last_report().unwrap();
    assert_eq!(report.succeeded, 0);
    assert!(report.failed.is_empty());
    assert_eq!(h.service.escalation_state(), EscalationState::Idle);
}

// ── Hazard alerts ─────────────────────────────────────────────

#[test]
fn high_severity_with_auto_sos_starts_countdown() {
    let mut h = Harness::new(ScriptedHazards::high_every(6_000));
    assert!(
        h.service
            .start_monitor(0, &mut h.store, &mut h.sink)
            .unwrap()
    );

    h.advance(6_000);

    assert!(h.sink.contains(&AppEvent::HazardDetected(vehicle())));
    assert!(h.sink.contains(&AppEvent::EscalationStarted {
        countdown_secs: 10,
        automatic: true
    }));
    assert_eq!(
        h.service.escalation_state(),
        EscalationState::CountingDown {
            remaining: 10,
            deadline_ms: 16_000
        }
    );
    assert_eq!(
        h.service.last_alert(),
        Some("Vehicle Approaching: Step to safety")
    );
    assert_eq!(
        h.device.vibrations(),
        vec![HIGH_SEVERITY_PATTERN.to_vec(), SOS_PATTERN.to_vec()]
    );
}

#[test]
fn late_advance_past_high_hazard_still_offers_full_countdown() {
    let mut h = Harness::new(ScriptedHazards::high_every(6_000));
    set_countdown(&mut h, 5);
    add(&mut h, "Ana");
    h.service
        .start_monitor(0, &mut h.store, &mut h.sink)
        .unwrap();

    // Hazard was due at 6000; nothing polled until well past 6000 + 5s.
    h.advance(11_500);

    assert!(h.sink.contains(&AppEvent::EscalationStarted {
        countdown_secs: 5,
        automatic: true
    }));
    assert_eq!(
        h.service.escalation_state(),
        EscalationState::CountingDown {
            remaining: 5,
            deadline_ms: 16_500
        }
    );
    assert_eq!(
        h.sink.count(|e| matches!(e, AppEvent::Dispatched(_))),
        0
    );
    assert!(h.device.notified().is_empty());

    assert_eq!(
        h.service.cancel(&mut h.sink),
        CancelOutcome::Cancelled { remaining: 5 }
    );
}

#[test]
fn repeated_high_hazard_does_not_restart_countdown() {
    let mut h = Harness::new(ScriptedHazards::high_every(6_000));
    h.service
        .start_monitor(0, &mut h.store, &mut h.sink)
        .unwrap();
    h.run(0, 12_000);
    assert_eq!(
        h.sink
            .count(|e| matches!(e, AppEvent::HazardDetected(_))),
        2
    );
    assert_eq!(
        h.sink
            .count(|e| matches!(e, AppEvent::EscalationStarted { .. })),
        1
    );
    assert_eq!(
        h.service.escalation_state(),
        EscalationState::CountingDown {
            remaining: 4,
            deadline_ms: 16_000
        }
    );
}

#[test]
fn high_severity_without_auto_sos_only_alerts() {
    let mut h = Harness::new(ScriptedHazards::high_every(6_000));
    h.service
        .change_preference(PreferenceChange::AutoSos(false), &mut h.store, &mut h.sink)
        .unwrap();
    h.service
        .start_monitor(0, &mut h.store, &mut h.sink)
        .unwrap();
    h.advance(6_000);

    assert!(h.sink.contains(&AppEvent::HazardDetected(vehicle())));
    assert_eq!(h.service.escalation_state(), EscalationState::Idle);
    assert_eq!(h.device.vibrations(), vec![HIGH_SEVERITY_PATTERN.to_vec()]);
}

#[test]
fn low_severity_plays_standard_pattern() {
    let mut h = Harness::new(ScriptedHazards::low_every(6_000));
    h.service
        .start_monitor(0, &mut h.store, &mut h.sink)
        .unwrap();
    h.advance(6_000);
    assert!(h.sink.contains(&AppEvent::HazardDetected(construction())));
    assert_eq!(h.device.vibrations(), vec![STANDARD_PATTERN.to_vec()]);
    assert_eq!(h.service.escalation_state(), EscalationState::Idle);
}

#[test]
fn visual_alerts_off_still_records_last_alert() {
    let mut h = Harness::new(ScriptedHazards::low_every(6_000));
    h.service
        .change_preference(PreferenceChange::VisualAlerts(false), &mut h.store, &mut h.sink)
        .unwrap();
    h.service
        .start_monitor(0, &mut h.store, &mut h.sink)
        .unwrap();
    h.advance(6_000);
    assert_eq!(
        h.sink
            .count(|e| matches!(e, AppEvent::HazardDetected(_))),
        0
    );
    assert_eq!(
        h.service.last_alert(),
        Some("Construction Noise: Construction zone ahead")
    );
}

#[test]
fn haptics_pref_off_silences_motor() {
    let mut h = Harness::new(ScriptedHazards::high_every(6_000));
    h.service
        .change_preference(PreferenceChange::HapticFeedback(false), &mut h.store, &mut h.sink)
        .unwrap();
    h.service
        .start_monitor(0, &mut h.store, &mut h.sink)
        .unwrap();
    h.advance(6_000);
    assert!(h.device.vibrations().is_empty());
    assert_ne!(h.service.escalation_state(), EscalationState::Idle);
}

#[test]
fn text_to_speech_reads_alert_aloud() {
    let mut h = Harness::new(ScriptedHazards::low_every(6_000));
    h.service
        .change_preference(PreferenceChange::TextToSpeech(true), &mut h.store, &mut h.sink)
        .unwrap();
    h.service
        .start_monitor(0, &mut h.store, &mut h.sink)
        .unwrap();
    h.advance(6_000);
    assert_eq!(
        h.device.spoken(),
        ["Construction Noise: Construction zone ahead"]
    );
}

// ── Capabilities ──────────────────────────────────────────────

#[test]
fn bare_device_reports_missing_capabilities_and_never_vibrates() {
    let mut h = Harness::with(
        MockDevice::bare(),
        guardian::adapters::store::KvStore::in_memory(),
        ScriptedHazards::low_every(600_000),
    );

    for kind in CapabilityKind::ALL {
        assert!(h.sink.contains(&AppEvent::CapabilityUnavailable(kind)));
    }
    assert_eq!(h.service.capabilities().unavailable(), CapabilityKind::ALL);

    h.service
        .trigger_escalation(0, &mut h.device, &mut h.sink)
        .unwrap();
    assert!(h.device.vibrations().is_empty());

    let err = h
        .service
        .handle_command(
            AppCommand::Speak("hello".into()),
            0,
            &mut h.device,
            &mut h.store,
            &mut h.sink,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        Error::CapabilityUnavailable(CapabilityKind::SpeechSynthesis)
    ));
    assert!(h.device.spoken().is_empty());

    let err = h.service.start_listening(&mut h.device).unwrap_err();
    assert!(matches!(
        err,
        Error::CapabilityUnavailable(CapabilityKind::SpeechRecognition)
    ));
}

#[test]
fn full_device_reports_nothing_missing() {
    let h = quiet();
    assert!(h.service.capabilities().unavailable().is_empty());
    assert_eq!(
        h.sink
            .count(|e| matches!(e, AppEvent::CapabilityUnavailable(_))),
        0
    );
}

// ── Speech recognition ────────────────────────────────────────

#[test]
fn transcripts_flow_while_listening() {
    let mut h = quiet();
    h.service
        .handle_command(
            AppCommand::StartListening,
            0,
            &mut h.device,
            &mut h.store,
            &mut h.sink,
        )
        .unwrap();
    assert!(h.device.calls.contains(&DeviceCall::StartRecognition));

    h.device.transcripts.push_back("where is".into());
    h.device.transcripts.push_back("the exit".into());
    h.advance(100);

    assert!(h.sink.contains(&AppEvent::Transcript("where is".into())));
    assert!(h.sink.contains(&AppEvent::Transcript("the exit".into())));
    let snap = h.service.snapshot();
    assert!(snap.listening);
    assert_eq!(snap.transcripts, ["where is", "the exit"]);

    h.service.stop_listening(&mut h.device);
    assert!(h.device.calls.contains(&DeviceCall::StopRecognition));
    h.device.transcripts.push_back("ignored".into());
    h.advance(200);
    assert!(!h.sink.contains(&AppEvent::Transcript("ignored".into())));
}

// ── Profile mutations ─────────────────────────────────────────

#[test]
fn invalid_countdown_rejected_and_profile_unchanged() {
    let mut h = quiet();
    h.sink.clear();
    let err = h
        .service
        .change_preference(PreferenceChange::Countdown(7), &mut h.store, &mut h.sink)
        .unwrap_err();
    assert!(matches!(err, Error::Profile(ProfileError::InvalidCountdown(7))));
    assert_eq!(h.service.profile().preferences.sos_countdown_secs, 10);
    assert!(h.sink.events.is_empty());
}

#[test]
fn contacts_get_increasing_priority_and_can_be_removed() {
    let mut h = quiet();
    let ana = add(&mut h, "Ana");
    let ben = add(&mut h, "Ben");
    let priorities: Vec<u32> = h
        .service
        .profile()
        .contacts
        .iter()
        .map(|c| c.priority)
        .collect();
    assert_eq!(priorities, [1, 2]);

    let removed = h
        .service
        .remove_contact(&ana, &mut h.store, &mut h.sink)
        .unwrap();
    assert_eq!(removed.name, "Ana");

    let cy = add(&mut h, "Cy");
    let cy_priority = h
        .service
        .profile()
        .contacts
        .iter()
        .find(|c| c.id == cy)
        .map(|c| c.priority);
    assert_eq!(cy_priority, Some(3));
    assert!(h.service.profile().contacts.iter().any(|c| c.id == ben));
}

#[test]
fn remove_unknown_contact_fails() {
    let mut h = quiet();
    let err = h
        .service
        .remove_contact("no-such-id", &mut h.store, &mut h.sink)
        .unwrap_err();
    assert!(matches!(err, Error::Profile(ProfileError::ContactNotFound)));
}

#[test]
fn blank_contact_name_rejected() {
    let mut h = quiet();
    let err = h
        .service
        .add_contact(contact("   "), &mut h.store, &mut h.sink)
        .unwrap_err();
    assert!(matches!(err, Error::Profile(ProfileError::EmptyContactName)));
    assert!(h.service.profile().contacts.is_empty());
}

#[test]
fn commands_route_to_entry_points() {
    let mut h = quiet();
    let cmds = [
        AppCommand::SetName("Sam".into()),
        AppCommand::AddContact(contact("Ana")),
        AppCommand::ChangePreference(PreferenceChange::Countdown(5)),
        AppCommand::StartMonitor,
        AppCommand::TriggerEscalation,
    ];
    for cmd in cmds {
        h.service
            .handle_command(cmd, 0, &mut h.device, &mut h.store, &mut h.sink)
            .unwrap();
    }
    assert_eq!(h.service.profile().name, "Sam");
    assert!(h.service.is_monitor_armed());
    assert!(matches!(
        h.service.escalation_state(),
        EscalationState::CountingDown { remaining: 5, .. }
    ));

    h.service
        .handle_command(
            AppCommand::CancelEscalation,
            1_000,
            &mut h.device,
            &mut h.store,
            &mut h.sink,
        )
        .unwrap();
    assert_eq!(h.service.escalation_state(), EscalationState::Idle);

    let snap = h.service.snapshot();
    assert_eq!(snap.contacts, 1);
    assert_eq!(snap.countdown_secs, 5);
    assert!(snap.monitor_armed);
}
