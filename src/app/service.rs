//! Application service: the hexagonal core.
//!
//! [`GuardianService`] owns the escalation controller, the hazard monitor,
//! the alert sink, and the in-memory copy of the profile.  All I/O flows
//! through port traits injected at call sites, so the service is fully
//! testable with mock adapters.
//!
//! ```text
//!  HazardSource ──▶ ┌───────────────────────────────┐ ──▶ EventSink
//!                   │        GuardianService        │
//!  DevicePorts ◀──▶ │ Monitor · AlertSink · SOS FSM │ ◀──▶ ProfileStore
//!                   └───────────────────────────────┘      StoragePort
//! ```
//!
//! The service has no clock of its own.  The caller passes monotonic
//! milliseconds into every time-dependent call and uses [`next_due`] to
//! decide how long to sleep.
//!
//! [`next_due`]: GuardianService::next_due

use core::time::Duration;

use log::{info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::alert::AlertSink;
use crate::capability::{Capabilities, CapabilityKind};
use crate::config::RuntimeConfig;
use crate::error::Result;
use crate::escalation::{
    CancelOutcome, DispatchReport, EscalationController, EscalationState, TickOutcome,
    TriggerOutcome,
};
use crate::hazard::{HazardEvent, HazardMonitor, HazardSource};
use crate::profile::{
    EmergencyContact, LAST_ALERT_KEY, MONITOR_ARMED_KEY, NewContact, PROFILE_KEY,
    PreferenceChange, Preferences, STORE_NAMESPACE, UserProfile,
};
use crate::speech::SpeechBridge;

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{
    DevicePorts, EventSink, HapticPort, ProfileStore, SpeechPort, StorageError, StoragePort,
};
use super::snapshot::UiSnapshot;

// ───────────────────────────────────────────────────────────────
// GuardianService
// ───────────────────────────────────────────────────────────────

pub struct GuardianService<S> {
    profile: UserProfile,
    controller: EscalationController,
    monitor: HazardMonitor<S>,
    alerts: AlertSink,
    speech: SpeechBridge,
    capabilities: Capabilities,
    dispatch_timeout: Duration,
    /// Arm flag read at load; applied by `start`.
    resume_armed: bool,
    last_report: Option<DispatchReport>,
}

impl<S: HazardSource> GuardianService<S> {
    /// Load persisted state and probe device capabilities.
    ///
    /// A missing profile is created with defaults and written back.  Does
    /// **not** arm the monitor; call [`start`](Self::start) next.
    pub fn load(
        store: &mut (impl ProfileStore + StoragePort),
        device: &impl DevicePorts,
        source: S,
        config: &RuntimeConfig,
    ) -> Result<Self> {
        config.validate()?;

        let profile = match store.get(PROFILE_KEY)? {
            Some(profile) => {
                info!(
                    "Profile loaded: {} contact(s), countdown {}s",
                    profile.contacts.len(),
                    profile.preferences.sos_countdown_secs
                );
                profile
            }
            None => {
                let profile = UserProfile::default();
                store.set(PROFILE_KEY, &profile)?;
                info!("No stored profile, created defaults");
                profile
            }
        };

        let resume_armed = restore::<bool>(&*store, MONITOR_ARMED_KEY).unwrap_or(false);
        let last_alert = restore::<String>(&*store, LAST_ALERT_KEY);
        let capabilities = Capabilities::probe(device);

        Ok(Self {
            profile,
            controller: EscalationController::new(),
            monitor: HazardMonitor::new(source),
            alerts: AlertSink::with_last_alert(last_alert),
            speech: SpeechBridge::new(&capabilities),
            capabilities,
            dispatch_timeout: config.dispatch_timeout(),
            resume_armed,
            last_report: None,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Announce startup and missing capabilities, then resume whatever was
    /// active before the last shutdown.
    pub fn start(&mut self, now_ms: u64, hw: &mut impl SpeechPort, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started {
            monitor_armed: self.resume_armed,
            escalation: self.controller.state(),
        });
        for kind in self.capabilities.unavailable() {
            warn!("Capability unavailable: {kind}");
            sink.emit(&AppEvent::CapabilityUnavailable(kind));
        }

        if self.resume_armed && self.monitor.start(now_ms) {
            sink.emit(&AppEvent::MonitorArmed);
        }

        if self.profile.preferences.speech_to_text_enabled
            && self.capabilities.speech_recognition.is_supported()
        {
            if let Err(e) = self.speech.start_recognition(hw) {
                warn!("Speech recognition not started: {e}");
            }
        }
        info!("GuardianService started");
    }

    // ── Public entry points ───────────────────────────────────

    /// Arm the hazard monitor.  Returns `Ok(false)` if already armed.
    pub fn start_monitor(
        &mut self,
        now_ms: u64,
        store: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) -> Result<bool> {
        if self.monitor.is_armed() {
            return Ok(false);
        }
        persist(store, MONITOR_ARMED_KEY, &true)?;
        self.monitor.start(now_ms);
        sink.emit(&AppEvent::MonitorArmed);
        Ok(true)
    }

    /// Disarm the hazard monitor.  The pending emission is cancelled before
    /// the flag is persisted, so a storage failure never leaves it running.
    pub fn stop_monitor(
        &mut self,
        store: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) -> Result<bool> {
        if !self.monitor.stop() {
            return Ok(false);
        }
        sink.emit(&AppEvent::MonitorDisarmed);
        persist(store, MONITOR_ARMED_KEY, &false)?;
        Ok(true)
    }

    /// Manual SOS.
    pub fn trigger_escalation(
        &mut self,
        now_ms: u64,
        hw: &mut impl HapticPort,
        sink: &mut impl EventSink,
    ) -> Result<TriggerOutcome> {
        let outcome = self.controller.trigger(&self.profile.preferences, now_ms)?;
        if let TriggerOutcome::Started { remaining, .. } = outcome {
            sink.emit(&AppEvent::EscalationStarted {
                countdown_secs: remaining,
                automatic: false,
            });
            self.play_pending_haptic(hw);
        }
        Ok(outcome)
    }

    pub fn cancel(&mut self, sink: &mut impl EventSink) -> CancelOutcome {
        let outcome = self.controller.cancel();
        match outcome {
            CancelOutcome::Cancelled { remaining } => {
                sink.emit(&AppEvent::EscalationCancelled { remaining });
            }
            CancelOutcome::TooLate => sink.emit(&AppEvent::CancelTooLate),
            CancelOutcome::NotActive => {}
        }
        outcome
    }

    // ── Time-driven work ──────────────────────────────────────

    /// Run every timer due at or before `now_ms`, oldest first.  On a tie
    /// the countdown goes before the monitor.
    pub fn advance(
        &mut self,
        now_ms: u64,
        hw: &mut impl DevicePorts,
        store: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) {
        loop {
            let countdown = self.controller.next_due().filter(|due| *due <= now_ms);
            let hazard = self.monitor.next_due().filter(|due| *due <= now_ms);

            match (countdown, hazard) {
                (None, None) => break,
                (Some(c), Some(h)) if h < c => self.fire_hazard(now_ms, hw, store, sink),
                (Some(_), _) => self.fire_countdown(now_ms, hw, sink),
                (None, Some(_)) => self.fire_hazard(now_ms, hw, store, sink),
            }
        }

        for fragment in self.speech.poll_transcripts(hw) {
            sink.emit(&AppEvent::Transcript(fragment));
        }
    }

    /// Earliest pending timer, if any.
    pub fn next_due(&self) -> Option<u64> {
        match (self.controller.next_due(), self.monitor.next_due()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // ── Profile mutations ─────────────────────────────────────

    pub fn change_preference(
        &mut self,
        change: PreferenceChange,
        store: &mut impl ProfileStore,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let mut next = self.profile.clone();
        next.preferences = change.apply(&self.profile.preferences);
        self.commit(next, store, sink)
    }

    pub fn update_preferences(
        &mut self,
        preferences: Preferences,
        store: &mut impl ProfileStore,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let mut next = self.profile.clone();
        next.preferences = preferences;
        self.commit(next, store, sink)
    }

    /// Returns the new contact's id.
    pub fn add_contact(
        &mut self,
        contact: NewContact,
        store: &mut impl ProfileStore,
        sink: &mut impl EventSink,
    ) -> Result<String> {
        let mut next = self.profile.clone();
        let id = next.add_contact(contact)?.id.clone();
        self.commit(next, store, sink)?;
        Ok(id)
    }

    pub fn remove_contact(
        &mut self,
        id: &str,
        store: &mut impl ProfileStore,
        sink: &mut impl EventSink,
    ) -> Result<EmergencyContact> {
        let mut next = self.profile.clone();
        let removed = next.remove_contact(id)?;
        self.commit(next, store, sink)?;
        Ok(removed)
    }

    pub fn set_medical_info(
        &mut self,
        text: impl Into<String>,
        store: &mut impl ProfileStore,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let mut next = self.profile.clone();
        next.medical_info = text.into();
        self.commit(next, store, sink)
    }

    pub fn set_name(
        &mut self,
        name: impl Into<String>,
        store: &mut impl ProfileStore,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let mut next = self.profile.clone();
        next.name = name.into();
        self.commit(next, store, sink)
    }

    // ── Speech ────────────────────────────────────────────────

    pub fn start_listening(&mut self, hw: &mut impl SpeechPort) -> Result<()> {
        self.speech.start_recognition(hw)
    }

    pub fn stop_listening(&mut self, hw: &mut impl SpeechPort) {
        self.speech.stop(hw);
    }

    pub fn speak(&mut self, text: &str, hw: &mut impl SpeechPort) -> Result<()> {
        self.speech.speak(hw, text)
    }

    // ── Command handling ──────────────────────────────────────

    /// Route an external command to the matching entry point.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now_ms: u64,
        hw: &mut impl DevicePorts,
        store: &mut (impl ProfileStore + StoragePort),
        sink: &mut impl EventSink,
    ) -> Result<()> {
        match cmd {
            AppCommand::TriggerEscalation => {
                self.trigger_escalation(now_ms, hw, sink)?;
            }
            AppCommand::CancelEscalation => {
                self.cancel(sink);
            }
            AppCommand::StartMonitor => {
                self.start_monitor(now_ms, store, sink)?;
            }
            AppCommand::StopMonitor => {
                self.stop_monitor(store, sink)?;
            }
            AppCommand::ChangePreference(change) => self.change_preference(change, store, sink)?,
            AppCommand::UpdatePreferences(prefs) => self.update_preferences(prefs, store, sink)?,
            AppCommand::AddContact(contact) => {
                self.add_contact(contact, store, sink)?;
            }
            AppCommand::RemoveContact(id) => {
                self.remove_contact(&id, store, sink)?;
            }
            AppCommand::SetMedicalInfo(text) => self.set_medical_info(text, store, sink)?,
            AppCommand::SetName(name) => self.set_name(name, store, sink)?,
            AppCommand::StartListening => self.start_listening(hw)?,
            AppCommand::StopListening => self.stop_listening(hw),
            AppCommand::Speak(text) => self.speak(&text, hw)?,
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn snapshot(&self) -> UiSnapshot {
        UiSnapshot {
            escalation: self.controller.view(),
            last_alert: self.alerts.last_alert().map(str::to_string),
            monitor_armed: self.monitor.is_armed(),
            capabilities: self.capabilities,
            contacts: self.profile.contacts.len(),
            countdown_secs: self.profile.preferences.sos_countdown_secs,
            listening: self.speech.is_listening(),
            transcripts: self.speech.transcripts().cloned().collect(),
            last_dispatch: self.last_report.clone(),
        }
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn escalation_state(&self) -> EscalationState {
        self.controller.state()
    }

    pub fn is_monitor_armed(&self) -> bool {
        self.monitor.is_armed()
    }

    pub fn last_alert(&self) -> Option<&str> {
        self.alerts.last_alert()
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn last_report(&self) -> Option<&DispatchReport> {
        self.last_report.as_ref()
    }

    // ── Internal ──────────────────────────────────────────────

    fn fire_countdown(&mut self, now_ms: u64, hw: &mut impl DevicePorts, sink: &mut impl EventSink) {
        match self.controller.poll(now_ms, &self.profile) {
            Some(TickOutcome::Counting { remaining }) => {
                sink.emit(&AppEvent::CountdownTick { remaining });
            }
            Some(TickOutcome::Dispatch(job)) => {
                sink.emit(&AppEvent::CountdownTick { remaining: 0 });
                sink.emit(&AppEvent::DispatchStarted {
                    contacts: job.contacts.len(),
                });
                let location = hw.current_location();
                let report =
                    self.controller
                        .dispatch(job, hw, location.as_ref(), self.dispatch_timeout);
                sink.emit(&AppEvent::Dispatched(report.clone()));
                self.last_report = Some(report);
            }
            Some(TickOutcome::Ignored) | None => {}
        }
    }

    fn fire_hazard(
        &mut self,
        now_ms: u64,
        hw: &mut impl DevicePorts,
        store: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) {
        // Auto-SOS counts down from presentation, not from the due time.
        if let Some(emission) = self.monitor.poll(now_ms) {
            self.present(&emission.event, now_ms, hw, store, sink);
        }
    }

    fn present(
        &mut self,
        event: &HazardEvent,
        now_ms: u64,
        hw: &mut impl DevicePorts,
        store: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) {
        let prefs = &self.profile.preferences;
        let outcome = self.alerts.present(event, prefs, &mut self.controller, now_ms);

        if let Err(e) = persist(store, LAST_ALERT_KEY, &outcome.text) {
            warn!("Last alert not persisted: {e}");
        }
        if prefs.visual_alerts {
            sink.emit(&AppEvent::HazardDetected(event.clone()));
        }
        if let Some(pattern) = outcome.haptic {
            self.vibrate(hw, pattern);
        }
        if let Some(TriggerOutcome::Started { remaining, .. }) = outcome.escalation {
            sink.emit(&AppEvent::EscalationStarted {
                countdown_secs: remaining,
                automatic: true,
            });
            self.play_pending_haptic(hw);
        }
        if self.profile.preferences.text_to_speech_enabled
            && self.capabilities.speech_synthesis.is_supported()
        {
            if let Err(e) = self.speech.speak(hw, &outcome.text) {
                warn!("Alert not spoken: {e}");
            }
        }
    }

    fn play_pending_haptic(&mut self, hw: &mut impl HapticPort) {
        if let Some(pattern) = self.controller.take_haptic() {
            self.vibrate(hw, pattern);
        }
    }

    fn vibrate(&self, hw: &mut impl HapticPort, pattern: &[u16]) {
        if self.capabilities.get(CapabilityKind::Haptics).is_supported() {
            hw.vibrate(pattern);
        }
    }

    /// Validate, persist, then swap in the new profile.  On any failure the
    /// in-memory profile is left untouched.
    fn commit(
        &mut self,
        next: UserProfile,
        store: &mut impl ProfileStore,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        next.validate()?;
        store.set(PROFILE_KEY, &next)?;
        self.profile = next;
        sink.emit(&AppEvent::ProfileUpdated);
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Small persisted values
// ───────────────────────────────────────────────────────────────

fn persist<T: Serialize>(store: &mut impl StoragePort, key: &str, value: &T) -> Result<()> {
    let bytes = postcard::to_allocvec(value).map_err(|_| StorageError::IoError)?;
    store.write(STORE_NAMESPACE, key, &bytes)?;
    Ok(())
}

/// `None` when the key is absent or unreadable.
fn restore<T: DeserializeOwned>(store: &impl StoragePort, key: &str) -> Option<T> {
    match store.read(STORE_NAMESPACE, key) {
        Ok(bytes) => match postcard::from_bytes(&bytes) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Stored value '{key}' is corrupted, ignoring");
                None
            }
        },
        Err(StorageError::NotFound) => None,
        Err(e) => {
            warn!("Stored value '{key}' unreadable: {e}");
            None
        }
    }
}
