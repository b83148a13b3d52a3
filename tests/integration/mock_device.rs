//! Mock device, event sink, and hazard source for integration tests.
//!
//! Records every port call so tests can assert on the full history
//! without a phone or wearable attached.

use std::collections::VecDeque;
use std::time::Duration;

use guardian::adapters::store::KvStore;
use guardian::app::events::AppEvent;
use guardian::app::ports::{
    EventSink, HapticPort, Location, LocationPort, NotificationDispatcher, NotifyFailure,
    SpeechError, SpeechPort,
};
use guardian::app::service::GuardianService;
use guardian::config::RuntimeConfig;
use guardian::hazard::{HazardEvent, HazardSource, Severity};
use guardian::profile::EmergencyContact;

// ── Device call record ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    Vibrate(Vec<u16>),
    Notify {
        name: String,
        medical_info: String,
        location: Option<Location>,
    },
    StartRecognition,
    StopRecognition,
    Speak(String),
}

// ── MockDevice ────────────────────────────────────────────────

pub struct MockDevice {
    pub calls: Vec<DeviceCall>,
    pub haptics: bool,
    pub recognition: bool,
    pub synthesis: bool,
    pub location: Option<Location>,
    /// Contact names whose notification fails.
    pub unreachable: Vec<String>,
    pub transcripts: VecDeque<String>,
}

#[allow(dead_code)]
impl MockDevice {
    /// Every capability present.
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            haptics: true,
            recognition: true,
            synthesis: true,
            location: None,
            unreachable: Vec::new(),
            transcripts: VecDeque::new(),
        }
    }

    /// No haptics and no speech in either direction.
    pub fn bare() -> Self {
        Self {
            haptics: false,
            recognition: false,
            synthesis: false,
            ..Self::new()
        }
    }

    pub fn vibrations(&self) -> Vec<Vec<u16>> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DeviceCall::Vibrate(p) => Some(p.clone()),
                _ => None,
            })
            .collect()
    }

    /// Names notified, in call order.
    pub fn notified(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DeviceCall::Notify { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DeviceCall::Speak(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

impl HapticPort for MockDevice {
    fn haptics_supported(&self) -> bool {
        self.haptics
    }

    fn vibrate(&mut self, pattern: &[u16]) {
        self.calls.push(DeviceCall::Vibrate(pattern.to_vec()));
    }
}

impl NotificationDispatcher for MockDevice {
    fn notify(
        &mut self,
        contact: &EmergencyContact,
        medical_info: &str,
        location: Option<&Location>,
        _timeout: Duration,
    ) -> Result<(), NotifyFailure> {
        self.calls.push(DeviceCall::Notify {
            name: contact.name.clone(),
            medical_info: medical_info.to_string(),
            location: location.copied(),
        });
        if self.unreachable.contains(&contact.name) {
            Err(NotifyFailure::Unreachable)
        } else {
            Ok(())
        }
    }
}

impl LocationPort for MockDevice {
    fn current_location(&mut self) -> Option<Location> {
        self.location
    }
}

impl SpeechPort for MockDevice {
    fn recognition_supported(&self) -> bool {
        self.recognition
    }

    fn synthesis_supported(&self) -> bool {
        self.synthesis
    }

    fn start_recognition(&mut self) -> Result<(), SpeechError> {
        self.calls.push(DeviceCall::StartRecognition);
        Ok(())
    }

    fn next_transcript(&mut self) -> Option<String> {
        self.transcripts.pop_front()
    }

    fn stop_recognition(&mut self) {
        self.calls.push(DeviceCall::StopRecognition);
    }

    fn speak(&mut self, text: &str) -> Result<(), SpeechError> {
        self.calls.push(DeviceCall::Speak(text.to_string()));
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, event: &AppEvent) -> bool {
        self.events.contains(event)
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── ScriptedHazards ───────────────────────────────────────────

/// Fixed intervals, cycling through a fixed list of events.
pub struct ScriptedHazards {
    pub first_ms: u64,
    pub next_ms: u64,
    pub events: Vec<HazardEvent>,
    cursor: usize,
}

#[allow(dead_code)]
impl ScriptedHazards {
    pub fn new(first_ms: u64, next_ms: u64, events: Vec<HazardEvent>) -> Self {
        Self {
            first_ms,
            next_ms,
            events,
            cursor: 0,
        }
    }

    /// Every emission is a high-severity vehicle warning.
    pub fn high_every(interval_ms: u64) -> Self {
        Self::new(interval_ms, interval_ms, vec![vehicle()])
    }

    /// Every emission is a low-severity construction notice.
    pub fn low_every(interval_ms: u64) -> Self {
        Self::new(interval_ms, interval_ms, vec![construction()])
    }
}

impl HazardSource for ScriptedHazards {
    fn first_interval_ms(&mut self) -> u64 {
        self.first_ms
    }

    fn next_interval_ms(&mut self) -> u64 {
        self.next_ms
    }

    fn next_hazard(&mut self) -> HazardEvent {
        let event = self.events[self.cursor % self.events.len()].clone();
        self.cursor += 1;
        event
    }
}

#[allow(dead_code)]
pub fn vehicle() -> HazardEvent {
    HazardEvent::new("Vehicle Approaching", Severity::High, "Step to safety")
}

#[allow(dead_code)]
pub fn construction() -> HazardEvent {
    HazardEvent::new("Construction Noise", Severity::Low, "Construction zone ahead")
}

// ── Harness ───────────────────────────────────────────────────

pub struct Harness {
    pub service: GuardianService<ScriptedHazards>,
    pub device: MockDevice,
    pub store: KvStore,
    pub sink: RecordingSink,
}

#[allow(dead_code)]
impl Harness {
    pub fn new(source: ScriptedHazards) -> Self {
        Self::with(MockDevice::new(), KvStore::in_memory(), source)
    }

    /// Load against `store` and start at t=0.
    pub fn with(mut device: MockDevice, mut store: KvStore, source: ScriptedHazards) -> Self {
        let config = RuntimeConfig::default();
        let mut service =
            GuardianService::load(&mut store, &device, source, &config).expect("load");
        let mut sink = RecordingSink::new();
        service.start(0, &mut device, &mut sink);
        Self {
            service,
            device,
            store,
            sink,
        }
    }

    pub fn advance(&mut self, now_ms: u64) {
        self.service
            .advance(now_ms, &mut self.device, &mut self.store, &mut self.sink);
    }

    /// Advance in 100 ms steps from `from_ms` to `to_ms` inclusive.
    pub fn run(&mut self, from_ms: u64, to_ms: u64) {
        let mut now = from_ms;
        while now <= to_ms {
            self.advance(now);
            now += 100;
        }
    }
}
