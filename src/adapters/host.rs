//! Host-side device adapter.
//!
//! Stands in for the phone/wearable when running on a workstation:
//!
//! - haptics are logged as patterns (reported supported only when asked to)
//! - notifications are logged; a phone number without digits is rejected
//! - location is a fixed position from the runtime config
//! - speech synthesis is logged; recognition is not available

use core::time::Duration;

use log::{info, warn};

use crate::app::ports::{
    HapticPort, Location, LocationPort, NotificationDispatcher, NotifyFailure, SpeechError,
    SpeechPort,
};
use crate::config::RuntimeConfig;
use crate::profile::EmergencyContact;

/// Minimum digits for a phone number to be dialable.
const MIN_PHONE_DIGITS: usize = 3;

#[derive(Debug, Clone)]
pub struct HostDevice {
    haptics: bool,
    speech: bool,
    location: Option<Location>,
    notified: u32,
}

impl HostDevice {
    pub fn new(config: &RuntimeConfig) -> Self {
        Self {
            haptics: config.haptics_simulated,
            speech: config.speech_simulated,
            location: config.location,
            notified: 0,
        }
    }

    /// Notifications delivered so far.
    pub fn notified(&self) -> u32 {
        self.notified
    }
}

impl HapticPort for HostDevice {
    fn haptics_supported(&self) -> bool {
        self.haptics
    }

    fn vibrate(&mut self, pattern: &[u16]) {
        if !self.haptics {
            return;
        }
        let total: u32 = pattern.iter().map(|ms| u32::from(*ms)).sum();
        info!("HAPTIC | pattern={:?} | {}ms", pattern, total);
    }
}

impl NotificationDispatcher for HostDevice {
    fn notify(
        &mut self,
        contact: &EmergencyContact,
        medical_info: &str,
        location: Option<&Location>,
        _timeout: Duration,
    ) -> Result<(), NotifyFailure> {
        let digits = contact.phone.chars().filter(char::is_ascii_digit).count();
        if digits < MIN_PHONE_DIGITS {
            warn!("NOTIFY | {} has no dialable number", contact.name);
            return Err(NotifyFailure::InvalidAddress);
        }

        let position = location.map_or_else(
            || "unknown".to_string(),
            |l| format!("{:.5},{:.5}", l.latitude, l.longitude),
        );
        info!(
            "NOTIFY | to={} <{}> ({}) | location={} | medical={:?}",
            contact.name, contact.phone, contact.relationship, position, medical_info
        );
        self.notified += 1;
        Ok(())
    }
}

impl LocationPort for HostDevice {
    fn current_location(&mut self) -> Option<Location> {
        self.location
    }
}

impl SpeechPort for HostDevice {
    fn recognition_supported(&self) -> bool {
        false
    }

    fn synthesis_supported(&self) -> bool {
        self.speech
    }

    fn start_recognition(&mut self) -> Result<(), SpeechError> {
        Err(SpeechError::NotAllowed)
    }

    fn next_transcript(&mut self) -> Option<String> {
        None
    }

    fn stop_recognition(&mut self) {}

    fn speak(&mut self, text: &str) -> Result<(), SpeechError> {
        if !self.speech {
            return Err(SpeechError::NotAllowed);
        }
        info!("SAY | {}", text);
        Ok(())
    }
}
