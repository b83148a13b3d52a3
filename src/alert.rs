//! Alert presentation: haptics, the last-alert slot, and auto-SOS.

use log::{info, warn};

use crate::escalation::{EscalationController, TriggerOutcome};
use crate::hazard::{HazardEvent, Severity};
use crate::profile::Preferences;

/// Played when an SOS countdown starts.
pub const SOS_PATTERN: [u16; 5] = [200, 100, 200, 100, 200];
/// Played for high-severity hazards.
pub const HIGH_SEVERITY_PATTERN: [u16; 5] = [100, 50, 100, 50, 100];
/// Played for every other hazard.
pub const STANDARD_PATTERN: [u16; 1] = [200];

/// Haptic pattern for a hazard of the given severity.
pub fn hazard_pattern(severity: Severity) -> &'static [u16] {
    match severity {
        Severity::High => &HIGH_SEVERITY_PATTERN,
        Severity::Medium | Severity::Low => &STANDARD_PATTERN,
    }
}

/// Side effects the caller must carry out for one presented alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertOutcome {
    /// Pattern to vibrate, when haptic feedback is on.
    pub haptic: Option<&'static [u16]>,
    /// Formatted `"<type>: <action>"`, already stored as the last alert.
    pub text: String,
    /// Set when this alert started an escalation.
    pub escalation: Option<TriggerOutcome>,
}

/// Keeps the single most recent alert line.
#[derive(Debug, Default)]
pub struct AlertSink {
    last_alert: Option<String>,
}

impl AlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore the slot from storage.
    pub fn with_last_alert(last_alert: Option<String>) -> Self {
        Self { last_alert }
    }

    pub fn last_alert(&self) -> Option<&str> {
        self.last_alert.as_deref()
    }

    pub fn present(
        &mut self,
        event: &HazardEvent,
        prefs: &Preferences,
        escalation: &mut EscalationController,
        now_ms: u64,
    ) -> AlertOutcome {
        let haptic = prefs
            .haptic_feedback
            .then(|| hazard_pattern(event.severity));

        let text = event.alert_text();
        self.last_alert = Some(text.clone());
        info!("ALERT: {text}");

        let escalation = if prefs.auto_sos && event.severity == Severity::High {
            match escalation.trigger(prefs, now_ms) {
                Ok(started @ TriggerOutcome::Started { .. }) => {
                    info!("ALERT: auto-SOS started for {}", event.kind);
                    Some(started)
                }
                Ok(TriggerOutcome::AlreadyActive) => None,
                Err(e) => {
                    warn!("ALERT: auto-SOS not started: {e}");
                    None
                }
            }
        } else {
            None
        };

        AlertOutcome {
            haptic,
            text,
            escalation,
        }
    }
}
