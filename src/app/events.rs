//! Outbound application events.
//!
//! The [`GuardianService`](super::service::GuardianService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them: log lines, a toast, a
//! screen-reader announcement.

use crate::capability::CapabilityKind;
use crate::escalation::{DispatchReport, EscalationState};
use crate::hazard::HazardEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The service has started.
    Started {
        monitor_armed: bool,
        escalation: EscalationState,
    },

    /// An optional capability is missing; its controls are disabled.
    CapabilityUnavailable(CapabilityKind),

    MonitorArmed,
    MonitorDisarmed,

    /// A hazard was presented to the user.
    HazardDetected(HazardEvent),

    EscalationStarted { countdown_secs: u32, automatic: bool },
    CountdownTick { remaining: u32 },
    EscalationCancelled { remaining: u32 },
    /// A cancel arrived after dispatch had begun.
    CancelTooLate,
    DispatchStarted { contacts: usize },
    Dispatched(DispatchReport),

    /// The persisted profile changed.
    ProfileUpdated,

    /// A speech recognition fragment arrived.
    Transcript(String),
}
