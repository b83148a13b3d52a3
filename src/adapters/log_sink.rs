//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing one structured line per
//! [`AppEvent`] through the `log` facade.  A screen-reader or toast
//! adapter would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started {
                monitor_armed,
                escalation,
            } => {
                info!("START | monitor_armed={} | escalation={:?}", monitor_armed, escalation);
            }
            AppEvent::CapabilityUnavailable(kind) => {
                warn!("CAPABILITY | {} unavailable, controls disabled", kind);
            }
            AppEvent::MonitorArmed => info!("MONITOR | armed"),
            AppEvent::MonitorDisarmed => info!("MONITOR | disarmed"),
            AppEvent::HazardDetected(e) => {
                warn!("HAZARD | {} | severity={} | {}", e.kind, e.severity, e.action);
            }
            AppEvent::EscalationStarted {
                countdown_secs,
                automatic,
            } => {
                warn!(
                    "SOS | countdown {}s started ({})",
                    countdown_secs,
                    if *automatic { "automatic" } else { "manual" }
                );
            }
            AppEvent::CountdownTick { remaining } => info!("SOS | {}s remaining", remaining),
            AppEvent::EscalationCancelled { remaining } => {
                info!("SOS | cancelled with {}s remaining", remaining);
            }
            AppEvent::CancelTooLate => warn!("SOS | cancel too late, dispatch in progress"),
            AppEvent::DispatchStarted { contacts } => {
                warn!("SOS | notifying {} contact(s)", contacts);
            }
            AppEvent::Dispatched(report) => {
                info!(
                    "SOS | dispatch #{} done | ok={} failed={}",
                    report.escalation_id,
                    report.succeeded,
                    report.failed.len()
                );
            }
            AppEvent::ProfileUpdated => info!("PROFILE | saved"),
            AppEvent::Transcript(text) => info!("SPEECH | \"{}\"", text),
        }
    }
}
