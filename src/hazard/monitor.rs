//! Armed/disarmed emission schedule over a [`HazardSource`].
//!
//! While armed, exactly one emission is pending at a time.  Each fired
//! emission schedules its successor relative to its own due time, so a
//! late poll does not push the rest of the sequence back.
//!
//! `stop()` cancels the pending entry synchronously; nothing fires after
//! it returns.  As a second line, the armed flag and the sequence number
//! are re-checked at fire time so a stale entry from a previous arming
//! can never emit.

use log::{debug, info};

use crate::timer::TimerSlot;

use super::catalog::HazardEvent;
use super::source::HazardSource;

/// A hazard produced by the monitor at a given instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    /// Due time of the emission (ms), not the time it was polled.
    pub at_ms: u64,
    /// Arming sequence this emission belongs to.
    pub sequence: u64,
    pub event: HazardEvent,
}

pub struct HazardMonitor<S> {
    source: S,
    armed: bool,
    /// Pending emission, tagged with the arming sequence that scheduled it.
    pending: TimerSlot<u64>,
    sequence: u64,
    emitted: u64,
}

impl<S: HazardSource> HazardMonitor<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            armed: false,
            pending: TimerSlot::new(),
            sequence: 0,
            emitted: 0,
        }
    }

    /// Arm and schedule the first emission.  Returns `false` (and changes
    /// nothing) if already armed.
    pub fn start(&mut self, now_ms: u64) -> bool {
        if self.armed {
            debug!("HazardMonitor: start ignored, already armed");
            return false;
        }
        self.armed = true;
        self.sequence += 1;
        let delay = self.source.first_interval_ms();
        self.pending.schedule(now_ms + delay, self.sequence);
        info!(
            "HazardMonitor: armed (seq {}), first emission in {} ms",
            self.sequence, delay
        );
        true
    }

    /// Disarm and cancel the pending emission.  Returns `false` if already
    /// disarmed.
    pub fn stop(&mut self) -> bool {
        let was_armed = self.armed;
        self.armed = false;
        self.pending.cancel();
        if was_armed {
            info!("HazardMonitor: disarmed (seq {})", self.sequence);
        }
        was_armed
    }

    /// Fire the pending emission if it is due, scheduling the next one.
    pub fn poll(&mut self, now_ms: u64) -> Option<Emission> {
        let (due_ms, sequence) = self.pending.take_due(now_ms)?;

        if !self.armed || sequence != self.sequence {
            debug!("HazardMonitor: suppressed stale emission (seq {sequence})");
            return None;
        }

        let event = self.source.next_hazard();
        // Strictly later than this emission, so catch-up loops terminate.
        let delay = self.source.next_interval_ms().max(1);
        self.pending.schedule(due_ms + delay, sequence);
        self.emitted += 1;

        info!(
            "HazardMonitor: {} ({}), next in {} ms",
            event.kind, event.severity, delay
        );
        Some(Emission {
            at_ms: due_ms,
            sequence,
            event,
        })
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn next_due(&self) -> Option<u64> {
        self.pending.next_due()
    }

    /// Emissions produced since construction, across all arming sequences.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}
