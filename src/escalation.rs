//! SOS escalation: trigger, per-second countdown, cancel, dispatch.
//!
//! ```text
//!            trigger                    N ticks
//!   Idle ─────────────▶ CountingDown ─────────────▶ Dispatching ──▶ Idle
//!     ▲                      │                       (dispatch())
//!     └────── cancel ────────┘
//! ```
//!
//! The controller owns the [`Fsm`] and its blackboard, plus a
//! [`TimerSlot`] for the next countdown tick.  Tick `k` is due at
//! `trigger + k * 1000` ms, so the zero-boundary tick lands exactly on the
//! deadline no matter how late individual polls run.
//!
//! A tick that reaches zero hands back a [`DispatchJob`]; the machine sits
//! in `Dispatching` until [`EscalationController::dispatch`] consumes the
//! job.  Anything processed in between sees the escalation as already
//! committed: `cancel` reports `TooLate`, `trigger` reports `AlreadyActive`.

use core::time::Duration;
use std::time::Instant;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::{Location, NotificationDispatcher, NotifyFailure};
use crate::error::{ProfileError, Result};
use crate::fsm::context::EscalationContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::profile::{EmergencyContact, Preferences, UserProfile};
use crate::timer::TimerSlot;

/// Length of one countdown step.
pub const TICK_MS: u64 = 1_000;

// ───────────────────────────────────────────────────────────────
// Outcomes
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EscalationState {
    Idle,
    CountingDown { remaining: u32, deadline_ms: u64 },
    Dispatching,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    Started { remaining: u32, deadline_ms: u64 },
    /// A countdown or dispatch is already in progress; nothing changed.
    AlreadyActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled { remaining: u32 },
    /// Nothing to cancel.
    NotActive,
    /// Dispatch has begun and will complete.
    TooLate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Counting { remaining: u32 },
    /// The countdown hit zero; run [`EscalationController::dispatch`].
    Dispatch(DispatchJob),
    /// Not counting down.
    Ignored,
}

/// Everything dispatch needs, captured at the zero-boundary tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchJob {
    pub escalation_id: u64,
    /// Ascending priority.
    pub contacts: Vec<EmergencyContact>,
    pub medical_info: String,
}

/// Aggregate result of one dispatch.  Failures are data, not errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReport {
    pub escalation_id: u64,
    pub succeeded: usize,
    /// Ids of contacts that could not be notified, in dispatch order.
    pub failed: Vec<String>,
}

/// What the UI renders for the escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EscalationView {
    pub state: EscalationState,
    pub countdown_secs: u32,
    pub progress_percent: u8,
}

// ───────────────────────────────────────────────────────────────
// EscalationController
// ───────────────────────────────────────────────────────────────

pub struct EscalationController {
    fsm: Fsm,
    ctx: EscalationContext,
    /// Next countdown tick, tagged with the escalation it belongs to.
    countdown: TimerSlot<u64>,
    escalation_id: u64,
}

impl Default for EscalationController {
    fn default() -> Self {
        Self::new()
    }
}

impl EscalationController {
    pub fn new() -> Self {
        let mut fsm = Fsm::new(build_state_table(), StateId::Idle);
        let mut ctx = EscalationContext::new();
        fsm.start(&mut ctx);
        Self {
            fsm,
            ctx,
            countdown: TimerSlot::new(),
            escalation_id: 0,
        }
    }

    // ── Entry points ──────────────────────────────────────────

    /// Start a countdown of `prefs.sos_countdown_secs` from `now_ms`.
    pub fn trigger(&mut self, prefs: &Preferences, now_ms: u64) -> Result<TriggerOutcome> {
        if self.fsm.current_state() != StateId::Idle {
            info!("SOS: trigger ignored, escalation already active");
            return Ok(TriggerOutcome::AlreadyActive);
        }
        if prefs.sos_countdown_secs == 0 {
            return Err(ProfileError::InvalidCountdown(0).into());
        }

        self.escalation_id += 1;
        self.ctx.countdown_secs = prefs.sos_countdown_secs;
        self.ctx.triggered_at_ms = now_ms;
        self.ctx.haptics_enabled = prefs.haptic_feedback;
        self.fsm.force_transition(StateId::CountingDown, &mut self.ctx);
        self.countdown.schedule(now_ms + TICK_MS, self.escalation_id);

        let deadline_ms = self.ctx.deadline_ms.unwrap_or(now_ms);
        info!(
            "SOS: escalation #{} started, {}s countdown",
            self.escalation_id, self.ctx.remaining
        );
        Ok(TriggerOutcome::Started {
            remaining: self.ctx.remaining,
            deadline_ms,
        })
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self, profile: &UserProfile) -> TickOutcome {
        if self.fsm.current_state() != StateId::CountingDown {
            return TickOutcome::Ignored;
        }
        let deadline_ms = self.ctx.deadline_ms;

        self.fsm.tick(&mut self.ctx);

        if self.ctx.commands.dispatch {
            self.ctx.commands.dispatch = false;
            self.countdown.cancel();
            return TickOutcome::Dispatch(DispatchJob {
                escalation_id: self.escalation_id,
                contacts: profile.contacts_by_priority(),
                medical_info: profile.medical_info.clone(),
            });
        }

        // Tick that takes `remaining` from r to r-1 is due at deadline - (r-1)s.
        let remaining = self.ctx.remaining;
        if let Some(deadline) = deadline_ms {
            let due = deadline - u64::from(remaining - 1) * TICK_MS;
            self.countdown.schedule(due, self.escalation_id);
        }
        TickOutcome::Counting { remaining }
    }

    /// Run the countdown tick if it is due at `now_ms`.
    pub fn poll(&mut self, now_ms: u64, profile: &UserProfile) -> Option<TickOutcome> {
        let (_, id) = self.countdown.take_due(now_ms)?;
        if id != self.escalation_id || self.fsm.current_state() != StateId::CountingDown {
            return None;
        }
        Some(self.tick(profile))
    }

    pub fn cancel(&mut self) -> CancelOutcome {
        match self.fsm.current_state() {
            StateId::Idle => CancelOutcome::NotActive,
            StateId::Dispatching => {
                info!("SOS: cancel too late, dispatch in progress");
                CancelOutcome::TooLate
            }
            StateId::CountingDown => {
                let remaining = self.ctx.remaining;
                self.countdown.cancel();
                self.fsm.force_transition(StateId::Idle, &mut self.ctx);
                info!(
                    "SOS: escalation #{} cancelled with {}s left",
                    self.escalation_id, remaining
                );
                CancelOutcome::Cancelled { remaining }
            }
        }
    }

    /// Notify every contact in the job, then return to `Idle`.
    ///
    /// A contact whose notify call fails, or returns after `timeout`, is
    /// recorded as failed; the loop always continues to the next contact.
    pub fn dispatch(
        &mut self,
        job: DispatchJob,
        notifier: &mut impl NotificationDispatcher,
        location: Option<&Location>,
        timeout: Duration,
    ) -> DispatchReport {
        let mut report = DispatchReport {
            escalation_id: job.escalation_id,
            ..Default::default()
        };

        for contact in &job.contacts {
            let started = Instant::now();
            let result = notifier
                .notify(contact, &job.medical_info, location, timeout)
                .and_then(|()| {
                    if started.elapsed() > timeout {
                        Err(NotifyFailure::TimedOut)
                    } else {
                        Ok(())
                    }
                });

            match result {
                Ok(()) => report.succeeded += 1,
                Err(reason) => {
                    warn!(
                        "SOS: contact {} (priority {}) not notified: {}",
                        contact.name, contact.priority, reason
                    );
                    report.failed.push(contact.id.clone());
                }
            }
        }

        self.fsm.force_transition(StateId::Idle, &mut self.ctx);
        info!(
            "SOS: escalation #{} dispatched, {} ok, {} failed",
            report.escalation_id,
            report.succeeded,
            report.failed.len()
        );
        report
    }

    // ── Queries ───────────────────────────────────────────────

    /// Haptic pattern requested by the last transition, if any.
    pub fn take_haptic(&mut self) -> Option<&'static [u16]> {
        self.ctx.commands.haptic.take()
    }

    pub fn next_due(&self) -> Option<u64> {
        self.countdown.next_due()
    }

    pub fn escalation_id(&self) -> u64 {
        self.escalation_id
    }

    pub fn state(&self) -> EscalationState {
        match self.fsm.current_state() {
            StateId::Idle => EscalationState::Idle,
            StateId::CountingDown => EscalationState::CountingDown {
                remaining: self.ctx.remaining,
                deadline_ms: self.ctx.deadline_ms.unwrap_or(self.ctx.triggered_at_ms),
            },
            StateId::Dispatching => EscalationState::Dispatching,
        }
    }

    pub fn view(&self) -> EscalationView {
        let state = self.state();
        let n = self.ctx.countdown_secs;
        let progress_percent = match state {
            EscalationState::Idle => 0,
            EscalationState::Dispatching => 100,
            EscalationState::CountingDown { remaining, .. } if n > 0 => {
                ((n - remaining) * 100 / n) as u8
            }
            EscalationState::CountingDown { .. } => 0,
        };
        EscalationView {
            state,
            countdown_secs: n,
            progress_percent,
        }
    }
}
