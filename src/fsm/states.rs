//! Concrete state handler functions and table builder.
//!
//! ```text
//!  IDLE ──[trigger]──▶ COUNTING_DOWN ──[remaining == 0]──▶ DISPATCHING
//!    ▲                      │                                  │
//!    └──────[cancel]────────┘                                  │
//!    └──────────────────────[dispatch complete]────────────────┘
//! ```
//!
//! `trigger`, `cancel`, and "dispatch complete" are driven from outside via
//! [`Fsm::force_transition`](super::Fsm::force_transition).  The only edge
//! an update handler takes on its own is the zero-boundary tick.

use super::context::EscalationContext;
use super::{StateDescriptor, StateId};
use crate::alert::SOS_PATTERN;
use log::{debug, info};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Idle
        StateDescriptor {
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1: CountingDown
        StateDescriptor {
            name: "CountingDown",
            on_enter: Some(countdown_enter),
            on_exit: Some(countdown_exit),
            on_update: countdown_update,
        },
        // Index 2: Dispatching
        StateDescriptor {
            name: "Dispatching",
            on_enter: Some(dispatching_enter),
            on_exit: None,
            on_update: dispatching_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut EscalationContext) {
    ctx.remaining = 0;
    ctx.deadline_ms = None;
    ctx.commands.dispatch = false;
    debug!("IDLE: no escalation in progress");
}

fn idle_update(_ctx: &mut EscalationContext) -> Option<StateId> {
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  COUNTING_DOWN
// ═══════════════════════════════════════════════════════════════════════════

fn countdown_enter(ctx: &mut EscalationContext) {
    ctx.remaining = ctx.countdown_secs;
    ctx.deadline_ms = Some(ctx.triggered_at_ms + u64::from(ctx.countdown_secs) * 1_000);
    if ctx.haptics_enabled {
        ctx.commands.haptic = Some(&SOS_PATTERN);
    }
    info!(
        "COUNTING_DOWN: {}s until contacts are notified",
        ctx.countdown_secs
    );
}

fn countdown_exit(ctx: &mut EscalationContext) {
    ctx.deadline_ms = None;
}

fn countdown_update(ctx: &mut EscalationContext) -> Option<StateId> {
    ctx.remaining = ctx.remaining.saturating_sub(1);
    if ctx.remaining == 0 {
        return Some(StateId::Dispatching);
    }
    debug!("COUNTING_DOWN: {}s remaining", ctx.remaining);
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  DISPATCHING (left only when the controller finishes the job)
// ═══════════════════════════════════════════════════════════════════════════

fn dispatching_enter(ctx: &mut EscalationContext) {
    ctx.remaining = 0;
    ctx.commands.dispatch = true;
    info!("DISPATCHING: notifying emergency contacts");
}

fn dispatching_update(_ctx: &mut EscalationContext) -> Option<StateId> {
    None
}
