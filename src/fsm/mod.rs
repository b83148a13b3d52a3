//! Function-pointer finite state machine engine for the SOS escalation.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  StateTable                                                 │
//! │  ┌──────────────┬───────────┬──────────┬───────────────────┐│
//! │  │ StateId      │ on_enter  │ on_exit  │ on_update         ││
//! │  ├──────────────┼───────────┼──────────┼───────────────────┤│
//! │  │ Idle         │ fn(ctx)   │ -        │ fn(ctx)->Option<> ││
//! │  │ CountingDown │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> ││
//! │  │ Dispatching  │ fn(ctx)   │ -        │ fn(ctx)->Option<> ││
//! │  └──────────────┴───────────┴──────────┴───────────────────┘│
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! One `tick()` is one elapsed countdown second.  The engine calls
//! `on_update` for the current state; a `Some(next)` runs `on_exit` for
//! the current state and `on_enter` for the next.  Handlers communicate
//! with the owner only through the [`EscalationContext`] blackboard.

pub mod context;
pub mod states;

use context::EscalationContext;
use log::info;

/// Must stay in sync with the table built in [`states::build_state_table`].
/// The discriminant is the row index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Idle = 0,
    CountingDown = 1,
    Dispatching = 2,
}

impl StateId {
    pub const COUNT: usize = 3;

    fn row(self) -> usize {
        self as usize
    }
}

/// `on_enter` / `on_exit` action.
pub type StateActionFn = fn(&mut EscalationContext);

/// Called once per countdown second.  `Some(next)` requests a transition.
pub type StateUpdateFn = fn(&mut EscalationContext) -> Option<StateId>;

/// One row of the state table.
pub struct StateDescriptor {
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    table: [StateDescriptor; StateId::COUNT],
    current: StateId,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial,
        }
    }

    /// Run the initial `on_enter`.  Call once before the first `tick()`.
    pub fn start(&mut self, ctx: &mut EscalationContext) {
        let row = &self.table[self.current.row()];
        info!("FSM starting in state: {}", row.name);
        if let Some(enter) = row.on_enter {
            enter(ctx);
        }
    }

    /// One elapsed countdown second.
    pub fn tick(&mut self, ctx: &mut EscalationContext) {
        if let Some(next) = (self.table[self.current.row()].on_update)(ctx) {
            self.transition(next, ctx);
        }
    }

    /// Take an externally driven edge (trigger, cancel, dispatch done).
    /// A transition to the current state is ignored.
    pub fn force_transition(&mut self, next: StateId, ctx: &mut EscalationContext) {
        if next != self.current {
            self.transition(next, ctx);
        }
    }

    pub fn current_state(&self) -> StateId {
        self.current
    }

    fn transition(&mut self, next: StateId, ctx: &mut EscalationContext) {
        info!(
            "FSM transition: {} -> {}",
            self.table[self.current.row()].name,
            self.table[next.row()].name
        );
        if let Some(exit) = self.table[self.current.row()].on_exit {
            exit(ctx);
        }
        self.current = next;
        if let Some(enter) = self.table[next.row()].on_enter {
            enter(ctx);
        }
    }
}
