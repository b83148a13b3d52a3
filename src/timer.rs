//! Cancellable delayed actions.
//!
//! Both the SOS countdown and the hazard monitor need "run this later,
//! unless someone cancels first".  A [`TimerSlot`] pairs the scheduled
//! action with a [`CancelToken`]; whoever holds the slot (or a token
//! clone) can cancel, and a cancelled entry never fires.
//!
//! ```text
//!   schedule(due, action) ──▶ ┌──────────────────────────┐
//!                             │ TimerSlot                │
//!   cancel() ───────────────▶ │  due_ms · action · token │ ──▶ take_due(now)
//!                             └──────────────────────────┘      (None if cancelled)
//! ```
//!
//! Time is caller-supplied monotonic milliseconds, so the same code runs
//! against a virtual clock in tests and the host clock in the binary.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared cancellation flag.  Cancelling is idempotent and visible to
/// every clone immediately.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
struct Scheduled<A> {
    due_ms: u64,
    action: A,
    token: CancelToken,
}

/// Holds at most one pending action.
#[derive(Debug)]
pub struct TimerSlot<A> {
    pending: Option<Scheduled<A>>,
}

impl<A> Default for TimerSlot<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> TimerSlot<A> {
    pub const fn new() -> Self {
        Self { pending: None }
    }

    /// Schedule `action` at `due_ms`, cancelling anything already pending.
    /// Returns a token that cancels this entry only.
    pub fn schedule(&mut self, due_ms: u64, action: A) -> CancelToken {
        self.cancel();
        let token = CancelToken::new();
        self.pending = Some(Scheduled {
            due_ms,
            action,
            token: token.clone(),
        });
        token
    }

    /// Cancel and drop the pending entry.  Returns whether one was live.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(entry) => {
                let live = !entry.token.is_cancelled();
                entry.token.cancel();
                live
            }
            None => false,
        }
    }

    /// Due time of the pending entry, if it is still live.
    pub fn next_due(&self) -> Option<u64> {
        self.pending
            .as_ref()
            .filter(|e| !e.token.is_cancelled())
            .map(|e| e.due_ms)
    }

    /// Remove and return the action if it is due at `now_ms` and has not
    /// been cancelled.  A cancelled entry is discarded without firing.
    pub fn take_due(&mut self, now_ms: u64) -> Option<(u64, A)> {
        let entry = self.pending.as_ref()?;
        if entry.token.is_cancelled() {
            self.pending = None;
            return None;
        }
        if entry.due_ms > now_ms {
            return None;
        }
        self.pending.take().map(|e| (e.due_ms, e.action))
    }
}
