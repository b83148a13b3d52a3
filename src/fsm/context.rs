//! Shared mutable context threaded through every escalation handler.
//!
//! `EscalationContext` is the "blackboard": the controller writes the
//! trigger parameters before entering `CountingDown`, handlers update the
//! countdown, and the controller drains [`EscalationCommands`] after each
//! step to perform the side effects (vibrate, dispatch).

// ---------------------------------------------------------------------------
// Side-effect requests (written by handlers; consumed by the controller)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EscalationCommands {
    /// Haptic pattern to play once, if any.
    pub haptic: Option<&'static [u16]>,
    /// Set on the transition into `Dispatching`.
    pub dispatch: bool,
}

// ---------------------------------------------------------------------------
// EscalationContext
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct EscalationContext {
    // -- Trigger parameters (set before entering CountingDown) --
    /// Countdown length N in seconds.
    pub countdown_secs: u32,
    /// Monotonic ms at which the escalation was triggered.
    pub triggered_at_ms: u64,
    /// Whether the SOS haptic pattern should play on entry.
    pub haptics_enabled: bool,

    // -- Countdown state --
    /// Seconds left before dispatch.
    pub remaining: u32,
    /// `triggered_at_ms + N * 1000` while counting down.
    pub deadline_ms: Option<u64>,

    // -- Outputs --
    pub commands: EscalationCommands,
}

impl EscalationContext {
    pub fn new() -> Self {
        Self::default()
    }
}
