//! Read-only view of the core for rendering.

use serde::Serialize;

use crate::capability::Capabilities;
use crate::escalation::{DispatchReport, EscalationView};

/// Everything the UI is allowed to observe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UiSnapshot {
    pub escalation: EscalationView,
    pub last_alert: Option<String>,
    pub monitor_armed: bool,
    pub capabilities: Capabilities,
    pub contacts: usize,
    pub countdown_secs: u32,
    pub listening: bool,
    pub transcripts: Vec<String>,
    pub last_dispatch: Option<DispatchReport>,
}
