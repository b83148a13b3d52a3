//! Hazard event value type and the fixed simulation catalog.

use core::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// A detected environmental condition and what the user should do about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HazardEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: Severity,
    pub action: String,
}

impl HazardEvent {
    pub fn new(kind: impl Into<String>, severity: Severity, action: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            severity,
            action: action.into(),
        }
    }

    /// The `"<type>: <action>"` line stored in the last-alert slot.
    pub fn alert_text(&self) -> String {
        format!("{}: {}", self.kind, self.action)
    }
}

/// One catalog row: `(type, severity, recommended action)`.
pub type CatalogEntry = (&'static str, Severity, &'static str);

pub const CATALOG: [CatalogEntry; 5] = [
    ("Vehicle Approaching", Severity::High, "Step to safety"),
    ("Emergency Siren", Severity::Medium, "Be aware of emergency vehicles"),
    ("Construction Noise", Severity::Low, "Construction zone ahead"),
    ("Horn Honking", Severity::High, "Check your surroundings"),
    (
        "Alarm Bell",
        Severity::Medium,
        "Look for the alarm source and follow evacuation signs",
    ),
];

/// Build the event for catalog row `idx` (wrapped into range).
pub fn catalog_event(idx: usize) -> HazardEvent {
    let (kind, severity, action) = CATALOG[idx % CATALOG.len()];
    HazardEvent::new(kind, severity, action)
}
