//! Optional platform capabilities, probed once at startup.
//!
//! Call sites never ask the platform "can you vibrate?" on their own; they
//! consult the [`Capabilities`] descriptor captured when the service was
//! built.  An `Unsupported` capability disables the matching controls and
//! is announced once, never treated as a failure.

use core::fmt;

use serde::Serialize;

use crate::app::ports::{HapticPort, SpeechPort};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    Haptics,
    SpeechRecognition,
    SpeechSynthesis,
}

impl CapabilityKind {
    pub const ALL: [CapabilityKind; 3] = [
        CapabilityKind::Haptics,
        CapabilityKind::SpeechRecognition,
        CapabilityKind::SpeechSynthesis,
    ];
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Haptics => write!(f, "haptics"),
            Self::SpeechRecognition => write!(f, "speech recognition"),
            Self::SpeechSynthesis => write!(f, "speech synthesis"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Supported,
    Unsupported,
}

impl Capability {
    fn from_probe(supported: bool) -> Self {
        if supported {
            Self::Supported
        } else {
            Self::Unsupported
        }
    }

    pub fn is_supported(self) -> bool {
        self == Self::Supported
    }
}

/// Snapshot of what the platform offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub haptics: Capability,
    pub speech_recognition: Capability,
    pub speech_synthesis: Capability,
}

impl Capabilities {
    /// Query the device once.  The result is not refreshed afterwards.
    pub fn probe(device: &(impl HapticPort + SpeechPort)) -> Self {
        Self {
            haptics: Capability::from_probe(device.haptics_supported()),
            speech_recognition: Capability::from_probe(device.recognition_supported()),
            speech_synthesis: Capability::from_probe(device.synthesis_supported()),
        }
    }

    pub fn get(&self, kind: CapabilityKind) -> Capability {
        match kind {
            CapabilityKind::Haptics => self.haptics,
            CapabilityKind::SpeechRecognition => self.speech_recognition,
            CapabilityKind::SpeechSynthesis => self.speech_synthesis,
        }
    }

    /// Capabilities the platform lacks, in a stable order.
    pub fn unavailable(&self) -> Vec<CapabilityKind> {
        CapabilityKind::ALL
            .into_iter()
            .filter(|k| !self.get(*k).is_supported())
            .collect()
    }
}
