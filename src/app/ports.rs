//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ GuardianService (domain)
//! ```
//!
//! Driven adapters (haptics, notification delivery, location, speech,
//! storage, event sinks) implement these traits.  The
//! [`GuardianService`](super::service::GuardianService) consumes them via
//! generics, so the domain core never touches a platform API directly.
//!
//! ## Contract notes
//!
//! - **NotificationDispatcher** implementations MUST return failures as
//!   values and MUST honour the per-contact timeout they are handed.
//! - **HapticPort::vibrate** on unsupported hardware is a no-op, not an error.
//! - **ProfileStore** implementations MUST validate before persisting.

use core::fmt;
use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ProfileError;
use crate::profile::{EmergencyContact, UserProfile};

// ───────────────────────────────────────────────────────────────
// Haptics (domain → vibration hardware)
// ───────────────────────────────────────────────────────────────

pub trait HapticPort {
    /// Whether the platform can vibrate at all.  Probed once at startup.
    fn haptics_supported(&self) -> bool;

    /// Play an on/off pattern of millisecond durations, starting "on".
    fn vibrate(&mut self, pattern: &[u16]);
}

// ───────────────────────────────────────────────────────────────
// Notification delivery (domain → contacts)
// ───────────────────────────────────────────────────────────────

/// Best-effort delivery of an emergency payload to one contact.
pub trait NotificationDispatcher {
    /// Notify `contact`.  Must give up after `timeout` and report
    /// [`NotifyFailure::TimedOut`] rather than block.
    fn notify(
        &mut self,
        contact: &EmergencyContact,
        medical_info: &str,
        location: Option<&Location>,
        timeout: Duration,
    ) -> Result<(), NotifyFailure>;
}

/// Why a single contact could not be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifyFailure {
    /// The delivery channel could not reach the contact.
    Unreachable,
    /// The address (phone number) is malformed.
    InvalidAddress,
    /// The provider refused the message.
    Rejected,
    /// No answer within the per-contact timeout.
    TimedOut,
}

impl fmt::Display for NotifyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable => write!(f, "unreachable"),
            Self::InvalidAddress => write!(f, "invalid address"),
            Self::Rejected => write!(f, "rejected by provider"),
            Self::TimedOut => write!(f, "timed out"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Location (platform → domain)
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    /// Horizontal accuracy radius in metres, when known.
    pub accuracy_m: Option<f32>,
}

pub trait LocationPort {
    /// Best current fix, or `None` when positioning is unavailable.
    fn current_location(&mut self) -> Option<Location>;
}

// ───────────────────────────────────────────────────────────────
// Speech (optional capability provider)
// ───────────────────────────────────────────────────────────────

pub trait SpeechPort {
    fn recognition_supported(&self) -> bool;

    fn synthesis_supported(&self) -> bool;

    /// Begin streaming transcript fragments.
    fn start_recognition(&mut self) -> Result<(), SpeechError>;

    /// Next transcript fragment, if one has arrived.
    fn next_transcript(&mut self) -> Option<String>;

    fn stop_recognition(&mut self);

    /// Speak `text`; returns once the utterance completed or failed.
    fn speak(&mut self, text: &str) -> Result<(), SpeechError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechError {
    /// The user or platform denied microphone / audio access.
    NotAllowed,
    /// The utterance or recognition session was interrupted.
    Interrupted,
    /// Any other provider failure.
    Failed,
}

impl fmt::Display for SpeechError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAllowed => write!(f, "not allowed"),
            Self::Interrupted => write!(f, "interrupted"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Combined device bound
// ───────────────────────────────────────────────────────────────

/// Everything the service drives on the device side.  Blanket-implemented,
/// so an adapter only implements the four port traits.
pub trait DevicePorts: HapticPort + NotificationDispatcher + LocationPort + SpeechPort {}

impl<T> DevicePorts for T where T: HapticPort + NotificationDispatcher + LocationPort + SpeechPort {}

// ───────────────────────────────────────────────────────────────
// Event sink (domain → logging / UI)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Profile store (domain ↔ durable profile)
// ───────────────────────────────────────────────────────────────

/// Durable profile storage keyed by a fixed well-known string.
pub trait ProfileStore {
    /// `Ok(None)` when nothing has been stored under `key` yet.
    fn get(&self, key: &str) -> Result<Option<UserProfile>, StorageError>;

    /// Validate and persist.  Rejects invalid preferences with
    /// [`StorageError::ValidationFailed`] and keeps the previous value.
    fn set(&mut self, key: &str, profile: &UserProfile) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Raw storage (domain ↔ key-value bytes)
// ───────────────────────────────────────────────────────────────

/// Namespaced byte storage for small flags and slots.
///
/// Writes MUST be atomic: a reader after a crash sees either the old or
/// the new value, never a torn one.
pub trait StoragePort {
    fn read(&self, namespace: &str, key: &str) -> Result<Vec<u8>, StorageError>;

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ProfileStore`] and [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Stored bytes failed to decode.
    Corrupted,
    /// A profile failed validation and was not written.
    ValidationFailed(ProfileError),
    /// Generic I/O error from the backing medium.
    IoError,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Corrupted => write!(f, "stored value corrupted"),
            Self::ValidationFailed(e) => write!(f, "validation failed: {}", e),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for StorageError {}
