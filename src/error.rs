//! Unified error types for the Guardian core.
//!
//! A single `Error` enum that every subsystem converts into, so the
//! service and the host runtime handle failures uniformly.  Outcomes that
//! are *not* failures (a duplicate trigger, a late cancel) are modelled as
//! outcome enums in [`crate::escalation`] and never reach this type.

use core::fmt;

use crate::app::ports::{SpeechError, StorageError};
use crate::capability::CapabilityKind;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the core funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A profile write was rejected at the validation boundary.
    Profile(ProfileError),
    /// The profile store could not be read or written.
    Storage(StorageError),
    /// An optional platform capability is absent or denied.
    CapabilityUnavailable(CapabilityKind),
    /// The speech provider reported a failure.
    Speech(SpeechError),
    /// Runtime configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Profile(e) => write!(f, "profile: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::CapabilityUnavailable(kind) => write!(f, "capability unavailable: {kind}"),
            Self::Speech(e) => write!(f, "speech: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl From<SpeechError> for Error {
    fn from(e: SpeechError) -> Self {
        Self::Speech(e)
    }
}

// ---------------------------------------------------------------------------
// Profile validation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileError {
    /// `sos_countdown_secs` is not one of the allowed values.
    InvalidCountdown(u32),
    /// A contact was submitted without a name.
    EmptyContactName,
    /// A contact was submitted without a phone number.
    EmptyContactPhone,
    /// No contact with the requested id exists.
    ContactNotFound,
    /// The highest stored priority has no successor.
    PriorityExhausted,
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCountdown(secs) => {
                write!(f, "SOS countdown of {secs}s is not one of 5, 10, 15, 30")
            }
            Self::EmptyContactName => write!(f, "contact name must not be empty"),
            Self::EmptyContactPhone => write!(f, "contact phone must not be empty"),
            Self::ContactNotFound => write!(f, "contact not found"),
            Self::PriorityExhausted => write!(f, "no contact priority left to assign"),
        }
    }
}

impl From<ProfileError> for Error {
    fn from(e: ProfileError) -> Self {
        Self::Profile(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
