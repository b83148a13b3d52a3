//! User profile: preferences, emergency contacts, medical info.
//!
//! The profile is the only durable user data the core touches.  It is
//! loaded once when the service starts and rewritten in full after every
//! mutation; it is never deleted.  Validation happens here, at the write
//! boundary, so a rejected write leaves the previous value in place.

use serde::{Deserialize, Serialize};

use crate::error::ProfileError;

/// Namespace shared by every key the core persists.
pub const STORE_NAMESPACE: &str = "guardian";
/// Key of the persisted [`UserProfile`].
pub const PROFILE_KEY: &str = "guardian-profile";
/// Key of the persisted monitor arm flag.
pub const MONITOR_ARMED_KEY: &str = "hazard-monitoring";
/// Key of the single "last alert" slot.
pub const LAST_ALERT_KEY: &str = "last-alert";

/// Countdown lengths a user may pick, in seconds.
pub const ALLOWED_COUNTDOWN_SECS: [u32; 4] = [5, 10, 15, 30];

/// Countdown used for a freshly created profile.
pub const DEFAULT_COUNTDOWN_SECS: u32 = 10;

// ---------------------------------------------------------------------------
// Contacts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub relationship: String,
    /// Dispatch order, ascending.  Assigned at insertion; first contact is 1.
    pub priority: u32,
}

/// Contact details as entered by the user, before an id and priority exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    pub name: String,
    pub phone: String,
    pub relationship: String,
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub haptic_feedback: bool,
    pub visual_alerts: bool,
    /// Escalate automatically on high-severity hazards.
    pub auto_sos: bool,
    pub sos_countdown_secs: u32,
    pub speech_to_text_enabled: bool,
    pub text_to_speech_enabled: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            haptic_feedback: true,
            visual_alerts: true,
            auto_sos: true,
            sos_countdown_secs: DEFAULT_COUNTDOWN_SECS,
            speech_to_text_enabled: false,
            text_to_speech_enabled: false,
        }
    }
}

impl Preferences {
    pub fn validate(&self) -> Result<(), ProfileError> {
        if !ALLOWED_COUNTDOWN_SECS.contains(&self.sos_countdown_secs) {
            return Err(ProfileError::InvalidCountdown(self.sos_countdown_secs));
        }
        Ok(())
    }
}

/// A single preference edit, as issued by a settings control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceChange {
    Countdown(u32),
    HapticFeedback(bool),
    VisualAlerts(bool),
    AutoSos(bool),
    SpeechToText(bool),
    TextToSpeech(bool),
}

impl PreferenceChange {
    /// Apply the edit to a copy of the preferences.  Validation is the
    /// caller's job (see [`Preferences::validate`]).
    pub fn apply(self, prefs: &Preferences) -> Preferences {
        let mut next = prefs.clone();
        match self {
            Self::Countdown(secs) => next.sos_countdown_secs = secs,
            Self::HapticFeedback(on) => next.haptic_feedback = on,
            Self::VisualAlerts(on) => next.visual_alerts = on,
            Self::AutoSos(on) => next.auto_sos = on,
            Self::SpeechToText(on) => next.speech_to_text_enabled = on,
            Self::TextToSpeech(on) => next.text_to_speech_enabled = on,
        }
        next
    }
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    /// Insertion order; see [`UserProfile::contacts_by_priority`] for dispatch order.
    pub contacts: Vec<EmergencyContact>,
    pub medical_info: String,
    pub preferences: Preferences,
}

impl UserProfile {
    pub fn validate(&self) -> Result<(), ProfileError> {
        self.preferences.validate()
    }

    /// Priority the next inserted contact receives: one above the highest
    /// stored priority.
    pub fn next_priority(&self) -> Result<u32, ProfileError> {
        match self.contacts.iter().map(|c| c.priority).max() {
            None => Ok(1),
            Some(p) => p.checked_add(1).ok_or(ProfileError::PriorityExhausted),
        }
    }

    /// Insert a contact, assigning a fresh id and the next priority.
    pub fn add_contact(&mut self, new: NewContact) -> Result<&EmergencyContact, ProfileError> {
        let name = new.name.trim();
        let phone = new.phone.trim();
        if name.is_empty() {
            return Err(ProfileError::EmptyContactName);
        }
        if phone.is_empty() {
            return Err(ProfileError::EmptyContactPhone);
        }

        let contact = EmergencyContact {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            phone: phone.to_string(),
            relationship: new.relationship.trim().to_string(),
            priority: self.next_priority()?,
        };
        self.contacts.push(contact);
        Ok(&self.contacts[self.contacts.len() - 1])
    }

    pub fn remove_contact(&mut self, id: &str) -> Result<EmergencyContact, ProfileError> {
        let idx = self
            .contacts
            .iter()
            .position(|c| c.id == id)
            .ok_or(ProfileError::ContactNotFound)?;
        Ok(self.contacts.remove(idx))
    }

    /// Contacts sorted ascending by priority.
    pub fn contacts_by_priority(&self) -> Vec<EmergencyContact> {
        let mut sorted = self.contacts.clone();
        sorted.sort_by_key(|c| c.priority);
        sorted
    }
}
