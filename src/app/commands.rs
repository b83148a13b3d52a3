//! Inbound commands to the application service.
//!
//! These are the only writes the UI may issue.  Adapters (console, GUI,
//! voice) translate user intent into one of these and hand it to
//! [`GuardianService::handle_command`](super::service::GuardianService::handle_command).

use crate::profile::{NewContact, PreferenceChange, Preferences};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Manual SOS.
    TriggerEscalation,
    CancelEscalation,

    StartMonitor,
    StopMonitor,

    /// Edit a single preference.
    ChangePreference(PreferenceChange),
    /// Replace the whole preference set.
    UpdatePreferences(Preferences),
    AddContact(NewContact),
    /// Remove by contact id.
    RemoveContact(String),
    SetMedicalInfo(String),
    SetName(String),

    StartListening,
    StopListening,
    Speak(String),
}
