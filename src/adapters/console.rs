//! Stdin console: the host binary's UI.
//!
//! A blocking reader thread parses each line into a [`ConsoleCommand`] and
//! pushes it into a bounded `embassy-sync` channel.  The async control
//! loop awaits [`receive`] alongside its timers.
//!
//! ```text
//! ┌──────────────┐  ConsoleCommand  ┌──────────────┐
//! │ stdin thread │ ───────────────▶ │ control loop │
//! │  (blocking)  │    CMD_CHANNEL   │   (async)    │
//! └──────────────┘                  └──────────────┘
//! ```

use core::fmt;
use std::io::BufRead;
use std::thread::JoinHandle;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use crate::app::commands::AppCommand;
use crate::profile::{NewContact, PreferenceChange};

pub const HELP: &str = "\
commands:
  sos                                   start an SOS countdown
  cancel                                cancel the countdown
  start | stop                          arm / disarm hazard monitoring
  status                                print the current state as JSON
  countdown <5|10|15|30>                set the SOS countdown
  pref <haptics|visual|autosos|stt|tts> <on|off>
  contact add <name> <phone> [relationship]
  contact rm <id>
  medical <text>                        set medical information
  name <text>                           set your name
  listen | unlisten                     start / stop speech recognition
  say <text>                            speak text aloud
  help
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    App(AppCommand),
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    Unknown(String),
    /// Right command, wrong arguments; carries the usage line.
    Usage(&'static str),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty command"),
            Self::Unknown(word) => write!(f, "unknown command '{}' (try 'help')", word),
            Self::Usage(usage) => write!(f, "usage: {}", usage),
        }
    }
}

impl std::error::Error for ParseError {}

// ───────────────────────────────────────────────────────────────
// Parsing
// ───────────────────────────────────────────────────────────────

pub fn parse_line(line: &str) -> Result<ConsoleCommand, ParseError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };

    let app = |cmd: AppCommand| -> Result<ConsoleCommand, ParseError> {
        Ok(ConsoleCommand::App(cmd))
    };
    match word.to_ascii_lowercase().as_str() {
        "" => Err(ParseError::Empty),
        "sos" => app(AppCommand::TriggerEscalation),
        "cancel" => app(AppCommand::CancelEscalation),
        "start" => app(AppCommand::StartMonitor),
        "stop" => app(AppCommand::StopMonitor),
        "status" => Ok(ConsoleCommand::Status),
        "help" | "?" => Ok(ConsoleCommand::Help),
        "quit" | "exit" => Ok(ConsoleCommand::Quit),
        "listen" => app(AppCommand::StartListening),
        "unlisten" => app(AppCommand::StopListening),
        "countdown" => match rest.parse() {
            Ok(secs) => app(AppCommand::ChangePreference(PreferenceChange::Countdown(secs))),
            Err(_) => Err(ParseError::Usage("countdown <5|10|15|30>")),
        },
        "pref" => parse_pref(rest),
        "contact" => parse_contact(rest),
        "medical" => app(AppCommand::SetMedicalInfo(rest.to_string())),
        "name" => app(AppCommand::SetName(rest.to_string())),
        "say" if !rest.is_empty() => app(AppCommand::Speak(rest.to_string())),
        "say" => Err(ParseError::Usage("say <text>")),
        other => Err(ParseError::Unknown(other.to_string())),
    }
}

fn parse_pref(rest: &str) -> Result<ConsoleCommand, ParseError> {
    const USAGE: &str = "pref <haptics|visual|autosos|stt|tts> <on|off>";
    let mut parts = rest.split_whitespace();
    let (Some(name), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ParseError::Usage(USAGE));
    };
    let on = match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" => true,
        "off" | "false" | "0" => false,
        _ => return Err(ParseError::Usage(USAGE)),
    };
    let change = match name.to_ascii_lowercase().as_str() {
        "haptics" => PreferenceChange::HapticFeedback(on),
        "visual" => PreferenceChange::VisualAlerts(on),
        "autosos" => PreferenceChange::AutoSos(on),
        "stt" => PreferenceChange::SpeechToText(on),
        "tts" => PreferenceChange::TextToSpeech(on),
        _ => return Err(ParseError::Usage(USAGE)),
    };
    Ok(ConsoleCommand::App(AppCommand::ChangePreference(change)))
}

fn parse_contact(rest: &str) -> Result<ConsoleCommand, ParseError> {
    const ADD: &str = "contact add <name> <phone> [relationship]";
    const RM: &str = "contact rm <id>";
    let mut parts = rest.split_whitespace();
    match parts.next() {
        Some("add") => {
            let (Some(name), Some(phone)) = (parts.next(), parts.next()) else {
                return Err(ParseError::Usage(ADD));
            };
            let relationship = parts.collect::<Vec<_>>().join(" ");
            Ok(ConsoleCommand::App(AppCommand::AddContact(NewContact {
                name: name.to_string(),
                phone: phone.to_string(),
                relationship,
            })))
        }
        Some("rm" | "remove") => match (parts.next(), parts.next()) {
            (Some(id), None) => Ok(ConsoleCommand::App(AppCommand::RemoveContact(id.to_string()))),
            _ => Err(ParseError::Usage(RM)),
        },
        _ => Err(ParseError::Usage(ADD)),
    }
}

// ───────────────────────────────────────────────────────────────
// Channel + reader thread
// ───────────────────────────────────────────────────────────────

const CMD_DEPTH: usize = 8;

/// Inbound console commands: reader thread → control loop.
pub static CMD_CHANNEL: Channel<CriticalSectionRawMutex, ConsoleCommand, CMD_DEPTH> =
    Channel::new();

/// Spawn the blocking stdin reader.  EOF is delivered as [`ConsoleCommand::Quit`].
pub fn spawn_reader() -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("console".into())
        .spawn(|| {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                match parse_line(&line) {
                    Ok(cmd) => {
                        let quit = cmd == ConsoleCommand::Quit;
                        futures_lite::future::block_on(CMD_CHANNEL.send(cmd));
                        if quit {
                            return;
                        }
                    }
                    Err(ParseError::Empty) => {}
                    Err(e) => warn!("console: {e}"),
                }
            }
            futures_lite::future::block_on(CMD_CHANNEL.send(ConsoleCommand::Quit));
        })
}

/// Next console command.
pub async fn receive() -> ConsoleCommand {
    CMD_CHANNEL.receive().await
}
