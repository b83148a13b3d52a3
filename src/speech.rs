//! Capability-gated wrapper over the platform speech provider.
//!
//! Recognition results are buffered in a small ring so the UI can show
//! the latest fragments; the oldest fragment is dropped when full.
//! Neither direction is ever attempted on a platform that reported the
//! capability as unsupported.

use heapless::Deque;
use log::{debug, info};

use crate::app::ports::SpeechPort;
use crate::capability::{Capabilities, Capability, CapabilityKind};
use crate::error::{Error, Result};

/// Transcript fragments retained for display.
pub const TRANSCRIPT_CAPACITY: usize = 16;

pub struct SpeechBridge {
    recognition: Capability,
    synthesis: Capability,
    listening: bool,
    transcripts: Deque<String, TRANSCRIPT_CAPACITY>,
}

impl SpeechBridge {
    pub fn new(caps: &Capabilities) -> Self {
        Self {
            recognition: caps.speech_recognition,
            synthesis: caps.speech_synthesis,
            listening: false,
            transcripts: Deque::new(),
        }
    }

    pub fn start_recognition(&mut self, port: &mut impl SpeechPort) -> Result<()> {
        if !self.recognition.is_supported() {
            return Err(Error::CapabilityUnavailable(CapabilityKind::SpeechRecognition));
        }
        if self.listening {
            return Ok(());
        }
        port.start_recognition()?;
        self.listening = true;
        info!("Speech: listening");
        Ok(())
    }

    /// Drain fragments the provider has produced since the last poll.
    /// Returns only the new ones.
    pub fn poll_transcripts(&mut self, port: &mut impl SpeechPort) -> Vec<String> {
        let mut fresh = Vec::new();
        if !self.listening {
            return fresh;
        }
        while let Some(fragment) = port.next_transcript() {
            if self.transcripts.is_full() {
                self.transcripts.pop_front();
            }
            // Cannot fail: a slot was freed above.
            let _ = self.transcripts.push_back(fragment.clone());
            fresh.push(fragment);
        }
        fresh
    }

    pub fn stop(&mut self, port: &mut impl SpeechPort) {
        if self.listening {
            port.stop_recognition();
            self.listening = false;
            info!("Speech: stopped listening");
        }
    }

    pub fn speak(&mut self, port: &mut impl SpeechPort, text: &str) -> Result<()> {
        if !self.synthesis.is_supported() {
            return Err(Error::CapabilityUnavailable(CapabilityKind::SpeechSynthesis));
        }
        debug!("Speech: speaking {} chars", text.len());
        port.speak(text)?;
        Ok(())
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Most recent fragments, oldest first.
    pub fn transcripts(&self) -> impl Iterator<Item = &String> {
        self.transcripts.iter()
    }
}
