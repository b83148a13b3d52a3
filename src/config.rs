//! Runtime configuration parameters
//!
//! Tunables for the host runtime and the service.  User-facing settings
//! live in [`crate::profile::Preferences`]; this struct only carries what
//! the operator chooses at launch (CLI flags in the binary).

use core::time::Duration;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::app::ports::Location;
use crate::error::Error;

/// Runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    // --- Persistence ---
    /// Backing file for the profile store.  `None` keeps everything in memory.
    pub store_path: Option<PathBuf>,

    // --- Dispatch ---
    /// Upper bound on a single contact notification (milliseconds).
    pub dispatch_timeout_ms: u32,

    // --- Timing ---
    /// Longest the control loop sleeps with nothing scheduled (milliseconds).
    pub idle_poll_ms: u32,

    // --- Simulation ---
    /// Seed for the simulated hazard source; `None` draws from OS entropy.
    pub hazard_seed: Option<u64>,
    /// Report console-simulated haptics as supported.
    pub haptics_simulated: bool,
    /// Report console-simulated speech synthesis as supported.
    pub speech_simulated: bool,
    /// Fixed position attached to emergency notifications.
    pub location: Option<Location>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            store_path: None,
            dispatch_timeout_ms: 5_000,
            idle_poll_ms: 250,
            hazard_seed: None,
            haptics_simulated: false,
            speech_simulated: false,
            location: None,
        }
    }
}

impl RuntimeConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if !(100..=60_000).contains(&self.dispatch_timeout_ms) {
            return Err(Error::Config("dispatch_timeout_ms must be 100–60000"));
        }
        if !(10..=5_000).contains(&self.idle_poll_ms) {
            return Err(Error::Config("idle_poll_ms must be 10–5000"));
        }
        if let Some(loc) = &self.location {
            if !(-90.0..=90.0).contains(&loc.latitude) || !(-180.0..=180.0).contains(&loc.longitude)
            {
                return Err(Error::Config("location is outside valid lat/lon range"));
            }
        }
        Ok(())
    }

    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.dispatch_timeout_ms))
    }
}
