//! Where hazard events and their timing come from.
//!
//! [`HazardSource`] is the strategy seam: the monitor only asks "how long
//! until the next event" and "what is it".  [`SimulatedHazards`] answers
//! with uniform random draws; a real classifier would implement the same
//! trait without the monitor, alert sink, or escalation noticing.

use core::ops::Range;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::catalog::{CATALOG, HazardEvent, catalog_event};

/// Delay before the first emission of a freshly armed sequence.
pub const FIRST_INTERVAL_MS: Range<u64> = 5_000..15_000;
/// Delay between subsequent emissions.
pub const NEXT_INTERVAL_MS: Range<u64> = 10_000..25_000;

pub trait HazardSource {
    /// Delay from `start()` to the first emission (ms).
    fn first_interval_ms(&mut self) -> u64;

    /// Delay from one emission to the next (ms).
    fn next_interval_ms(&mut self) -> u64;

    /// The hazard to report at an emission.
    fn next_hazard(&mut self) -> HazardEvent;
}

/// Random hazards from the fixed catalog, driven by an injected RNG.
#[derive(Debug, Clone)]
pub struct SimulatedHazards<R> {
    rng: R,
}

impl SimulatedHazards<StdRng> {
    /// Deterministic schedule for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl<R: Rng> SimulatedHazards<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> HazardSource for SimulatedHazards<R> {
    fn first_interval_ms(&mut self) -> u64 {
        self.rng.gen_range(FIRST_INTERVAL_MS)
    }

    fn next_interval_ms(&mut self) -> u64 {
        self.rng.gen_range(NEXT_INTERVAL_MS)
    }

    fn next_hazard(&mut self) -> HazardEvent {
        catalog_event(self.rng.gen_range(0..CATALOG.len()))
    }
}
