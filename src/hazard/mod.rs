//! Hazard detection: event catalog, injectable source, and the monitor
//! that turns the source into a cancellable emission schedule.
//!
//! ```text
//!  HazardSource (strategy) ──▶ HazardMonitor ──▶ Emission ──▶ AlertSink
//!   SimulatedHazards<Rng>      armed flag
//!   (future: classifier)       TimerSlot
//! ```

pub mod catalog;
pub mod monitor;
pub mod source;

pub use catalog::{CATALOG, HazardEvent, Severity};
pub use monitor::{Emission, HazardMonitor};
pub use source::{HazardSource, SimulatedHazards};
