//! Guardian: hazard alerts and SOS escalation for an accessibility companion.
//!
//! The core (`escalation`, `hazard`, `alert`, `app::service`) is pure logic
//! driven by caller-supplied monotonic milliseconds.  Device access goes
//! through the port traits in [`app::ports`]; host adapters live in
//! [`adapters`], embedded actuator drivers in [`drivers`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod alert;
pub mod app;
pub mod capability;
pub mod config;
pub mod drivers;
pub mod error;
pub mod escalation;
pub mod fsm;
pub mod hazard;
pub mod profile;
pub mod runtime;
pub mod speech;
pub mod timer;
