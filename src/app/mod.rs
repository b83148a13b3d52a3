//! Application core: pure domain orchestration, no direct I/O.
//!
//! The escalation machine, hazard monitor, alert sink, and speech bridge
//! are wired together here.  Everything outside the process (storage,
//! haptics, notification delivery, location, speech, logging) is reached
//! through the **port traits** in [`ports`], so the whole core runs under
//! test with recording mocks.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
pub mod snapshot;
