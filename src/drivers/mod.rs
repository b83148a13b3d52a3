//! Actuator drivers for embedded targets.

pub mod vibration;
