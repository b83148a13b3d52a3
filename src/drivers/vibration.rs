//! Eccentric-rotating-mass vibration motor on a single GPIO.
//!
//! Plays an on/off millisecond pattern by toggling the pin, blocking on
//! the provided delay.  Patterns start "on" and the pin is always left low
//! afterwards, even if a pin write fails part way through.
//!
//! Generic over `embedded-hal` 1.0 traits, so it runs on any HAL that
//! provides an [`OutputPin`] and a [`DelayNs`].

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::ports::HapticPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorState {
    Off,
    On,
}

pub struct VibrationMotor<P, D> {
    pin: P,
    delay: D,
    state: MotorState,
}

impl<P: OutputPin, D: DelayNs> VibrationMotor<P, D> {
    pub fn new(pin: P, delay: D) -> Self {
        Self {
            pin,
            delay,
            state: MotorState::Off,
        }
    }

    /// Play `pattern`; even indices are "on" durations, odd are "off".
    pub fn play(&mut self, pattern: &[u16]) -> Result<(), P::Error> {
        let result = self.run(pattern);
        let off = self.set(MotorState::Off);
        result.and(off)
    }

    fn run(&mut self, pattern: &[u16]) -> Result<(), P::Error> {
        for (i, ms) in pattern.iter().enumerate() {
            let state = if i % 2 == 0 {
                MotorState::On
            } else {
                MotorState::Off
            };
            self.set(state)?;
            self.delay.delay_ms(u32::from(*ms));
        }
        Ok(())
    }

    fn set(&mut self, state: MotorState) -> Result<(), P::Error> {
        match state {
            MotorState::On => self.pin.set_high()?,
            MotorState::Off => self.pin.set_low()?,
        }
        self.state = state;
        Ok(())
    }

    pub fn state(&self) -> MotorState {
        self.state
    }

    /// Release the pin and delay.
    pub fn release(self) -> (P, D) {
        (self.pin, self.delay)
    }
}

impl<P: OutputPin, D: DelayNs> HapticPort for VibrationMotor<P, D> {
    fn haptics_supported(&self) -> bool {
        true
    }

    fn vibrate(&mut self, pattern: &[u16]) {
        if let Err(e) = self.play(pattern) {
            warn!("VibrationMotor: pin error {:?}", e);
        }
    }
}
