//! H-bridge direction output.
//!
//! A dumb actuator over any `embedded-hal` output pin.  Polarity policy
//! (which level means cooling) belongs to the
//! [`ActuatorBinder`](super::actuator::ActuatorBinder); this driver only
//! remembers the last level it wrote so redundant writes are skipped.

use embedded_hal::digital::OutputPin;

use crate::error::ActuatorError;

pub struct DirectionPin<P> {
    pin: P,
    level: Option<bool>,
}

impl<P: OutputPin> DirectionPin<P> {
    pub fn new(pin: P) -> Self {
        Self { pin, level: None }
    }

    /// Drive the pin.  The first call always writes.
    pub fn drive(&mut self, high: bool) -> Result<(), ActuatorError> {
        if self.level == Some(high) {
            return Ok(());
        }
        let res = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        res.map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.level = Some(high);
        Ok(())
    }

    /// Last level successfully written, if any.
    pub fn level(&self) -> Option<bool> {
        self.level
    }
}
