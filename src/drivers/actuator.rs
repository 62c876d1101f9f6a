//! Actuator binder: arbiter decisions in, port calls out.
//!
//! Per active iteration the direction pin is written first, then the
//! element, outer fan, and inner fan duties.  A resting decision turns
//! all three PWM outputs off with the `(channel, 0, 0)` command and
//! leaves the direction pin alone; polarity only matters while current
//! flows.
//!
//! ## Safety contract
//!
//! [`de_energize`](ActuatorBinder::de_energize) is the single off path
//! used by rest decisions, fatal errors, and shutdown.  It attempts every
//! output even if an earlier one fails, then reports the first failure.

use log::{debug, warn};

use crate::app::ports::ActuatorPort;
use crate::config::{ActuationConfig, WiringConfig};
use crate::error::ActuatorError;
use crate::fsm::strategy::DriveLevel;
use crate::fsm::{Decision, Mode};

/// Outputs commanded by the last [`apply`](ActuatorBinder::apply).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputState {
    pub mode: Mode,
    /// Element and outer fan duty (millionths).
    pub element_duty: u32,
    /// Inner fan duty (millionths).
    pub inner_fan_duty: u32,
}

pub struct ActuatorBinder {
    wiring: WiringConfig,
    actuation: ActuationConfig,
    state: OutputState,
}

impl ActuatorBinder {
    pub fn new(wiring: WiringConfig, actuation: ActuationConfig) -> Self {
        Self {
            wiring,
            actuation,
            state: OutputState::default(),
        }
    }

    /// Issue the commands for one arbiter decision.
    pub fn apply(
        &mut self,
        decision: &Decision,
        hw: &mut impl ActuatorPort,
    ) -> Result<OutputState, ActuatorError> {
        if !decision.actuate || !decision.mode.is_active() {
            self.de_energize(hw)?;
            return Ok(self.state);
        }

        let element_duty = self.element_duty(decision.level);
        let inner_fan_duty = self.actuation.inner_fan_duty;
        let hz = self.actuation.pwm_frequency_hz;

        hw.write_pin(self.wiring.direction_pin, self.direction_level(decision.mode))?;
        hw.set_duty(self.wiring.element_channel, hz, element_duty)?;
        hw.set_duty(self.wiring.outer_fan_channel, hz, element_duty)?;
        hw.set_duty(
            self.wiring.inner_fan_channel,
            self.actuation.inner_fan_frequency_hz,
            inner_fan_duty,
        )?;

        let next = OutputState {
            mode: decision.mode,
            element_duty,
            inner_fan_duty,
        };
        if next != self.state {
            debug!(
                "Actuators: {} element={} inner={}",
                next.mode.label(),
                element_duty,
                inner_fan_duty
            );
        }
        self.state = next;
        Ok(next)
    }

    /// Turn every PWM output off.
    pub fn de_energize(&mut self, hw: &mut impl ActuatorPort) -> Result<(), ActuatorError> {
        let mut first_err = None;
        for ch in [
            self.wiring.element_channel,
            self.wiring.outer_fan_channel,
            self.wiring.inner_fan_channel,
        ] {
            if let Err(e) = hw.set_duty(ch, 0, 0) {
                warn!("Failed to switch off PWM channel {}: {}", ch, e);
                first_err.get_or_insert(e);
            }
        }
        self.state = OutputState::default();
        first_err.map_or(Ok(()), Err)
    }

    /// Level for the direction pin in an active mode.
    pub fn direction_level(&self, mode: Mode) -> bool {
        let cooling = mode == Mode::Cooling;
        cooling == self.wiring.cooling_level_high
    }

    fn element_duty(&self, level: DriveLevel) -> u32 {
        match level {
            DriveLevel::Fixed => self.actuation.element_duty,
            DriveLevel::Proportional(magnitude) => {
                let duty = magnitude.max(0.0) * self.actuation.duty_per_output_unit as f32;
                (duty as u32).min(self.actuation.max_duty)
            }
        }
    }

    pub fn state(&self) -> OutputState {
        self.state
    }
}
