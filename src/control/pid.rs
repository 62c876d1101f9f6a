//! PID controller for the enclosure temperature
//!
//! Discrete proportional-integral-derivative controller evaluated once
//! per control period.  Positive output is heating demand, negative is
//! cooling demand.

use serde::{Deserialize, Serialize};

/// Gains and output bounds, fixed for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidConfig {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
    pub output_min: f32,
    pub output_max: f32,
}

impl Default for PidConfig {
    fn default() -> Self {
        Self {
            kp: 8.0,
            ki: 0.3,
            kd: 0.1,
            output_min: -100.0,
            output_max: 100.0,
        }
    }
}

/// One bounded controller output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlOutput {
    pub value: f32,
    pub min: f32,
    pub max: f32,
}

impl ControlOutput {
    pub fn is_saturated(&self) -> bool {
        self.value >= self.max || self.value <= self.min
    }
}

/// PID controller
pub struct PidController {
    kp: f32,
    ki: f32,
    kd: f32,
    /// Nominal seconds between calls.
    dt: f32,
    integral: f32,
    prev_error: f32,
    output_min: f32,
    output_max: f32,
}

impl PidController {
    pub fn new(config: &PidConfig, dt: f32) -> Self {
        Self {
            kp: config.kp,
            ki: config.ki,
            kd: config.kd,
            dt,
            integral: 0.0,
            prev_error: 0.0,
            output_min: config.output_min,
            output_max: config.output_max,
        }
    }

    /// Compute the output for one control period.
    pub fn compute(&mut self, target: f32, measured: f32) -> ControlOutput {
        let dt = self.dt;
        let error = target - measured;

        // Proportional
        let p = self.kp * error;

        // Integral, with the integral term itself bounded to the output range
        self.integral += error * dt;
        let i = self.clamp_integral();

        // Derivative
        let derivative = if dt > 0.0 {
            (error - self.prev_error) / dt
        } else {
            0.0
        };
        let d = self.kd * derivative;

        self.prev_error = error;

        let unclamped = p + i + d;
        let value = unclamped.clamp(self.output_min, self.output_max);

        // Anti-windup: while saturated, stop integrating in the saturating direction
        if (unclamped > self.output_max && error > 0.0)
            || (unclamped < self.output_min && error < 0.0)
        {
            self.integral -= error * dt;
        }

        ControlOutput {
            value,
            min: self.output_min,
            max: self.output_max,
        }
    }

    /// Reset controller state
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = 0.0;
    }

    /// Current integral term contribution (`Ki · ∫e dt`).
    pub fn integral_term(&self) -> f32 {
        self.ki * self.integral
    }

    fn clamp_integral(&mut self) -> f32 {
        let term = self.ki * self.integral;
        let bounded = term.clamp(self.output_min, self.output_max);
        if self.ki != 0.0 && bounded != term {
            self.integral = bounded / self.ki;
        }
        bounded
    }
}
