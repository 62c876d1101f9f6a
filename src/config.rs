//! System configuration parameters
//!
//! All tunable parameters for the regulator.  Loaded once at process
//! start through a [`ConfigPort`](crate::app::ports::ConfigPort); there is
//! no hot reload.  Missing fields fall back to the defaults below.

use serde::{Deserialize, Serialize};

use crate::control::pid::PidConfig;
use crate::fsm::strategy::ControlStrategy;
use crate::pins;
use crate::sensors::MAX_CHANNEL;
use crate::sensors::thermistor::ThermistorModel;
use crate::setpoint::SetpointConfig;

/// Ceiling for the thread-driven inner fan PWM.
pub const MAX_SOFT_PWM_HZ: u32 = 1_000;

/// Unit used on the status display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

/// Sensing path: which ADC channels, how many passes, safety ceiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensingConfig {
    /// ADC channels with a thermistor attached (0–7).
    pub channels: heapless::Vec<u8, 8>,
    /// Measurement passes averaged per iteration.
    pub samples_per_pass: u16,
    /// Estimate above this (°C) trips the fail-fast cutoff.
    pub max_temperature_c: f32,
    pub model: ThermistorModel,
}

impl Default for SensingConfig {
    fn default() -> Self {
        let mut channels = heapless::Vec::new();
        channels.extend_from_slice(&[0, 2]).ok();
        Self {
            channels,
            samples_per_pass: 20,
            max_temperature_c: 40.0,
            model: ThermistorModel::default(),
        }
    }
}

/// Fixed drive levels.  Duties are in millionths of the PWM period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActuationConfig {
    /// Hardware PWM frequency for the element and outer fan.
    pub pwm_frequency_hz: u32,
    /// Inner fan frequency.  That output is bit-banged by a thread, so
    /// it stays within [`MAX_SOFT_PWM_HZ`].
    pub inner_fan_frequency_hz: u32,
    /// Element and outer (hot-side) fan duty when active.
    pub element_duty: u32,
    /// Inner (enclosure) fan duty when active.
    pub inner_fan_duty: u32,
    /// Duty per unit of PID output in the proportional strategy.
    pub duty_per_output_unit: u32,
    pub max_duty: u32,
}

impl Default for ActuationConfig {
    fn default() -> Self {
        Self {
            pwm_frequency_hz: 500_000,
            inner_fan_frequency_hz: 200,
            element_duty: 750_000,
            inner_fan_duty: 500_000,
            duty_per_output_unit: 10_000,
            max_duty: 1_000_000,
        }
    }
}

/// Pin and channel assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WiringConfig {
    /// H-bridge direction output.
    pub direction_pin: u8,
    /// Direction pin level that selects cooling.
    pub cooling_level_high: bool,
    pub element_channel: u8,
    pub outer_fan_channel: u8,
    pub inner_fan_channel: u8,
    pub increment_pin: u8,
    pub decrement_pin: u8,
    pub button_debounce_ms: u32,
}

impl Default for WiringConfig {
    fn default() -> Self {
        Self {
            direction_pin: pins::DIRECTION_GPIO,
            cooling_level_high: true,
            element_channel: pins::ELEMENT_PWM_CHANNEL,
            outer_fan_channel: pins::OUTER_FAN_PWM_CHANNEL,
            inner_fan_channel: pins::INNER_FAN_PWM_CHANNEL,
            increment_pin: pins::SETPOINT_UP_GPIO,
            decrement_pin: pins::SETPOINT_DOWN_GPIO,
            button_debounce_ms: 50,
        }
    }
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Timing ---
    /// Minimum duration of one control iteration (milliseconds)
    pub control_period_ms: u32,
    /// Render status and telemetry every N iterations
    pub display_every: u32,

    // --- Sensing ---
    pub sensing: SensingConfig,

    // --- Control ---
    pub pid: PidConfig,
    pub strategy: ControlStrategy,
    pub setpoint: SetpointConfig,

    // --- Output ---
    pub actuation: ActuationConfig,
    pub wiring: WiringConfig,
    pub display_unit: TemperatureUnit,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            control_period_ms: 500,
            display_every: 10,
            sensing: SensingConfig::default(),
            pid: PidConfig::default(),
            strategy: ControlStrategy::default(),
            setpoint: SetpointConfig::default(),
            actuation: ActuationConfig::default(),
            wiring: WiringConfig::default(),
            display_unit: TemperatureUnit::Celsius,
        }
    }
}

impl SystemConfig {
    /// Control period in seconds (the PID's `dt`).
    pub fn control_period_secs(&self) -> f32 {
        self.control_period_ms as f32 / 1000.0
    }

    /// Range-check every field.  The message names the offending field.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.control_period_ms == 0 {
            return Err("control_period_ms must be > 0");
        }
        if self.sensing.channels.is_empty() {
            return Err("sensing.channels must not be empty");
        }
        if self.sensing.channels.iter().any(|&ch| ch > MAX_CHANNEL) {
            return Err("sensing.channels must be 0-7");
        }
        if self.sensing.samples_per_pass == 0 {
            return Err("sensing.samples_per_pass must be > 0");
        }
        if !self.sensing.max_temperature_c.is_finite() {
            return Err("sensing.max_temperature_c must be finite");
        }
        if self.pid.output_min >= self.pid.output_max {
            return Err("pid.output_min must be below pid.output_max");
        }
        match self.strategy {
            ControlStrategy::Hysteresis { deadband } => {
                if deadband.below < 0.0 || deadband.above < 0.0 {
                    return Err("strategy.deadband must be non-negative");
                }
            }
            ControlStrategy::PidSign { threshold } => {
                if threshold < 0.0 {
                    return Err("strategy.threshold must be non-negative");
                }
            }
        }
        let sp = &self.setpoint;
        if sp.min > sp.max || sp.initial < sp.min || sp.initial > sp.max {
            return Err("setpoint.initial must lie within [min, max]");
        }
        if sp.max as f32 > self.sensing.max_temperature_c {
            return Err("setpoint.max must not exceed sensing.max_temperature_c");
        }
        let act = &self.actuation;
        if act.inner_fan_frequency_hz == 0 || act.inner_fan_frequency_hz > MAX_SOFT_PWM_HZ {
            return Err("actuation.inner_fan_frequency_hz must be 1-1000");
        }
        if act.element_duty > act.max_duty || act.inner_fan_duty > act.max_duty {
            return Err("actuation duties must not exceed max_duty");
        }
        Ok(())
    }
}
