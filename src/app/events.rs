//! Outbound application events.
//!
//! The [`ThermalController`](super::service::ThermalController) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on the
//! other side decide what to do with them; the shipped one logs them.

use crate::error::SafetyFault;
use crate::fsm::Mode;

/// Structured events emitted by the control core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The loop has started (carries the initial setpoint).
    Started { target: i32 },

    /// The arbiter committed a new mode.
    ModeChanged { from: Mode, to: Mode },

    /// A reversal demand was turned into a rest cycle.
    ReversalBlocked { from: Mode },

    /// Button presses moved the setpoint.
    SetpointChanged { target: i32 },

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),

    /// A fatal fault de-energized the actuators.
    SafetyTrip(SafetyFault),

    /// The stop flag was observed and the actuators are off.
    Shutdown { iterations: u64 },
}

/// A point-in-time snapshot of one control iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryData {
    pub iteration: u64,
    pub celsius: f32,
    pub target: i32,
    pub mode: Mode,
    /// PID output before arbitration.
    pub control_output: f32,
    pub element_duty: u32,
    pub inner_fan_duty: u32,
    /// Measured length of the previous iteration (the PID's real `dt`).
    pub last_cycle_ms: u32,
}
