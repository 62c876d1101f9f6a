//! Control strategies: how a reading becomes a direction demand.
//!
//! | Strategy     | Demand source                          | Drive level          |
//! |--------------|----------------------------------------|----------------------|
//! | `Hysteresis` | raw error against the setpoint band    | fixed duties         |
//! | `PidSign`    | PID output beyond ±threshold           | proportional to \|u\| |

use serde::{Deserialize, Serialize};

use super::Mode;
use crate::control::pid::ControlOutput;

/// Rest band around the setpoint, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Deadband {
    /// How far below the target still counts as "at setpoint".
    pub below: f32,
    /// How far above the target still counts as "at setpoint".
    pub above: f32,
}

impl Deadband {
    pub const fn symmetric(width: f32) -> Self {
        Self {
            below: width,
            above: width,
        }
    }

    pub fn contains(&self, measured: f32, target: f32) -> bool {
        measured >= target - self.below && measured <= target + self.above
    }
}

impl Default for Deadband {
    fn default() -> Self {
        Self::symmetric(1.0)
    }
}

/// Direction the strategy asks for this iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Demand {
    Heat,
    Cool,
    /// No demand; the element should rest.
    Hold,
}

impl Demand {
    /// The active mode that satisfies this demand.
    pub fn mode(self) -> Mode {
        match self {
            Self::Heat => Mode::Heating,
            Self::Cool => Mode::Cooling,
            Self::Hold => Mode::Resting,
        }
    }
}

/// How hard to drive the element once a mode is committed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriveLevel {
    /// Configured fixed duties.
    Fixed,
    /// Duty scaled from the PID output magnitude.
    Proportional(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ControlStrategy {
    /// Threshold the raw temperature error against a rest band.
    Hysteresis { deadband: Deadband },
    /// Follow the sign of the PID output once it leaves ±`threshold`.
    PidSign { threshold: f32 },
}

impl Default for ControlStrategy {
    fn default() -> Self {
        Self::Hysteresis {
            deadband: Deadband::default(),
        }
    }
}

impl ControlStrategy {
    /// Desired direction for this iteration.
    ///
    /// In `Hysteresis`, the band only holds a resting element: once active,
    /// the element keeps its direction until the reading crosses the
    /// setpoint.
    pub fn demand(&self, measured: f32, target: f32, output: &ControlOutput, mode: Mode) -> Demand {
        match *self {
            Self::Hysteresis { deadband } => {
                if mode == Mode::Resting && deadband.contains(measured, target) {
                    Demand::Hold
                } else if measured > target {
                    Demand::Cool
                } else {
                    Demand::Heat
                }
            }
            Self::PidSign { threshold } => {
                if output.value > threshold {
                    Demand::Heat
                } else if output.value < -threshold {
                    Demand::Cool
                } else {
                    Demand::Hold
                }
            }
        }
    }

    pub fn drive_level(&self, output: &ControlOutput) -> DriveLevel {
        match self {
            Self::Hysteresis { .. } => DriveLevel::Fixed,
            Self::PidSign { .. } => DriveLevel::Proportional(output.value.abs()),
        }
    }
}
