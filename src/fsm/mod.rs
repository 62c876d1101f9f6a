//! Mode arbiter: the hysteresis / interlock state machine.
//!
//! ```text
//!            ┌────────── [demand Cool] ──────────┐
//!            │                                   ▼
//!        RESTING ◀── [reversal: one rest cycle] ─ COOLING
//!         ▲  │                                   ▲
//!         │  └────────── [demand Heat] ─────┐    │
//!         │                                 ▼    │
//!         └──── [reversal: one rest cycle] ─ HEATING
//! ```
//!
//! Reversing Peltier polarity under load is destructive, so a demand for
//! the opposite direction while active never switches directly: the
//! debounce counter is raised, the element is forced to rest for that
//! iteration, and the counter is consumed.  The next iteration starts
//! from `Resting` and may commit the new direction.

pub mod strategy;

use log::{debug, info};

use crate::control::pid::ControlOutput;
use strategy::{ControlStrategy, Demand, DriveLevel};

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// Actuation mode.  Persists across iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Mode {
    #[default]
    Resting = 0,
    Heating = 1,
    Cooling = 2,
}

impl Mode {
    /// Short label used on the status display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Resting => "REST",
            Self::Heating => "HEAT",
            Self::Cooling => "COOL",
        }
    }

    /// The conflicting active mode, if any.
    pub fn opposite(self) -> Option<Self> {
        match self {
            Self::Resting => None,
            Self::Heating => Some(Self::Cooling),
            Self::Cooling => Some(Self::Heating),
        }
    }

    pub fn is_active(self) -> bool {
        self != Self::Resting
    }
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// Outcome of one arbitration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub mode: Mode,
    /// Energize the element and fans this iteration.
    pub actuate: bool,
    /// A reversal was requested and converted into a rest cycle.
    pub reversal_blocked: bool,
    pub level: DriveLevel,
}

// ---------------------------------------------------------------------------
// Arbiter
// ---------------------------------------------------------------------------

pub struct ModeArbiter {
    strategy: ControlStrategy,
    mode: Mode,
    debounce: u32,
}

impl ModeArbiter {
    pub fn new(strategy: ControlStrategy) -> Self {
        Self {
            strategy,
            mode: Mode::Resting,
            debounce: 0,
        }
    }

    /// Run the transition function for one iteration.
    pub fn evaluate(&mut self, measured: f32, target: f32, output: &ControlOutput) -> Decision {
        let demand = self.strategy.demand(measured, target, output, self.mode);
        let decision = self.apply(demand, self.strategy.drive_level(output));
        debug!(
            "Arbiter: measured={:.2} target={:.1} u={:.1} demand={:?} -> {:?}",
            measured, target, output.value, demand, decision.mode
        );
        decision
    }

    /// Apply a demand to the current mode.
    pub fn apply(&mut self, demand: Demand, level: DriveLevel) -> Decision {
        let prev = self.mode;

        match demand {
            Demand::Hold => self.mode = Mode::Resting,
            Demand::Heat | Demand::Cool => {
                let wanted = demand.mode();
                if wanted.opposite() == Some(self.mode) {
                    self.debounce += 1;
                } else {
                    self.mode = wanted;
                }
            }
        }

        let reversal_blocked = self.debounce > 0;
        let actuate = if reversal_blocked || self.mode == Mode::Resting {
            self.mode = Mode::Resting;
            self.debounce = 0;
            false
        } else {
            true
        };

        if reversal_blocked {
            info!(
                "Arbiter: {} -> {} reversal held for one rest cycle",
                prev.label(),
                demand.mode().label()
            );
        } else if prev != self.mode {
            info!("Arbiter: {} -> {}", prev.label(), self.mode.label());
        }

        Decision {
            mode: self.mode,
            actuate,
            reversal_blocked,
            level,
        }
    }

    /// Current mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Pending reversal count.  Always zero between iterations.
    pub fn debounce_counter(&self) -> u32 {
        self.debounce
    }

    /// Jump straight to `mode` (startup and tests).
    pub fn force_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.debounce = 0;
    }

    pub fn strategy(&self) -> &ControlStrategy {
        &self.strategy
    }
}
