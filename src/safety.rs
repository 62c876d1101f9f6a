//! Safety supervisor.
//!
//! Every fatal condition reaching the control loop passes through
//! [`SafetySupervisor::trip`], which latches a bit in the fault mask and,
//! on the first trip only, de-energizes the actuators and reports the
//! fault.
//!
//! ## Fault lifecycle
//!
//! 1. A sensing, actuation, or over-temperature error surfaces in a tick.
//! 2. The supervisor sets the corresponding bit in its fault mask.
//! 3. If this is the first trip, every PWM output is switched off and a
//!    [`AppEvent::SafetyTrip`] is emitted.
//! 4. The loop stops.  Faults are never cleared; recovery is a restart.
//!
//! Later errors (for instance a failed write during the de-energize
//! itself) still latch their bit but never repeat the off sequence.

use log::{error, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{ActuatorPort, EventSink};
use crate::drivers::actuator::ActuatorBinder;
use crate::error::{Error, SafetyFault};

/// Safety supervisor.
#[derive(Debug, Default)]
pub struct SafetySupervisor {
    /// Latched fault bitmask.
    faults: u8,
    /// Number of times the off sequence ran (0 or 1).
    de_energized: u32,
}

impl SafetySupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latch `err` and run the off sequence if nothing has tripped yet.
    ///
    /// Returns `true` if this call de-energized the actuators.
    pub fn trip(
        &mut self,
        err: &Error,
        binder: &mut ActuatorBinder,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> bool {
        let fault = err.fault();
        let first = !self.is_tripped();
        self.latch(fault);

        if !first {
            warn!("Additional fault after trip: {err}");
            return false;
        }

        error!("SAFETY TRIP: {err}; de-energizing");
        if let Err(e) = binder.de_energize(hw) {
            self.latch(SafetyFault::ActuatorTransport);
            error!("De-energize incomplete: {e}");
        }
        self.de_energized += 1;
        sink.emit(&AppEvent::SafetyTrip(fault));
        true
    }

    /// Current fault bitmask.
    pub fn faults(&self) -> u8 {
        self.faults
    }

    /// True once any fault has been latched.
    pub fn is_tripped(&self) -> bool {
        self.faults != 0
    }

    /// Check if a specific fault is latched.
    pub fn has_fault(&self, fault: SafetyFault) -> bool {
        self.faults & fault.mask() != 0
    }

    /// Times the off sequence has run.
    pub fn de_energize_count(&self) -> u32 {
        self.de_energized
    }

    fn latch(&mut self, fault: SafetyFault) {
        if !self.has_fault(fault) {
            error!("SAFETY FAULT SET: {fault}");
        }
        self.faults |= fault.mask();
    }
}
