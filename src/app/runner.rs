//! Control loop: the scheduler-timed outer loop around
//! [`ThermalController::tick`].
//!
//! ```text
//!   start ─▶ ┌─ stop flag set? ── yes ─▶ de-energize ─▶ Ok
//!            │        no
//!            │  CycleScheduler::run(tick)
//!            │        │ Err ─▶ (already de-energized) ─▶ Err
//!            └────────┘ Ok
//! ```
//!
//! The stop flag is read once at the top of every iteration, so an
//! iteration in progress always completes its actuation before shutdown.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{error, info};

use crate::config::SystemConfig;
use crate::error::Result;
use crate::scheduler::CycleScheduler;
use crate::setpoint::SetpointInbox;

use super::ports::{ActuatorPort, AdcPort, ConfigError, DisplayPort, EventSink};
use super::service::ThermalController;

/// How the loop ended without a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopExit {
    pub iterations: u64,
    pub overruns: u64,
}

pub struct ControlLoop {
    controller: ThermalController,
    scheduler: CycleScheduler,
}

impl ControlLoop {
    pub fn new(
        config: &SystemConfig,
        inbox: Arc<SetpointInbox>,
    ) -> core::result::Result<Self, ConfigError> {
        Ok(Self {
            controller: ThermalController::new(config, inbox)?,
            scheduler: CycleScheduler::new(Duration::from_millis(u64::from(
                config.control_period_ms,
            ))),
        })
    }

    /// Run until `stop` is set or a fatal error occurs.
    ///
    /// On `Err` the actuators have been de-energized and the fault latched.
    pub fn run(
        &mut self,
        hw: &mut (impl AdcPort + ActuatorPort),
        sink: &mut impl EventSink,
        display: &mut impl DisplayPort,
        stop: &AtomicBool,
    ) -> Result<LoopExit> {
        self.controller.start(hw, sink)?;
        info!(
            "Control loop running, period {:?}",
            self.scheduler.period()
        );

        loop {
            if stop.load(Ordering::Acquire) {
                self.controller.shutdown(hw, sink)?;
                return Ok(LoopExit {
                    iterations: self.scheduler.iterations(),
                    overruns: self.scheduler.overruns(),
                });
            }

            let controller = &mut self.controller;
            let (result, report) = self.scheduler.run(|| controller.tick(hw, sink, display));
            self.controller.note_cycle(report.elapsed);

            if let Err(e) = result {
                error!(
                    "Control loop halted after {} iterations: {e}",
                    self.scheduler.iterations()
                );
                return Err(e);
            }
        }
    }

    pub fn controller(&self) -> &ThermalController {
        &self.controller
    }
}
