//! Thermal controller: the hexagonal core.
//!
//! [`ThermalController`] owns the estimator, PID, mode arbiter, actuator
//! binder, safety supervisor, and setpoint.  All I/O flows through port
//! traits injected at call sites, so one iteration runs unchanged against
//! real peripherals or the mocks in `tests/`.
//!
//! ```text
//!     AdcPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │       ThermalController      │
//! ActuatorPort ◀──│ estimate · PID · arbiter ·   │ ──▶ DisplayPort
//!                 │ binder · safety · setpoint   │
//!                 └──────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};

use crate::config::{SystemConfig, TemperatureUnit};
use crate::control::pid::{ControlOutput, PidController};
use crate::drivers::actuator::{ActuatorBinder, OutputState};
use crate::error::{Error, Result, SafetyFault};
use crate::fsm::{Decision, Mode, ModeArbiter};
use crate::safety::SafetySupervisor;
use crate::sensors::thermistor::to_fahrenheit;
use crate::sensors::{TemperatureEstimate, TemperatureEstimator};
use crate::setpoint::{Setpoint, SetpointInbox};

use super::events::{AppEvent, TelemetryData};
use super::ports::{ActuatorPort, AdcPort, ConfigError, DisplayPort, EventSink};

/// What one iteration measured and commanded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub estimate: TemperatureEstimate,
    pub target: i32,
    pub output: ControlOutput,
    pub decision: Decision,
    pub outputs: OutputState,
}

pub struct ThermalController {
    estimator: TemperatureEstimator,
    pid: PidController,
    arbiter: ModeArbiter,
    binder: ActuatorBinder,
    safety: SafetySupervisor,
    setpoint: Setpoint,
    inbox: Arc<SetpointInbox>,
    display_every: u32,
    display_unit: TemperatureUnit,
    iteration: u64,
    last_cycle: Duration,
}

impl ThermalController {
    /// Build the controller.  Rejects a config that fails
    /// [`SystemConfig::validate`].
    pub fn new(
        config: &SystemConfig,
        inbox: Arc<SetpointInbox>,
    ) -> core::result::Result<Self, ConfigError> {
        config.validate().map_err(ConfigError::ValidationFailed)?;
        Ok(Self {
            estimator: TemperatureEstimator::new(&config.sensing),
            pid: PidController::new(&config.pid, config.control_period_secs()),
            arbiter: ModeArbiter::new(config.strategy),
            binder: ActuatorBinder::new(config.wiring, config.actuation),
            safety: SafetySupervisor::new(),
            setpoint: Setpoint::new(&config.setpoint),
            inbox,
            display_every: config.display_every,
            display_unit: config.display_unit,
            iteration: 0,
            last_cycle: Duration::from_millis(u64::from(config.control_period_ms)),
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Put the outputs in a known-off state and announce the start.
    pub fn start(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) -> Result<()> {
        if let Err(e) = self.binder.de_energize(hw) {
            let err = Error::from(e);
            self.safety.trip(&err, &mut self.binder, hw, sink);
            return Err(err);
        }
        info!(
            "Controller started: target {}\u{00b0}C, {:?}",
            self.setpoint.target(),
            self.arbiter.strategy()
        );
        sink.emit(&AppEvent::Started {
            target: self.setpoint.target(),
        });
        Ok(())
    }

    /// Graceful stop: switch every output off and report.
    pub fn shutdown(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) -> Result<()> {
        self.binder.de_energize(hw)?;
        info!("Controller stopped after {} iterations", self.iteration);
        sink.emit(&AppEvent::Shutdown {
            iterations: self.iteration,
        });
        Ok(())
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// Run one control iteration: setpoint → estimate → PID → arbiter →
    /// actuators → status.
    ///
    /// Any error has already de-energized the actuators by the time it is
    /// returned; the caller only has to stop looping.
    pub fn tick(
        &mut self,
        hw: &mut (impl AdcPort + ActuatorPort),
        sink: &mut impl EventSink,
        display: &mut impl DisplayPort,
    ) -> Result<TickReport> {
        match self.step(hw, sink, display) {
            Ok(report) => Ok(report),
            Err(err) => {
                self.safety.trip(&err, &mut self.binder, hw, sink);
                Err(err)
            }
        }
    }

    fn step(
        &mut self,
        hw: &mut (impl AdcPort + ActuatorPort),
        sink: &mut impl EventSink,
        display: &mut impl DisplayPort,
    ) -> Result<TickReport> {
        if self.safety.is_tripped() {
            return Err(Error::Safety(self.first_fault()));
        }

        // 1. One stable target for the whole iteration
        if let Some(target) = self.inbox.drain_into(&mut self.setpoint) {
            sink.emit(&AppEvent::SetpointChanged { target });
        }
        let target = self.setpoint.target();

        // 2. Sense
        let estimate = self.estimator.estimate(hw)?;

        // 3. Control
        let output = self.pid.compute(target as f32, estimate.celsius);

        // 4. Arbitrate
        let prev = self.arbiter.mode();
        let decision = self.arbiter.evaluate(estimate.celsius, target as f32, &output);
        if decision.reversal_blocked {
            sink.emit(&AppEvent::ReversalBlocked { from: prev });
        }
        if decision.mode != prev {
            sink.emit(&AppEvent::ModeChanged {
                from: prev,
                to: decision.mode,
            });
        }

        // 5. Actuate
        let outputs = self.binder.apply(&decision, hw)?;

        let report = TickReport {
            estimate,
            target,
            output,
            decision,
            outputs,
        };

        // 6. Status
        if self.display_every != 0 && self.iteration % u64::from(self.display_every) == 0 {
            self.report_status(&report, sink, display);
        }
        self.iteration += 1;
        Ok(report)
    }

    fn report_status(
        &self,
        report: &TickReport,
        sink: &mut impl EventSink,
        display: &mut impl DisplayPort,
    ) {
        let text = self.status_text(report.estimate.celsius, report.target, report.decision.mode);
        if let Err(e) = display.render(&text) {
            warn!("Status display: {e}");
        }
        sink.emit(&AppEvent::Telemetry(TelemetryData {
            iteration: self.iteration,
            celsius: report.estimate.celsius,
            target: report.target,
            mode: report.decision.mode,
            control_output: report.output.value,
            element_duty: report.outputs.element_duty,
            inner_fan_duty: report.outputs.inner_fan_duty,
            last_cycle_ms: u32::try_from(self.last_cycle.as_millis()).unwrap_or(u32::MAX),
        }));
    }

    /// Two-line status text in the configured unit.
    pub fn status_text(&self, celsius: f32, target: i32, mode: Mode) -> String {
        let (temp, goal, unit) = match self.display_unit {
            TemperatureUnit::Celsius => (celsius, target as f32, 'C'),
            TemperatureUnit::Fahrenheit => {
                (to_fahrenheit(celsius), to_fahrenheit(target as f32), 'F')
            }
        };
        format!(
            "Temp: {:.1}\u{00b0}{} | Mode: {}\n     ({:.0}\u{00b0}{})",
            temp,
            unit,
            mode.label(),
            goal,
            unit
        )
    }

    /// Record the measured length of the iteration that just ended.
    pub fn note_cycle(&mut self, elapsed: Duration) {
        self.last_cycle = elapsed;
    }

    fn first_fault(&self) -> SafetyFault {
        [
            SafetyFault::OverTemperature,
            SafetyFault::SensorTransport,
            SafetyFault::ActuatorTransport,
        ]
        .into_iter()
        .find(|f| self.safety.has_fault(*f))
        .unwrap_or(SafetyFault::ActuatorTransport)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.arbiter.mode()
    }

    pub fn target(&self) -> i32 {
        self.setpoint.target()
    }

    /// Iterations completed since start.
    pub fn iterations(&self) -> u64 {
        self.iteration
    }

    pub fn safety(&self) -> &SafetySupervisor {
        &self.safety
    }

    /// Jump the arbiter to `mode` (tests and bring-up).
    pub fn force_mode(&mut self, mode: Mode) {
        self.arbiter.force_mode(mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_text_celsius() {
        let c = ThermalController::new(&SystemConfig::default(), Arc::default()).unwrap();
        assert_eq!(
            c.status_text(24.26, 23, Mode::Cooling),
            "Temp: 24.3\u{00b0}C | Mode: COOL\n     (23\u{00b0}C)"
        );
    }

    #[test]
    fn status_text_fahrenheit() {
        let config = SystemConfig {
            display_unit: TemperatureUnit::Fahrenheit,
            ..SystemConfig::default()
        };
        let c = ThermalController::new(&config, Arc::default()).unwrap();
        assert_eq!(
            c.status_text(20.0, 20, Mode::Resting),
            "Temp: 68.0\u{00b0}F | Mode: REST\n     (68\u{00b0}F)"
        );
    }

    #[test]
    fn inverted_setpoint_bounds_are_rejected() {
        let mut config = SystemConfig::default();
        config.setpoint.min = 30;
        config.setpoint.max = 10;
        assert!(matches!(
            ThermalController::new(&config, Arc::default()),
            Err(ConfigError::ValidationFailed(_))
        ));
    }
}
