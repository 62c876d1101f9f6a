//! Integration tests for one `ThermalController` iteration:
//! ADC → estimate → PID → arbiter → actuator calls.

use std::sync::Arc;

use crate::mock_hw::{ActuatorCall, MockHardware, RecordingDisplay, RecordingSink};

use thermobox::app::events::AppEvent;
use thermobox::app::service::ThermalController;
use thermobox::config::SystemConfig;
use thermobox::error::{Error, SafetyFault, SensorError};
use thermobox::fsm::Mode;
use thermobox::fsm::strategy::{ControlStrategy, Deadband};
use thermobox::setpoint::{SetpointAdjust, SetpointInbox};

/// Band wide enough below the setpoint that 20 °C against 23 °C rests.
fn scenario_config() -> SystemConfig {
    SystemConfig {
        strategy: ControlStrategy::Hysteresis {
            deadband: Deadband {
                below: 3.0,
                above: 1.0,
            },
        },
        ..SystemConfig::default()
    }
}

fn controller(config: &SystemConfig) -> ThermalController {
    ThermalController::new(config, Arc::new(SetpointInbox::new())).unwrap()
}

struct Rig {
    ctl: ThermalController,
    hw: MockHardware,
    sink: RecordingSink,
    display: RecordingDisplay,
}

impl Rig {
    fn new(config: &SystemConfig, celsius: f32) -> Self {
        Self {
            ctl: controller(config),
            hw: MockHardware::at(celsius),
            sink: RecordingSink::new(),
            display: RecordingDisplay::default(),
        }
    }

    fn tick(&mut self) -> Result<thermobox::app::service::TickReport, Error> {
        self.ctl.tick(&mut self.hw, &mut self.sink, &mut self.display)
    }
}

// ── Mode arbiter transition table ────────────────────────────

#[test]
fn resting_within_band_stays_resting() {
    let mut rig = Rig::new(&scenario_config(), 20.0);
    let report = rig.tick().unwrap();
    assert_eq!(report.decision.mode, Mode::Resting);
    assert!(!report.decision.actuate);
    assert!(rig.hw.pin_writes().is_empty());
    assert_eq!(rig.hw.off_commands(), 3);
    assert!(!rig.hw.energized());
}

#[test]
fn too_hot_from_rest_cools_with_direction_high() {
    let mut rig = Rig::new(&scenario_config(), 25.0);
    let report = rig.tick().unwrap();
    assert_eq!(report.decision.mode, Mode::Cooling);
    assert!(report.decision.actuate);
    assert_eq!(rig.hw.pin_writes(), vec![(23, true)]);
    assert_eq!(
        rig.hw.calls[0],
        ActuatorCall::WritePin {
            pin: 23,
            level: true
        },
        "direction is set before any duty"
    );
    assert!(rig.hw.energized());
}

#[test]
fn reversal_is_interlocked_for_exactly_one_cycle() {
    let mut rig = Rig::new(&scenario_config(), 25.0);
    rig.ctl.force_mode(Mode::Heating);

    let report = rig.tick().unwrap();
    assert_eq!(report.decision.mode, Mode::Resting);
    assert!(!report.decision.actuate);
    assert!(report.decision.reversal_blocked);
    assert!(!rig.hw.energized());
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::ReversalBlocked { from: Mode::Heating })),
        1
    );

    rig.hw.clear();
    let report = rig.tick().unwrap();
    assert_eq!(report.decision.mode, Mode::Cooling);
    assert!(report.decision.actuate);
    assert_eq!(rig.hw.pin_writes(), vec![(23, true)]);
}

#[test]
fn never_drives_both_directions_back_to_back() {
    let mut rig = Rig::new(&scenario_config(), 18.0);
    assert_eq!(rig.tick().unwrap().decision.mode, Mode::Heating);
    rig.hw.set_celsius(26.0);
    assert_eq!(rig.tick().unwrap().decision.mode, Mode::Resting);
    assert_eq!(rig.tick().unwrap().decision.mode, Mode::Cooling);
}

// ── Safety ───────────────────────────────────────────────────

#[test]
fn over_temperature_de_energizes_exactly_once() {
    let mut config = scenario_config();
    config.sensing.max_temperature_c = 40.0;
    let mut rig = Rig::new(&config, 41.0);

    let err = rig.tick().unwrap_err();
    assert_eq!(err, Error::Safety(SafetyFault::OverTemperature));
    assert_eq!(rig.hw.off_commands(), 3);
    assert!(!rig.hw.energized());
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::SafetyTrip(_))), 1);

    // A caller that ignores the error still cannot re-energize.
    rig.hw.set_celsius(23.0);
    assert!(rig.tick().is_err());
    assert_eq!(rig.hw.off_commands(), 3);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::SafetyTrip(_))), 1);
    assert_eq!(rig.ctl.safety().de_energize_count(), 1);
}

#[test]
fn over_temperature_while_active_cuts_power() {
    let mut rig = Rig::new(&scenario_config(), 18.0);
    rig.tick().unwrap();
    assert!(rig.hw.energized());

    rig.hw.set_celsius(41.0);
    assert!(rig.tick().is_err());
    assert!(!rig.hw.energized());
}

#[test]
fn sensor_transport_failure_is_fatal() {
    let mut rig = Rig::new(&scenario_config(), 18.0);
    rig.tick().unwrap();
    rig.hw.adc_fails = true;

    let err = rig.tick().unwrap_err();
    assert_eq!(err, Error::Sensor(SensorError::Transport));
    assert!(rig.ctl.safety().has_fault(SafetyFault::SensorTransport));
    assert!(!rig.hw.energized());
}

#[test]
fn actuator_failure_is_fatal() {
    let mut rig = Rig::new(&scenario_config(), 18.0);
    rig.hw.pwm_fails = true;
    assert!(matches!(rig.tick(), Err(Error::Actuator(_))));
    assert!(rig.ctl.safety().has_fault(SafetyFault::ActuatorTransport));
}

// ── Sampling ─────────────────────────────────────────────────

#[test]
fn every_pass_reads_every_channel() {
    let mut rig = Rig::new(&scenario_config(), 23.0);
    let report = rig.tick().unwrap();
    assert_eq!(report.estimate.sample_count, 20);
    assert_eq!(report.estimate.channel_count, 2);
    assert_eq!(rig.hw.reads, 40);
}

// ── Setpoint ─────────────────────────────────────────────────

#[test]
fn button_presses_apply_at_next_iteration() {
    let config = scenario_config();
    let inbox = Arc::new(SetpointInbox::new());
    let mut ctl = ThermalController::new(&config, Arc::clone(&inbox)).unwrap();
    let mut hw = MockHardware::at(23.0);
    let mut sink = RecordingSink::new();
    let mut display = RecordingDisplay::default();

    inbox.push(SetpointAdjust::Increment);
    inbox.push(SetpointAdjust::Increment);
    assert_eq!(ctl.target(), 23, "not applied until the loop drains");

    let report = ctl.tick(&mut hw, &mut sink, &mut display).unwrap();
    assert_eq!(report.target, 25);
    assert!(sink.events.contains(&AppEvent::SetpointChanged { target: 25 }));
}

#[test]
fn setpoint_is_clamped_to_bounds() {
    let mut config = scenario_config();
    config.setpoint.initial = 40;
    let inbox = Arc::new(SetpointInbox::new());
    let mut ctl = ThermalController::new(&config, Arc::clone(&inbox)).unwrap();
    let mut hw = MockHardware::at(39.0);

    inbox.push(SetpointAdjust::Increment);
    let report = ctl
        .tick(&mut hw, &mut RecordingSink::new(), &mut RecordingDisplay::default())
        .unwrap();
    assert_eq!(report.target, 40);
}

// ── Status ───────────────────────────────────────────────────

#[test]
fn status_renders_on_first_and_every_nth_iteration() {
    let config = SystemConfig {
        display_every: 3,
        ..scenario_config()
    };
    let mut rig = Rig::new(&config, 23.0);
    for _ in 0..7 {
        rig.tick().unwrap();
    }
    assert_eq!(rig.display.frames.len(), 3);
    assert!(rig.display.frames[0].starts_with("Temp: 23."));
    assert!(rig.display.frames[0].contains("| Mode: REST\n     (23\u{00b0}C)"));
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::Telemetry(_))), 3);
}

#[test]
fn broken_display_is_not_fatal() {
    let mut rig = Rig::new(&scenario_config(), 23.0);
    rig.display.broken = true;
    assert!(rig.tick().is_ok());
}

// ── PID-sign strategy ────────────────────────────────────────

#[test]
fn pid_sign_drives_proportionally() {
    let config = SystemConfig {
        strategy: ControlStrategy::PidSign { threshold: 25.0 },
        ..SystemConfig::default()
    };
    let mut rig = Rig::new(&config, 5.0);
    let report = rig.tick().unwrap();
    assert_eq!(report.decision.mode, Mode::Heating);
    assert_eq!(report.output.value, 100.0);
    assert_eq!(rig.hw.duty(0), 1_000_000);
    assert_eq!(rig.hw.pin_writes(), vec![(23, false)]);
}
