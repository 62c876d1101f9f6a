//! Integration tests for `ControlLoop`: period, stop flag, fatal path.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::mock_hw::{MockHardware, RecordingDisplay, RecordingSink};

use thermobox::app::events::AppEvent;
use thermobox::app::ports::ConfigError;
use thermobox::app::runner::ControlLoop;
use thermobox::config::SystemConfig;
use thermobox::error::{Error, SafetyFault};
use thermobox::setpoint::SetpointInbox;

fn fast_config() -> SystemConfig {
    SystemConfig {
        control_period_ms: 20,
        display_every: 1,
        ..SystemConfig::default()
    }
}

fn new_loop(config: &SystemConfig) -> ControlLoop {
    ControlLoop::new(config, Arc::new(SetpointInbox::new())).unwrap()
}

#[test]
fn inverted_setpoint_bounds_refuse_to_build() {
    let mut config = fast_config();
    config.setpoint.min = 30;
    config.setpoint.max = 10;
    let built = ControlLoop::new(&config, Arc::new(SetpointInbox::new()));
    assert!(matches!(built, Err(ConfigError::ValidationFailed(_))));
}

#[test]
fn preset_stop_flag_shuts_down_without_iterating() {
    let mut ctl = new_loop(&fast_config());
    let mut hw = MockHardware::at(18.0);
    let mut sink = RecordingSink::new();
    let stop = AtomicBool::new(true);

    let exit = ctl
        .run(&mut hw, &mut sink, &mut RecordingDisplay::default(), &stop)
        .unwrap();

    assert_eq!(exit.iterations, 0);
    assert_eq!(hw.reads, 0);
    assert!(!hw.energized());
    assert!(matches!(sink.events.first(), Some(AppEvent::Started { target: 23 })));
    assert!(matches!(sink.events.last(), Some(AppEvent::Shutdown { iterations: 0 })));
}

#[test]
fn stop_flag_de_energizes_running_element() {
    let mut ctl = new_loop(&fast_config());
    let mut hw = MockHardware::at(18.0);
    let mut sink = RecordingSink::new();
    let stop = Arc::new(AtomicBool::new(false));

    let setter = {
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(110));
            stop.store(true, Ordering::Release);
        })
    };

    let exit = ctl
        .run(&mut hw, &mut sink, &mut RecordingDisplay::default(), &stop)
        .unwrap();
    setter.join().unwrap();

    assert!(exit.iterations >= 2, "ran {} iterations", exit.iterations);
    assert!(!hw.energized(), "outputs must be off after shutdown");
    let tail: Vec<_> = hw.calls.iter().rev().take(3).collect();
    assert!(tail.iter().all(|c| c.is_off()));
}

#[test]
fn iterations_never_run_faster_than_the_period() {
    let mut ctl = new_loop(&fast_config());
    let mut hw = MockHardware::at(23.0);
    let stop = Arc::new(AtomicBool::new(false));

    let setter = {
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(150));
            stop.store(true, Ordering::Release);
        })
    };

    let begun = Instant::now();
    let exit = ctl
        .run(
            &mut hw,
            &mut RecordingSink::new(),
            &mut RecordingDisplay::default(),
            &stop,
        )
        .unwrap();
    let elapsed = begun.elapsed();
    setter.join().unwrap();

    assert!(exit.iterations >= 1);
    assert!(
        elapsed >= Duration::from_millis(20) * exit.iterations as u32,
        "{} iterations in {:?}",
        exit.iterations,
        elapsed
    );
}

#[test]
fn over_temperature_exits_with_error_after_one_de_energize() {
    let mut config = fast_config();
    config.sensing.max_temperature_c = 40.0;
    let mut ctl = new_loop(&config);
    let mut hw = MockHardware::at(41.0);
    let mut sink = RecordingSink::new();
    let stop = AtomicBool::new(false);

    let err = ctl
        .run(&mut hw, &mut sink, &mut RecordingDisplay::default(), &stop)
        .unwrap_err();

    assert_eq!(err, Error::Safety(SafetyFault::OverTemperature));
    // Three off commands at start, three from the trip.
    assert_eq!(hw.off_commands(), 6);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::SafetyTrip(_))), 1);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Shutdown { .. })), 0);
    assert_eq!(ctl.controller().safety().de_energize_count(), 1);
}

#[test]
fn telemetry_carries_measured_cycle_length() {
    let mut ctl = new_loop(&fast_config());
    let mut hw = MockHardware::at(23.0);
    let mut sink = RecordingSink::new();
    let stop = Arc::new(AtomicBool::new(false));

    let setter = {
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(90));
            stop.store(true, Ordering::Release);
        })
    };
    ctl.run(&mut hw, &mut sink, &mut RecordingDisplay::default(), &stop)
        .unwrap();
    setter.join().unwrap();

    let later: Vec<u32> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Telemetry(t) if t.iteration > 0 => Some(t.last_cycle_ms),
            _ => None,
        })
        .collect();
    assert!(!later.is_empty());
    assert!(later.iter().all(|&ms| ms >= 20));
}
