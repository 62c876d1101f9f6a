//! Thermobox binary entry point.
//!
//! Hexagonal architecture around a fixed-period control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  RpiHardware        LogEventSink   LogDisplay   JsonConfigFile │
//! │  (Adc+Actuator)     (EventSink)    (Display)    (ConfigPort)   │
//! │  button interrupts ─▶ SetpointInbox                            │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │           ThermalController (pure logic)               │    │
//! │  │  Estimator · PID · Mode arbiter · Binder · Safety      │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  ControlLoop · CycleScheduler (two-phase barrier)              │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `thermobox [config.json]`.  Without an argument the built-in
//! defaults are used.  SIGINT/SIGTERM stop the loop after the current
//! iteration and switch every output off.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use log::{info, warn};
use tracing_subscriber::EnvFilter;

use thermobox::adapters::config_file::JsonConfigFile;
use thermobox::adapters::display::LogDisplay;
use thermobox::adapters::log_sink::LogEventSink;
use thermobox::adapters::rpi::RpiHardware;
use thermobox::app::ports::ConfigPort;
use thermobox::app::runner::ControlLoop;
use thermobox::setpoint::SetpointInbox;

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Thermobox v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Configuration ──────────────────────────────────────
    let source = JsonConfigFile::new(std::env::args_os().nth(1).map(PathBuf::from));
    let config = source.load().context("loading configuration")?;
    info!(
        "Period {}ms, channels {:?}, {} passes, cutoff {:.1}\u{00b0}C",
        config.control_period_ms,
        config.sensing.channels,
        config.sensing.samples_per_pass,
        config.sensing.max_temperature_c
    );

    // ── 3. Stop flag ──────────────────────────────────────────
    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        ctrlc::set_handler(move || {
            if stop.swap(true, Ordering::AcqRel) {
                warn!("Second stop signal, still waiting for the current iteration");
            } else {
                info!("Stop signal received");
            }
        })
        .context("installing signal handler")?;
    }

    // ── 4. Hardware ───────────────────────────────────────────
    let inbox = Arc::new(SetpointInbox::new());
    let mut hw = RpiHardware::new(&config.wiring)?;
    hw.attach_buttons(&config.wiring, Arc::clone(&inbox))?;

    // ── 5. Run ────────────────────────────────────────────────
    let mut control =
        ControlLoop::new(&config, inbox).context("building the control loop")?;
    let exit = control
        .run(&mut hw, &mut LogEventSink::new(), &mut LogDisplay::new(), &stop)
        .context("control loop stopped on a fault")?;

    info!(
        "Clean shutdown after {} iterations ({} overran the period)",
        exit.iterations, exit.overruns
    );
    Ok(())
}
