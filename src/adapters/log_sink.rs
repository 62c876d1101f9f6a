//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events
//! through the `log` facade (stderr via the binary's subscriber).

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] as one line.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | #{} | T={:.2}\u{00b0}C target={}\u{00b0}C | mode={} u={:.1} | \
                     element={} inner={} | dt={}ms",
                    t.iteration,
                    t.celsius,
                    t.target,
                    t.mode.label(),
                    t.control_output,
                    t.element_duty,
                    t.inner_fan_duty,
                    t.last_cycle_ms,
                );
            }
            AppEvent::ModeChanged { from, to } => {
                info!("STATE | {} -> {}", from.label(), to.label());
            }
            AppEvent::ReversalBlocked { from } => {
                warn!("STATE | reversal from {} held for one rest cycle", from.label());
            }
            AppEvent::SetpointChanged { target } => {
                info!("SETPOINT | {}\u{00b0}C", target);
            }
            AppEvent::SafetyTrip(fault) => {
                error!("SAFETY | tripped: {}, fault mask=0b{:08b}", fault, fault.mask());
            }
            AppEvent::Started { target } => {
                info!("START | target={}\u{00b0}C", target);
            }
            AppEvent::Shutdown { iterations } => {
                info!("STOP | iterations={}", iterations);
            }
        }
    }
}
