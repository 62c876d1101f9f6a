//! Mock hardware adapter for integration tests.
//!
//! Serves scripted ADC counts and records every actuator call so tests can
//! assert on the full command history without touching real GPIO/PWM.

use thermobox::app::events::AppEvent;
use thermobox::app::ports::{ActuatorPort, AdcPort, DisplayPort, EventSink};
use thermobox::error::{ActuatorError, DisplayError, SensorError};
use thermobox::sensors::thermistor::{ADC_MAX, ThermistorModel};

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCall {
    WritePin { pin: u8, level: bool },
    SetDuty { channel: u8, hz: u32, duty: u32 },
}

impl ActuatorCall {
    pub fn is_off(&self) -> bool {
        matches!(self, Self::SetDuty { hz: 0, duty: 0, .. })
    }
}

/// Largest ADC count whose temperature is at or above `celsius`.
/// Counts fall as temperature rises, so this reads just over `celsius`.
pub fn count_for(celsius: f32) -> u16 {
    let model = ThermistorModel::default();
    (1..ADC_MAX)
        .rev()
        .find(|&c| model.celsius(c) >= celsius)
        .unwrap_or(1)
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub counts: [u16; 8],
    pub adc_fails: bool,
    pub pwm_fails: bool,
    pub reads: usize,
    pub calls: Vec<ActuatorCall>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            counts: [count_for(23.0); 8],
            adc_fails: false,
            pwm_fails: false,
            reads: 0,
            calls: Vec::new(),
        }
    }

    pub fn at(celsius: f32) -> Self {
        let mut hw = Self::new();
        hw.set_celsius(celsius);
        hw
    }

    pub fn set_celsius(&mut self, celsius: f32) {
        self.counts = [count_for(celsius); 8];
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn off_commands(&self) -> usize {
        self.calls.iter().filter(|c| c.is_off()).count()
    }

    pub fn pin_writes(&self) -> Vec<(u8, bool)> {
        self.calls
            .iter()
            .filter_map(|c| match *c {
                ActuatorCall::WritePin { pin, level } => Some((pin, level)),
                ActuatorCall::SetDuty { .. } => None,
            })
            .collect()
    }

    /// Latest duty commanded on `channel` (0 if never set).
    pub fn duty(&self, channel: u8) -> u32 {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match *c {
                ActuatorCall::SetDuty {
                    channel: ch, duty, ..
                } if ch == channel => Some(duty),
                _ => None,
            })
            .unwrap_or(0)
    }

    pub fn energized(&self) -> bool {
        (0..3).any(|ch| self.duty(ch) > 0)
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl AdcPort for MockHardware {
    fn read(&mut self, channel: u8) -> Result<u16, SensorError> {
        if self.adc_fails {
            return Err(SensorError::Transport);
        }
        self.reads += 1;
        Ok(self.counts[usize::from(channel)])
    }
}

impl ActuatorPort for MockHardware {
    fn write_pin(&mut self, pin: u8, level: bool) -> Result<(), ActuatorError> {
        self.calls.push(ActuatorCall::WritePin { pin, level });
        Ok(())
    }

    fn set_duty(&mut self, channel: u8, hz: u32, duty: u32) -> Result<(), ActuatorError> {
        self.calls.push(ActuatorCall::SetDuty { channel, hz, duty });
        if self.pwm_fails && duty > 0 {
            return Err(ActuatorError::PwmWriteFailed);
        }
        Ok(())
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Display ───────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingDisplay {
    pub frames: Vec<String>,
    pub broken: bool,
}

impl DisplayPort for RecordingDisplay {
    fn render(&mut self, text: &str) -> Result<(), DisplayError> {
        if self.broken {
            return Err(DisplayError);
        }
        self.frames.push(text.to_owned());
        Ok(())
    }
}
