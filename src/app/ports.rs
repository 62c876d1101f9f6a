//! Port traits: the hexagonal boundary between control logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ThermalController (domain)
//! ```
//!
//! Driven adapters (ADC, GPIO/PWM, display, event sinks, config storage)
//! implement these traits.  The [`ThermalController`](super::service::ThermalController)
//! consumes them via generics, so the control core never touches hardware
//! directly and runs unchanged against the mocks in `tests/`.

use crate::config::SystemConfig;
use crate::error::{ActuatorError, DisplayError, SensorError};

// ───────────────────────────────────────────────────────────────
// ADC port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Single-ended ADC with eight 10-bit channels.
pub trait AdcPort {
    /// Read one conversion from `channel` (0–7).  Returns a count in 0–1023.
    ///
    /// An `Err` means the transport is gone and is treated as fatal.
    fn read(&mut self, channel: u8) -> Result<u16, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the direction pin and the PWM outputs.
pub trait ActuatorPort {
    /// Drive a digital output (`true` = high).
    fn write_pin(&mut self, pin: u8, level: bool) -> Result<(), ActuatorError>;

    /// Program a PWM output.  `duty` is in millionths of the period.
    /// `set_duty(channel, 0, 0)` is the off command.
    fn set_duty(&mut self, channel: u8, frequency_hz: u32, duty: u32)
    -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → status screen)
// ───────────────────────────────────────────────────────────────

/// Best-effort text display.
pub trait DisplayPort {
    fn render(&mut self, text: &str) -> Result<(), DisplayError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The controller emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: storage → domain)
// ───────────────────────────────────────────────────────────────

/// Loads the process configuration.  Read once at startup.
///
/// Implementations MUST validate before returning; an invalid file is
/// rejected with [`ConfigError::ValidationFailed`], never silently clamped.
pub trait ConfigPort {
    fn load(&self) -> Result<SystemConfig, ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// No config found in storage.
    NotFound,
    /// Stored config failed to deserialize.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
