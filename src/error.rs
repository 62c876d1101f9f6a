//! Unified error types for the regulator.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! control loop's fatal path uniform.  All variants are `Copy` so they can
//! be passed through the safety supervisor without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the control path funnels into this type.
///
/// There is no recoverable variant: anything that reaches the control
/// loop as an `Error` de-energizes the element and ends the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The ADC could not be read or returned impossible data.
    Sensor(SensorError),
    /// A GPIO or PWM command failed.
    Actuator(ActuatorError),
    /// A safety limit was crossed.
    Safety(SafetyFault),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Safety(e) => write!(f, "safety: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// The safety fault this error latches in the supervisor.
    pub fn fault(&self) -> SafetyFault {
        match self {
            Self::Sensor(_) => SafetyFault::SensorTransport,
            Self::Actuator(_) => SafetyFault::ActuatorTransport,
            Self::Safety(fault) => *fault,
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The SPI transport to the ADC is unavailable.
    Transport,
    /// A channel outside 0..=7 was requested.
    ChannelOutOfRange(u8),
    /// The ADC returned a count above its 10-bit range.
    CountOutOfRange(u16),
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => write!(f, "ADC transport unavailable"),
            Self::ChannelOutOfRange(ch) => write!(f, "ADC channel {ch} out of range"),
            Self::CountOutOfRange(count) => write!(f, "ADC count {count} out of range"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// Digital output write failed.
    GpioWriteFailed,
    /// PWM duty write failed.
    PwmWriteFailed,
    /// No PWM output is wired to this channel.
    UnknownChannel(u8),
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
            Self::PwmWriteFailed => write!(f, "PWM write failed"),
            Self::UnknownChannel(ch) => write!(f, "no PWM output on channel {ch}"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Safety faults
// ---------------------------------------------------------------------------

/// Conditions that trip the fail-fast path.  Accumulated in a bitfield
/// by the safety supervisor so the trip is recorded once per fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SafetyFault {
    /// Estimated enclosure temperature above the configured maximum.
    OverTemperature = 0b0000_0001,
    /// Sensing path failed; the loop cannot run blind.
    SensorTransport = 0b0000_0010,
    /// Actuator path failed; commanded state is unknown.
    ActuatorTransport = 0b0000_0100,
}

impl SafetyFault {
    /// Return the bitmask for this fault.
    pub const fn mask(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for SafetyFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OverTemperature => write!(f, "over temperature"),
            Self::SensorTransport => write!(f, "sensor transport failure"),
            Self::ActuatorTransport => write!(f, "actuator transport failure"),
        }
    }
}

impl From<SafetyFault> for Error {
    fn from(e: SafetyFault) -> Self {
        Self::Safety(e)
    }
}

// ---------------------------------------------------------------------------
// Display errors
// ---------------------------------------------------------------------------

/// Rendering failed.  Never fatal; the caller logs and moves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayError;

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "display render failed")
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
