//! Default pin and channel assignments for the Raspberry Pi carrier board.
//!
//! Single source of truth for the defaults in
//! [`WiringConfig`](crate::config::WiringConfig).  A config file may
//! override any of them; nothing else hard-codes a pin number.
//!
//! GPIO numbers are BCM, not header positions.

// ---------------------------------------------------------------------------
// H-bridge (Peltier element)
// ---------------------------------------------------------------------------

/// Digital output: polarity select for the Peltier element.
pub const DIRECTION_GPIO: u8 = 23;

// ---------------------------------------------------------------------------
// PWM outputs
// ---------------------------------------------------------------------------

/// Element drive.  Hardware PWM0 on BCM 18.
pub const ELEMENT_PWM_CHANNEL: u8 = 0;
/// Outer (hot-side) fan.  Shares the element duty; hardware PWM1 on BCM 19.
pub const OUTER_FAN_PWM_CHANNEL: u8 = 1;
/// Inner (enclosure) fan.  Software PWM on [`INNER_FAN_GPIO`].
pub const INNER_FAN_PWM_CHANNEL: u8 = 2;
/// Pin carrying the software-PWM inner fan.
pub const INNER_FAN_GPIO: u8 = 12;

// ---------------------------------------------------------------------------
// ADC (MCP3008 on SPI0, CE0)
// ---------------------------------------------------------------------------

/// SPI clock for the MCP3008.  1.35 MHz is its rated maximum at 3.3 V.
pub const ADC_SPI_CLOCK_HZ: u32 = 1_350_000;

// ---------------------------------------------------------------------------
// Setpoint buttons (active-low, internal pull-up)
// ---------------------------------------------------------------------------

pub const SETPOINT_UP_GPIO: u8 = 5;
pub const SETPOINT_DOWN_GPIO: u8 = 16;
