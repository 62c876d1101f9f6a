//! MCP3008 wire framing.
//!
//! One conversion is a three-byte full-duplex SPI transfer:
//!
//! | Byte | MOSI                          | MISO                  |
//! |------|-------------------------------|-----------------------|
//! | 0    | `0x01` (start bit)            | don't care            |
//! | 1    | `1 ch2 ch1 ch0 0000` (single) | `xxxx x0 b9 b8`       |
//! | 2    | `0x00`                        | `b7 … b0`             |
//!
//! The transfer itself lives in the platform adapter; only framing is
//! here so it can be tested on the host.

use crate::error::SensorError;
use crate::sensors::MAX_CHANNEL;

/// Bytes per conversion.
pub const FRAME_LEN: usize = 3;

const START_BIT: u8 = 0x01;
const SINGLE_ENDED: u8 = 0x80;

/// Build the MOSI frame for a single-ended read of `channel`.
pub fn request_frame(channel: u8) -> Result<[u8; FRAME_LEN], SensorError> {
    if channel > MAX_CHANNEL {
        return Err(SensorError::ChannelOutOfRange(channel));
    }
    Ok([START_BIT, SINGLE_ENDED | ((channel & 0x07) << 4), 0x00])
}

/// Extract the 10-bit count from a MISO frame.
pub fn decode(rx: &[u8; FRAME_LEN]) -> u16 {
    (u16::from(rx[1] & 0x03) << 8) | u16::from(rx[2])
}
