//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements          | Connects to                 |
//! |---------------|---------------------|-----------------------------|
//! | `config_file` | ConfigPort          | JSON file on disk           |
//! | `display`     | DisplayPort         | Log output                  |
//! | `log_sink`    | EventSink           | Log output                  |
//! | `rpi`         | AdcPort             | MCP3008 over SPI            |
//! |               | ActuatorPort        | Pi GPIO + PWM               |

pub mod config_file;
pub mod display;
pub mod log_sink;
#[cfg(feature = "rpi")]
pub mod rpi;
