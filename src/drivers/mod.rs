//! Actuator binding, input debouncing, and peripheral framing.

pub mod actuator;
pub mod button;
pub mod direction;
pub mod mcp3008;
