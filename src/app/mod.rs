//! Application core: control logic with no direct I/O.
//!
//! The thermal controller sequences estimation, PID, arbitration, and
//! actuation; the runner wraps it in the fixed-period loop.  All
//! interaction with hardware happens through the **port traits** in
//! [`ports`], keeping this layer testable without real peripherals.

pub mod events;
pub mod ports;
pub mod runner;
pub mod service;
