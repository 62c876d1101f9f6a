//! Thermobox regulator library.
//!
//! Exposes the control core and its host-side adapters for integration
//! testing.  Raspberry Pi peripherals live behind the `rpi` feature in
//! [`adapters::rpi`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod drivers;
pub mod error;
pub mod fsm;
pub mod pins;
pub mod safety;
pub mod scheduler;
pub mod sensors;
pub mod setpoint;
