//! Closed-loop control law.

pub mod pid;
