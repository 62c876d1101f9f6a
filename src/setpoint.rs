//! Setpoint and the edge-callback → control-loop handoff.
//!
//! Button edges fire on GPIO callback threads at arbitrary times.  They
//! never touch the setpoint directly: each accepted edge pushes a
//! [`SetpointAdjust`] into the [`SetpointInbox`], and the control loop
//! drains the inbox exactly once at the top of each iteration.  The
//! iteration therefore sees one stable target from start to finish.
//!
//! ```text
//! ┌──────────────┐  SetpointAdjust  ┌──────────────┐
//! │ GPIO + edge  │─────────────────▶│ Control loop │
//! │ GPIO − edge  │─────────────────▶│ (drain once) │
//! └──────────────┘   bounded MPMC   └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Pending adjustments held between drains.
const INBOX_DEPTH: usize = 16;

/// Setpoint bounds and initial target (°C).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetpointConfig {
    pub initial: i32,
    pub min: i32,
    pub max: i32,
}

impl Default for SetpointConfig {
    fn default() -> Self {
        Self {
            initial: 23,
            min: 5,
            max: 40,
        }
    }
}

/// One button step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetpointAdjust {
    Increment,
    Decrement,
}

/// Target temperature, owned by the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Setpoint {
    target: i32,
    min: i32,
    max: i32,
}

impl Setpoint {
    /// Inverted bounds pin the target to `min`; `validate()` rejects them
    /// before a controller is built.
    pub fn new(config: &SetpointConfig) -> Self {
        Self {
            target: config.initial.min(config.max).max(config.min),
            min: config.min,
            max: config.max,
        }
    }

    pub fn target(&self) -> i32 {
        self.target
    }

    /// Apply one step, saturating at the bounds.  Returns `true` if the
    /// target moved.
    pub fn adjust(&mut self, adj: SetpointAdjust) -> bool {
        let next = match adj {
            SetpointAdjust::Increment => self.target.saturating_add(1),
            SetpointAdjust::Decrement => self.target.saturating_sub(1),
        }
        .min(self.max)
        .max(self.min);
        let moved = next != self.target;
        self.target = next;
        moved
    }
}

/// Bounded channel from edge callbacks to the control loop.
pub struct SetpointInbox {
    channel: Channel<CriticalSectionRawMutex, SetpointAdjust, INBOX_DEPTH>,
}

impl Default for SetpointInbox {
    fn default() -> Self {
        Self::new()
    }
}

impl SetpointInbox {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Queue an adjustment.  Safe from any thread.  Returns `false` if the
    /// inbox is full and the press was dropped.
    pub fn push(&self, adj: SetpointAdjust) -> bool {
        if self.channel.try_send(adj).is_err() {
            warn!("Setpoint inbox full, dropped {:?}", adj);
            return false;
        }
        true
    }

    /// Apply every pending adjustment to `setpoint`.  Returns the new
    /// target if it moved.
    pub fn drain_into(&self, setpoint: &mut Setpoint) -> Option<i32> {
        let before = setpoint.target();
        while let Ok(adj) = self.channel.try_receive() {
            setpoint.adjust(adj);
        }
        let after = setpoint.target();
        if after == before {
            return None;
        }
        info!("Setpoint: {}\u{00b0}C -> {}\u{00b0}C", before, after);
        Some(after)
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }
}
