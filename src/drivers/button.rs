//! Debounced setpoint buttons.
//!
//! ## Hardware
//!
//! Active-low momentary switches with pull-ups.  The GPIO layer reports
//! every edge from its own callback thread; [`EdgeButton::on_edge`] keeps
//! only falling edges (press) that arrive at least `debounce_ms` after the
//! previously accepted one.  State lives in atomics so a button can be
//! shared with the callback thread behind an `Arc` without a lock.
//!
//! Accepted presses are pushed into the [`SetpointInbox`]; the control
//! loop applies them at the start of its next iteration.

use core::sync::atomic::{AtomicU64, Ordering};

use log::debug;

use crate::setpoint::{SetpointAdjust, SetpointInbox};

/// No press accepted yet.
const NEVER: u64 = u64::MAX;

/// Signal transition reported by the GPIO layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Falling,
    Rising,
}

pub struct EdgeButton {
    adjust: SetpointAdjust,
    debounce_ms: u64,
    /// Timestamp of the last accepted press (ms, caller's clock).
    last_accept_ms: AtomicU64,
}

impl EdgeButton {
    pub fn new(adjust: SetpointAdjust, debounce_ms: u32) -> Self {
        Self {
            adjust,
            debounce_ms: u64::from(debounce_ms),
            last_accept_ms: AtomicU64::new(NEVER),
        }
    }

    pub fn adjust(&self) -> SetpointAdjust {
        self.adjust
    }

    /// Classify one edge.  `now_ms` is any monotonic millisecond clock.
    pub fn on_edge(&self, edge: Edge, now_ms: u64) -> Option<SetpointAdjust> {
        if edge != Edge::Falling {
            return None;
        }
        let last = self.last_accept_ms.load(Ordering::Acquire);
        if last != NEVER && now_ms.saturating_sub(last) < self.debounce_ms {
            debug!("{:?} bounce ignored ({}ms)", self.adjust, now_ms.saturating_sub(last));
            return None;
        }
        // Two callbacks racing on the same edge: only one wins.
        self.last_accept_ms
            .compare_exchange(last, now_ms, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| self.adjust)
    }

    /// Classify an edge and queue the press.  Returns `true` if queued.
    pub fn forward(&self, edge: Edge, now_ms: u64, inbox: &SetpointInbox) -> bool {
        match self.on_edge(edge, now_ms) {
            Some(adj) => inbox.push(adj),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setpoint::{Setpoint, SetpointConfig};

    fn up() -> EdgeButton {
        EdgeButton::new(SetpointAdjust::Increment, 50)
    }

    #[test]
    fn first_press_is_accepted() {
        let btn = up();
        assert_eq!(btn.on_edge(Edge::Falling, 0), Some(SetpointAdjust::Increment));
    }

    #[test]
    fn rising_edges_are_ignored() {
        let btn = up();
        assert_eq!(btn.on_edge(Edge::Rising, 100), None);
        assert_eq!(btn.on_edge(Edge::Falling, 100), Some(SetpointAdjust::Increment));
    }

    #[test]
    fn bounces_inside_window_are_filtered() {
        let btn = up();
        assert!(btn.on_edge(Edge::Falling, 1000).is_some());
        assert_eq!(btn.on_edge(Edge::Falling, 1010), None);
        assert_eq!(btn.on_edge(Edge::Falling, 1049), None);
        assert!(btn.on_edge(Edge::Falling, 1050).is_some());
    }

    #[test]
    fn forward_feeds_the_inbox() {
        let inbox = SetpointInbox::new();
        let down = EdgeButton::new(SetpointAdjust::Decrement, 50);
        assert!(down.forward(Edge::Falling, 0, &inbox));
        assert!(!down.forward(Edge::Falling, 5, &inbox));
        assert!(down.forward(Edge::Falling, 200, &inbox));

        let mut sp = Setpoint::new(&SetpointConfig::default());
        assert_eq!(inbox.drain_into(&mut sp), Some(21));
    }
}
