//! Rolling completion-timestamp window used for velocity damping.
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::constants::VELOCITY_HISTORY_CAPACITY;
use crate::progression::EpochMillis;

/// Bounded window of recent completion timestamps for one user session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VelocityWindow {
    capacity: usize,
    stamps: VecDeque<EpochMillis>,
}

impl VelocityWindow {
    /// Create an empty window holding at most `capacity` timestamps (minimum 1).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            stamps: VecDeque::with_capacity(capacity),
        }
    }

    /// Record a completion at `now`, evicting the oldest stamp past capacity.
    pub fn record(&mut self, now: EpochMillis) {
        self.stamps.push_back(now);
        while self.stamps.len() > self.capacity {
            self.stamps.pop_front();
        }
    }

    /// Stamps strictly less than `window_millis` older than `now`.
    #[must_use]
    pub fn burst_count(&self, now: EpochMillis, window_millis: i64) -> usize {
        self.stamps
            .iter()
            .filter(|stamp| now.saturating_sub(**stamp) < window_millis)
            .count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for VelocityWindow {
    fn default() -> Self {
        Self::with_capacity(VELOCITY_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_bounded() {
        let mut window = VelocityWindow::default();
        for stamp in 0..8 {
            window.record(stamp * 1_000);
        }
        assert_eq!(window.len(), 5);
        assert_eq!(window.burst_count(7_000, 10_000), 5);
    }

    #[test]
    fn burst_count_excludes_stale_stamps() {
        let mut window = VelocityWindow::with_capacity(5);
        window.record(0);
        window.record(5_000);
        window.record(15_000);
        assert_eq!(window.burst_count(15_000, 10_000), 1);
        assert_eq!(window.burst_count(14_000, 10_000), 2);
        assert_eq!(window.burst_count(15_000, 20_000), 3);
    }

    #[test]
    fn zero_capacity_is_promoted() {
        let mut window = VelocityWindow::with_capacity(0);
        window.record(1);
        window.record(2);
        assert_eq!(window.capacity(), 1);
        assert_eq!(window.len(), 1);
    }
}
