//! Time-bounded sliding window.
//!
//! Items are kept in non-decreasing timestamp order and removed only from the
//! oldest end once they are strictly older than the window horizon.

use std::collections::VecDeque;

/// Anything that carries the time (seconds) it belongs to
pub trait Timestamped {
    fn timestamp(&self) -> f64;

    /// Replace the timestamp, used to keep the window ordered
    fn restamp(&mut self, timestamp: f64);
}

/// Sliding window over timestamped samples
#[derive(Debug, Clone)]
pub struct SlidingWindow<T> {
    horizon: f64,
    items: VecDeque<T>,
}

impl<T: Timestamped> SlidingWindow<T> {
    /// Create a window keeping `horizon` seconds of history
    #[must_use]
    pub fn new(horizon: f64) -> Self {
        Self::with_capacity(horizon, 0)
    }

    #[must_use]
    pub fn with_capacity(horizon: f64, capacity: usize) -> Self {
        Self {
            horizon,
            items: VecDeque::with_capacity(capacity),
        }
    }

    /// Append at the newest end.
    ///
    /// An item stamped earlier than the current newest one is re-stamped to the
    /// newest timestamp so ordering never breaks.
    pub fn push(&mut self, mut item: T) {
        if let Some(newest) = self.items.back() {
            let newest_ts = newest.timestamp();
            if item.timestamp() < newest_ts {
                item.restamp(newest_ts);
            }
        }
        self.items.push_back(item);
    }

    /// Drop items with `now - timestamp > horizon`, returning how many were removed
    pub fn evict(&mut self, now: f64) -> usize {
        let mut removed = 0;
        while let Some(front) = self.items.front() {
            if now - front.timestamp() > self.horizon {
                self.items.pop_front();
                removed += 1;
            } else {
                break;
            }
        }
        removed
    }

    #[must_use]
    pub fn horizon(&self) -> f64 {
        self.horizon
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    #[must_use]
    pub fn oldest(&self) -> Option<&T> {
        self.items.front()
    }

    #[must_use]
    pub fn newest(&self) -> Option<&T> {
        self.items.back()
    }

    /// Time covered between the oldest and newest item
    #[must_use]
    pub fn span(&self) -> f64 {
        match (self.items.front(), self.items.back()) {
            (Some(first), Some(last)) => last.timestamp() - first.timestamp(),
            _ => 0.0,
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
