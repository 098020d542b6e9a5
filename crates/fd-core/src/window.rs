//! Bounded circular store of recent heartbeat arrivals.

use fd_common::{Error, Result};

/// Fixed-capacity ring buffer over the most recent arrivals, with an
/// incrementally maintained sum and a secondary ring of consecutive
/// arrival differences.
///
/// Appending is O(1): the sum is adjusted by `new − evicted`, never
/// recomputed from the retained elements. The difference ring has capacity
/// `n − 1` and its own head/length tracking, so with occupancy ≥ 2 exactly
/// `min(occupancy − 1, n − 1)` differences are valid. For `n = 1` the
/// difference ring has zero capacity and stays empty.
#[derive(Debug, Clone)]
pub struct ArrivalWindow {
    slots: Vec<f64>,
    head: usize,
    len: usize,
    sum: f64,
    diffs: Vec<f64>,
    diff_head: usize,
    diff_len: usize,
}

impl ArrivalWindow {
    /// Creates a window holding up to `capacity` arrivals.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidCapacity {
                value: "0".to_string(),
            });
        }
        Ok(Self {
            slots: vec![0.0; capacity],
            head: 0,
            len: 0,
            sum: 0.0,
            diffs: vec![0.0; capacity - 1],
            diff_head: 0,
            diff_len: 0,
        })
    }

    /// Appends an arrival, returning the evicted oldest arrival when full.
    ///
    /// Beyond the first append this also records `value − latest` in the
    /// difference ring, evicting that ring's oldest entry once it is full.
    pub fn append(&mut self, value: f64) -> Option<f64> {
        let previous = self.latest();
        let capacity = self.slots.len();

        let evicted = if self.len < capacity {
            let tail = (self.head + self.len) % capacity;
            self.slots[tail] = value;
            self.len += 1;
            self.sum += value;
            None
        } else {
            let oldest = self.slots[self.head];
            self.slots[self.head] = value;
            self.head = (self.head + 1) % capacity;
            self.sum += value - oldest;
            Some(oldest)
        };

        if let Some(previous) = previous {
            self.push_difference(value - previous);
        }
        evicted
    }

    fn push_difference(&mut self, difference: f64) {
        let capacity = self.diffs.len();
        if capacity == 0 {
            return;
        }
        if self.diff_len < capacity {
            let tail = (self.diff_head + self.diff_len) % capacity;
            self.diffs[tail] = difference;
            self.diff_len += 1;
        } else {
            self.diffs[self.diff_head] = difference;
            self.diff_head = (self.diff_head + 1) % capacity;
        }
    }

    /// Running sum of the retained arrivals.
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Number of retained arrivals.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn is_full(&self) -> bool {
        self.len == self.slots.len()
    }

    /// Most recent arrival, `None` when empty.
    pub fn latest(&self) -> Option<f64> {
        if self.len == 0 {
            return None;
        }
        let capacity = self.slots.len();
        Some(self.slots[(self.head + self.len - 1) % capacity])
    }

    /// Mean of the retained arrivals, `None` when empty.
    pub fn mean(&self) -> Option<f64> {
        if self.len == 0 {
            return None;
        }
        Some(self.sum / self.len as f64)
    }

    /// Ordered oldest→newest copy of the retained arrivals.
    pub fn snapshot(&self) -> Vec<f64> {
        let capacity = self.slots.len();
        (0..self.len)
            .map(|i| self.slots[(self.head + i) % capacity])
            .collect()
    }

    /// Ordered oldest→newest copy of the valid consecutive differences.
    pub fn differences(&self) -> Vec<f64> {
        let capacity = self.diffs.len();
        (0..self.diff_len)
            .map(|i| self.diffs[(self.diff_head + i) % capacity])
            .collect()
    }

    /// Whether the latest arrival deviates from `expected` by more than
    /// `epsilon`. False while the window is empty.
    pub fn has_jitter(&self, epsilon: f64, expected: f64) -> bool {
        match self.latest() {
            Some(latest) => (expected - latest).abs() > epsilon,
            None => false,
        }
    }
}
