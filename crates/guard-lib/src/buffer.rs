//! Fixed-capacity sliding window
//!
//! Backs the console log (100 entries), the dashboard log (50 entries) and
//! the telemetry chart (30 samples). Pushing past capacity evicts from the
//! front, so the buffer always holds the most recent items in arrival order.

use serde::{Serialize, Serializer};
use std::collections::VecDeque;

/// Bounded FIFO buffer with front eviction
#[derive(Debug, Clone)]
pub struct BoundedBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedBuffer<T> {
    /// Create an empty buffer holding at most `capacity` items
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an item, evicting the oldest entries if at capacity
    pub fn push(&mut self, item: T) {
        if self.capacity == 0 {
            return;
        }

        while self.items.len() >= self.capacity {
            self.items.pop_front();
        }

        self.items.push_back(item);
    }

    /// Append several items in order
    pub fn extend<I: IntoIterator<Item = T>>(&mut self, items: I) {
        for item in items {
            self.push(item);
        }
    }

    /// Replace the contents with the tail of `items`
    pub fn replace<I: IntoIterator<Item = T>>(&mut self, items: I) {
        self.items.clear();
        self.extend(items);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recently pushed item
    pub fn last(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Clone> BoundedBuffer<T> {
    /// Copy the contents out, oldest first
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

impl<T: Serialize> Serialize for BoundedBuffer<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.items.iter())
    }
}
