//! Bounded, newest-first log.
//!
//! Insertion at the head, eviction at the tail. `len() <= capacity()`
//! holds after every push.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoundedLog<T> {
    capacity: usize,
    entries: VecDeque<T>,
}

impl<T> BoundedLog<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Insert at the head. Returns the evicted oldest entry, if any.
    pub fn push(&mut self, entry: T) -> Option<T> {
        self.entries.push_front(entry);
        if self.entries.len() > self.capacity {
            self.entries.pop_back()
        } else {
            None
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Newest entry first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn newest(&self) -> Option<&T> {
        self.entries.front()
    }

    pub fn oldest(&self) -> Option<&T> {
        self.entries.back()
    }
}
