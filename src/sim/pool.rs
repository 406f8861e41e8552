//! Bounded FIFO pool for rockets and bursts
//!
//! Items are kept in creation order. Inserting into a full pool first removes
//! the oldest item and hands it back to the caller, so the active count never
//! exceeds the capacity and eviction order is deterministic.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct EffectPool<T> {
    items: VecDeque<T>,
    capacity: usize,
    evicted: u64,
}

impl<T> EffectPool<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
            evicted: 0,
        }
    }

    /// Insert `item`, returning whatever had to be evicted to make room.
    ///
    /// A zero-capacity pool rejects every insert and returns the item itself.
    pub fn insert(&mut self, item: T) -> Option<T> {
        if self.capacity == 0 {
            self.evicted += 1;
            return Some(item);
        }
        let evicted = if self.items.len() >= self.capacity {
            self.evicted += 1;
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    /// Keep only items matching the predicate (order preserved)
    pub fn retain<F: FnMut(&T) -> bool>(&mut self, keep: F) {
        self.items.retain(keep);
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.iter_mut()
    }

    /// Oldest active item
    pub fn oldest(&self) -> Option<&T> {
        self.items.front()
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

    /// Total items evicted (or rejected) since creation
    pub fn evicted_total(&self) -> u64 {
        self.evicted
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
