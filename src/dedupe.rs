//! Bounded deduplication store for realtime gift events.
//!
//! The realtime channel is at-least-once, so a gift burst can deliver the
//! same event more than once. [`GiftDedupeStore`] remembers the most recent
//! event ids and rejects repeats. Membership checks are O(1); when the store
//! is full, recording a new id evicts the oldest one.

use std::collections::{HashSet, VecDeque};

/// Default retention capacity.
pub const DEFAULT_CAPACITY: usize = 200;

/// FIFO set of recently seen event identifiers.
#[derive(Debug)]
pub struct GiftDedupeStore {
    seen: HashSet<String>,
    order: VecDeque<String>,
    capacity: usize,
}

impl GiftDedupeStore {
    /// Creates a store with [`DEFAULT_CAPACITY`].
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a store retaining at most `capacity` event ids.
    ///
    /// A zero capacity is clamped to 1 so the store still suppresses
    /// immediate repeats.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            seen: HashSet::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Records an event id.
    ///
    /// Returns `true` if the id was not already held (the event should be
    /// processed), `false` if it is a duplicate.
    pub fn insert(&mut self, event_id: &str) -> bool {
        if self.seen.contains(event_id) {
            return false;
        }
        if self.order.len() == self.capacity
            && let Some(oldest) = self.order.pop_front()
        {
            self.seen.remove(&oldest);
        }
        self.seen.insert(event_id.to_string());
        self.order.push_back(event_id.to_string());
        true
    }

    /// Returns whether an event id is currently held, without recording it.
    pub fn contains(&self, event_id: &str) -> bool {
        self.seen.contains(event_id)
    }

    /// Number of ids currently retained.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when no ids are retained.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for GiftDedupeStore {
    fn default() -> Self {
        Self::new()
    }
}
