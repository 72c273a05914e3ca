//! A time-indexed FIFO.
//!
//! [`Queue`] orders its elements by insertion time, breaking ties by
//! insertion order. Elements are consumed with [`Queue::pop_front`], which
//! only yields entries whose time has been reached.
//!
//! The queue never goes backward: once an element stamped `t` has been popped,
//! no element with a time earlier than `t` can be popped later. Late inserts
//! are therefore keyed at the last popped time instead of being rejected, so
//! a replayed command that arrives "in the past" is still consumed, in order,
//! after everything already handed out.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::time::SimTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct QueueKey {
    time: SimTime,
    seq: u64,
}

/// A time-ordered queue of values.
#[derive(Clone)]
pub struct Queue<T> {
    entries: BTreeMap<QueueKey, T>,
    next_seq: u64,
    last_popped: SimTime,
}

/// A single `(time, value)` pair, as stored in a [`Queue`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry<T> {
    /// Effective time the value is keyed at.
    pub time: SimTime,
    /// The queued value.
    pub value: T,
}

impl<T> Queue<T> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_seq: 0,
            last_popped: SimTime::MIN,
        }
    }

    /// Inserts `value` at `time`.
    ///
    /// Returns the time the value was actually keyed at. This equals `time`
    /// unless `time` lies before the last popped element, in which case the
    /// value is keyed at that element's time.
    pub fn insert(&mut self, time: SimTime, value: T) -> SimTime {
        let time = time.max(self.last_popped);
        let key = QueueKey {
            time,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.entries.insert(key, value);
        time
    }

    /// Returns the earliest element if its time is at or before `time`.
    #[must_use]
    pub fn front(&self, time: SimTime) -> Option<&T> {
        self.entries
            .first_key_value()
            .filter(|(key, _)| key.time <= time)
            .map(|(_, value)| value)
    }

    /// Removes and returns the earliest element if its time is at or before
    /// `time`. Does nothing otherwise.
    pub fn pop_front(&mut self, time: SimTime) -> Option<T> {
        let entry = self.entries.first_entry()?;
        if entry.key().time > time {
            return None;
        }
        self.last_popped = entry.key().time;
        Some(entry.remove())
    }

    /// Returns the time of the earliest element, if any.
    #[must_use]
    pub fn next_time(&self) -> Option<SimTime> {
        self.entries.first_key_value().map(|(key, _)| key.time)
    }

    /// Returns the time of the most recently popped element.
    ///
    /// [`SimTime::MIN`] if nothing has been popped yet.
    #[must_use]
    pub fn last_popped(&self) -> SimTime {
        self.last_popped
    }

    /// Returns the number of queued elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the queue holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over queued elements in pop order.
    pub fn iter(&self) -> impl Iterator<Item = (SimTime, &T)> {
        self.entries.iter().map(|(key, value)| (key.time, value))
    }

    /// Removes every queued element. The backward guard is kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T: Clone> Queue<T> {
    /// Returns an owned copy of the queued elements in pop order.
    #[must_use]
    pub fn entries(&self) -> Vec<QueueEntry<T>> {
        self.iter()
            .map(|(time, value)| QueueEntry {
                time,
                value: value.clone(),
            })
            .collect()
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for Queue<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Queue")
            .field("entries", &self.iter().collect::<Vec<_>>())
            .field("last_popped", &self.last_popped)
            .finish()
    }
}

impl<T> FromIterator<QueueEntry<T>> for Queue<T> {
    fn from_iter<I: IntoIterator<Item = QueueEntry<T>>>(iter: I) -> Self {
        let mut queue = Self::new();
        for entry in iter {
            queue.insert(entry.time, entry.value);
        }
        queue
    }
}
