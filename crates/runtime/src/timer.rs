//! Deterministic, cancellable timer group.
//!
//! Key properties:
//! - Total ordering on `(due, id)`: equal due times fire in scheduling order.
//! - Cancellation removes entries outright, so a cancelled entry can never be
//!   popped afterwards, even if its due time has already passed.
//! - `cancel_all` drops the whole group atomically with respect to new
//!   scheduling: entries scheduled after the call are unaffected.
//!
//! One `TimerQueue` is owned by one animation owner; hosts interleave several
//! owners by comparing [`TimerQueue::next_due`].

use foundation::time::Millis;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Key {
    due: Millis,
    id: TimerId,
}

#[derive(Debug)]
struct Entry<T> {
    key: Key,
    payload: T,
}

/// A timer entry whose due time has been reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<T> {
    pub id: TimerId,
    pub due: Millis,
    pub payload: T,
}

#[derive(Debug)]
pub struct TimerQueue<T> {
    next_id: u64,
    entries: Vec<Entry<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of scheduled, not yet fired or cancelled entries.
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn schedule_at(&mut self, due: Millis, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.push(Entry {
            key: Key { due, id },
            payload,
        });
        id
    }

    pub fn schedule_after(&mut self, now: Millis, delay_ms: u64, payload: T) -> TimerId {
        self.schedule_at(now.after(delay_ms), payload)
    }

    /// Returns `true` if the entry was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.key.id != id);
        self.entries.len() != before
    }

    /// Cancels every pending entry and returns how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        dropped
    }

    /// Earliest pending due time, if any.
    pub fn next_due(&self) -> Option<Millis> {
        self.entries.iter().map(|e| e.key).min().map(|k| k.due)
    }

    /// Pops the earliest entry if it is due at or before `now`.
    pub fn pop_due(&mut self, now: Millis) -> Option<Fired<T>> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .min_by_key(|(_, e)| e.key)
            .map(|(idx, _)| idx)?;
        if self.entries[idx].key.due > now {
            return None;
        }
        let entry = self.entries.swap_remove(idx);
        Some(Fired {
            id: entry.key.id,
            due: entry.key.due,
            payload: entry.payload,
        })
    }
}
