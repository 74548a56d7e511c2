//! Fixed-capacity FIFO log.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};

use super::event::AuditRecord;

/// Append-only log that keeps the newest `capacity` entries.
///
/// Ids come from a counter owned by the log, so they stay unique and
/// increasing after the oldest entries are evicted.
#[derive(Debug, Clone)]
pub struct BoundedLog<T> {
    entries: VecDeque<T>,
    capacity: usize,
    last_id: u64,
    evicted: u64,
}

impl<T: AuditRecord> BoundedLog<T> {
    /// Create an empty log holding at most `capacity` entries (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            last_id: 0,
            evicted: 0,
        }
    }

    /// Assign the next id to `entry`, append it and evict from the front
    /// while over capacity. Returns the assigned id.
    pub fn append(&mut self, mut entry: T) -> u64 {
        self.last_id += 1;
        let id = self.last_id;
        entry.assign_id(id);
        self.entries.push_back(entry);

        while self.entries.len() > self.capacity {
            if let Some(dropped) = self.entries.pop_front() {
                self.evicted += 1;
                tracing::trace!(id = dropped.id(), "evicted audit entry");
            }
        }
        id
    }

    /// Entries with `timestamp >= now - window`, oldest first
    pub fn recent(&self, window: Duration, now: DateTime<Utc>) -> Vec<&T> {
        match now.checked_sub_signed(window) {
            Some(cutoff) => self
                .entries
                .iter()
                .filter(|e| e.timestamp() >= cutoff)
                .collect(),
            None => self.entries.iter().collect(),
        }
    }

    /// Number of entries inside the window
    pub fn count_recent(&self, window: Duration, now: DateTime<Utc>) -> usize {
        self.recent(window, now).len()
    }

    /// Last `n` entries, oldest first
    pub fn tail(&self, n: usize) -> impl Iterator<Item = &T> {
        self.entries.iter().skip(self.entries.len().saturating_sub(n))
    }

    /// All retained entries, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    /// Newest entry
    pub fn last(&self) -> Option<&T> {
        self.entries.back()
    }

    /// Retained entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No retained entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum retained entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Id of the most recent append (0 before the first)
    pub fn last_id(&self) -> u64 {
        self.last_id
    }

    /// Entries dropped to stay within capacity
    pub fn evicted(&self) -> u64 {
        self.evicted
    }
}
