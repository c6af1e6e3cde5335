//! Bounded FIFO queue of captured entries.

use std::collections::VecDeque;

use crate::entry::LogEntry;

/// Ordered queue that never holds more than `capacity` entries.
///
/// When an append or a re-queue would exceed the capacity, the oldest
/// entries are dropped from the front.
#[derive(Debug, Clone)]
pub struct CaptureBuffer {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl CaptureBuffer {
    /// Creates an empty buffer; a zero capacity is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Maximum number of entries held.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of buffered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends an entry and returns how many old entries were evicted.
    pub fn push(&mut self, entry: LogEntry) -> usize {
        self.entries.push_back(entry);
        self.enforce_capacity()
    }

    /// Removes and returns every buffered entry in order.
    pub fn take(&mut self) -> Vec<LogEntry> {
        self.entries.drain(..).collect()
    }

    /// Puts a failed batch back ahead of entries captured since it was taken.
    ///
    /// Returns how many entries were evicted to respect the capacity.
    pub fn requeue_front(&mut self, batch: Vec<LogEntry>) -> usize {
        let newer = std::mem::take(&mut self.entries);
        self.entries = batch.into_iter().chain(newer).collect();
        self.enforce_capacity()
    }

    /// Iterates the buffered entries oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    fn enforce_capacity(&mut self) -> usize {
        let overflow = self.entries.len().saturating_sub(self.capacity);
        self.entries.drain(..overflow);
        overflow
    }
}
