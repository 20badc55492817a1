//! Debounced snapshot scheduling
//!
//! Bursts of mutations coalesce into one snapshot: the forest is written once
//! no mutation has happened for the debounce period.

use chrono::{DateTime, TimeDelta, Utc};

/// Default debounce in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

#[derive(Debug, Clone)]
pub struct SnapshotScheduler {
    debounce: TimeDelta,
    pending_mutations: usize,
    last_change: Option<DateTime<Utc>>,
}

impl Default for SnapshotScheduler {
    fn default() -> Self {
        Self::new(TimeDelta::milliseconds(DEFAULT_DEBOUNCE_MS as i64))
    }
}

impl SnapshotScheduler {
    pub fn new(debounce: TimeDelta) -> Self {
        Self {
            debounce,
            pending_mutations: 0,
            last_change: None,
        }
    }

    /// Record a mutation
    pub fn mark_dirty(&mut self, now: DateTime<Utc>) {
        self.pending_mutations += 1;
        self.last_change = Some(now);
    }

    /// Check if the debounce period has passed and there is something to write
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_change {
            Some(last) => self.pending_mutations > 0 && now - last >= self.debounce,
            None => false,
        }
    }

    /// Reset after a snapshot was taken; returns how many mutations it covered
    pub fn take(&mut self) -> usize {
        self.last_change = None;
        std::mem::take(&mut self.pending_mutations)
    }

    pub fn has_pending(&self) -> bool {
        self.pending_mutations > 0
    }
}
