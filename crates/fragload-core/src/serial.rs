//! Per-fragment attempt counters used to vary request URLs.
//!
//! The first request for a fragment carries no serial so ordinary HTTP and
//! proxy caching still apply. Every later request for the same fragment gets
//! a value no earlier request used, so a cached failure cannot be replayed.

use std::collections::HashMap;

use crate::fragment::FragmentId;

/// Attempt counts keyed by fragment. Missing entries count as 0.
#[derive(Debug, Default, Clone)]
pub struct SerialRegistry {
    counts: HashMap<FragmentId, u64>,
}

impl SerialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current count for `fragment` and stores count + 1.
    ///
    /// Counts are 64-bit so no realistic number of retries repeats a value;
    /// the counter only saturates at `u64::MAX`.
    pub fn next_serial(&mut self, fragment: FragmentId) -> u64 {
        let slot = self.counts.entry(fragment).or_insert(0);
        let serial = *slot;
        *slot = serial.saturating_add(1);
        serial
    }

    /// Current count without consuming it.
    pub fn peek(&self, fragment: FragmentId) -> u64 {
        self.counts.get(&fragment).copied().unwrap_or(0)
    }
}
