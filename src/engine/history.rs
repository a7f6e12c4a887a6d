// Per-interface cumulative counter history

use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Last-seen cumulative counters for one interface. The history, not the
/// dataset, is the source of truth for packet deltas: the dataset's per-tick
/// counters are derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryEntry {
    pub in_packets: u64,
    pub out_packets: u64,
    pub last_update: DateTime<Utc>,
}

/// Interface name -> history entry. Created lazily on first observation,
/// never evicted; cardinality is bounded by the dataset's interface list.
#[derive(Debug, Default)]
pub struct InterfaceHistory {
    entries: HashMap<String, HistoryEntry>,
}

impl InterfaceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for `name`, creating it seeded from the current
    /// cumulative counters if this interface has not been seen before.
    pub fn get_or_create(
        &mut self,
        name: &str,
        seed_in: u64,
        seed_out: u64,
        now: DateTime<Utc>,
    ) -> HistoryEntry {
        *self
            .entries
            .entry(name.to_string())
            .or_insert(HistoryEntry {
                in_packets: seed_in,
                out_packets: seed_out,
                last_update: now,
            })
    }

    pub fn update(&mut self, name: &str, in_packets: u64, out_packets: u64, now: DateTime<Utc>) {
        self.entries.insert(
            name.to_string(),
            HistoryEntry {
                in_packets,
                out_packets,
                last_update: now,
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&HistoryEntry> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
