//! Grounding Trace
//!
//! Per-pass statistics for observing what a grounding pass did: rows
//! scanned, rules created, duplicates merged. Serializable for downstream
//! tooling.

use serde::Serialize;

/// Statistics for one grounding pass (full or incremental).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GroundingTrace {
    /// Result rows expanded into candidate ground rules
    pub rows_expanded: usize,
    /// Fresh ground rules inserted
    pub rules_created: usize,
    /// Candidates merged into existing rules
    pub rules_merged: usize,
}

impl GroundingTrace {
    /// An empty trace
    pub fn new() -> Self {
        GroundingTrace::default()
    }

    /// Total candidates produced, fresh and merged
    pub fn total_groundings(&self) -> usize {
        self.rules_created + self.rules_merged
    }

    /// Fold another pass's counters into this one
    pub fn absorb(&mut self, other: &GroundingTrace) {
        self.rows_expanded += other.rows_expanded;
        self.rules_created += other.rules_created;
        self.rules_merged += other.rules_merged;
    }

    /// JSON rendering for tooling
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
