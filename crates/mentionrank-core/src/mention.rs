//! # Mention Graph Builder
//!
//! Full recomputation of `score`, `mentions` and `mention_map` from the
//! cross-reference tags of every stored event.
//!
//! The pass works on a `&mut RecordMap`, so the caller decides how atomicity
//! is obtained. [`RankingEngine::recompute`](crate::RankingEngine::recompute)
//! runs it under the store lock.
//!
//! ## Algorithm
//!
//! 1. Reset every record (`score = K`, no mentions).
//! 2. Collect `(source, targets)` for every record that carries an event.
//!    Targets are deduplicated per source.
//! 3. Credit each target. Unknown targets get a placeholder record.
//!
//! Sources are collected before any placeholder is inserted, so placeholders
//! created during a pass are never sources within that pass. Self-references
//! are counted like any other reference.

use crate::formats::RecordMap;
use crate::{EventId, RankingRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Summary of one recomputation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecomputeStats {
    /// Records in the store after the pass.
    pub records: usize,
    /// Placeholder records created by this pass.
    pub placeholders_created: usize,
    /// Distinct (source, target) mentions counted.
    pub mentions: u64,
}

/// The mention graph recomputation pass.
pub struct MentionGraph;

impl MentionGraph {
    /// Recompute mentions and scores for every record in `records`.
    pub fn recompute(records: &mut RecordMap) -> RecomputeStats {
        for record in records.values_mut() {
            record.reset();
        }

        let sources = Self::collect_sources(records);

        let mut stats = RecomputeStats::default();
        for (source, targets) in sources {
            for target in targets {
                match records.get_mut(&target) {
                    Some(record) => {
                        if record.add_mention(source.clone()) {
                            stats.mentions = stats.mentions.saturating_add(1);
                        }
                    }
                    None => {
                        let placeholder = RankingRecord::placeholder(target.clone(), source.clone());
                        records.insert(target, placeholder);
                        stats.placeholders_created += 1;
                        stats.mentions = stats.mentions.saturating_add(1);
                    }
                }
            }
        }

        stats.records = records.len();
        stats
    }

    /// Snapshot of every referencing record and the identifiers it references.
    fn collect_sources(records: &RecordMap) -> Vec<(EventId, BTreeSet<EventId>)> {
        records
            .values()
            .filter_map(|record| {
                let targets = record.event.as_ref()?.references();
                (!targets.is_empty()).then(|| (record.event_id.clone(), targets))
            })
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
