//! # Ranking Orderer
//!
//! Produces the published leaderboard from a set of records.
//!
//! The ordering is a two-stage compound sort:
//! - Stage A: `mentions` descending, unstable
//! - Stage B: `score` descending, stable
//!
//! Stage B is stable, so records with equal scores keep their Stage A
//! (mention) order. Both stages must stay as they are for output
//! compatibility, including the stability asymmetry.

use crate::RankingRecord;
use std::cmp::Reverse;
use std::ops::Deref;
use std::sync::Arc;

/// Order `records` by score, then by mentions.
#[must_use]
pub fn order_by_rank(mut records: Vec<RankingRecord>) -> Vec<RankingRecord> {
    records.sort_unstable_by_key(|record| Reverse(record.mentions));
    records.sort_by_key(|record| Reverse(record.score));
    records
}

/// An immutable, shareable ordering.
///
/// Published snapshots are replaced as a whole and never mutated, so a
/// reader holding one always sees a complete sequence.
#[derive(Debug, Clone, Default)]
pub struct OrderedSnapshot(Arc<[RankingRecord]>);

impl OrderedSnapshot {
    /// The first `n` records.
    #[must_use]
    pub fn top(&self, n: usize) -> &[RankingRecord] {
        &self.0[..n.min(self.0.len())]
    }

    /// Position of `id` in the ordering.
    #[must_use]
    pub fn position(&self, id: &crate::EventId) -> Option<usize> {
        self.0.iter().position(|record| &record.event_id == id)
    }
}

impl From<Vec<RankingRecord>> for OrderedSnapshot {
    fn from(records: Vec<RankingRecord>) -> Self {
        Self(records.into())
    }
}

impl Deref for OrderedSnapshot {
    type Target = [RankingRecord];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EventId, Score};
    use std::collections::BTreeSet;

    fn rec(id: &str, score: i64, mentions: u64) -> RankingRecord {
        RankingRecord {
            event_id: EventId::from(id),
            event: None,
            score: Score(score),
            mentions,
            mention_map: BTreeSet::new(),
        }
    }

    fn ids(records: &[RankingRecord]) -> Vec<&str> {
        records.iter().map(|r| r.event_id.as_str()).collect()
    }

    #[test]
    fn equal_scores_fall_back_to_mentions() {
        let ordered = order_by_rank(vec![
            rec("low", 400, 1),
            rec("high", 400, 9),
            rec("mid", 400, 4),
        ]);
        assert_eq!(ids(&ordered), vec!["high", "mid", "low"]);
    }

    #[test]
    fn score_dominates_mentions() {
        let ordered = order_by_rank(vec![
            rec("popular", 400, 50),
            rec("boosted", 900, 0),
            rec("sunk", 100, 99),
        ]);
        assert_eq!(ids(&ordered), vec!["boosted", "popular", "sunk"]);
    }

    #[test]
    fn score_ties_keep_mention_order_across_groups() {
        let ordered = order_by_rank(vec![
            rec("a", 500, 1),
            rec("b", 400, 3),
            rec("c", 500, 7),
            rec("d", 400, 5),
        ]);
        assert_eq!(ids(&ordered), vec!["c", "a", "d", "b"]);
    }

    #[test]
    fn snapshot_top_clamps() {
        let snapshot = OrderedSnapshot::from(vec![rec("a", 400, 1), rec("b", 400, 0)]);
        assert_eq!(snapshot.top(1).len(), 1);
        assert_eq!(snapshot.top(10).len(), 2);
        assert_eq!(snapshot.position(&EventId::from("b")), Some(1));
        assert!(OrderedSnapshot::default().is_empty());
    }
}
