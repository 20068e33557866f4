//! # Ranking Metrics
//!
//! Summary counters over the store, for status reporting.

use crate::formats::RecordMap;
use serde::{Deserialize, Serialize};

/// Counters extracted from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RankMetrics {
    /// Total records, placeholders included.
    pub records: usize,
    /// Records carrying an ingested event.
    pub events: usize,
    /// Records created only because something referenced them.
    pub placeholders: usize,
    /// Sum of `mentions` over every record.
    pub total_mentions: u64,
    /// Records with at least one mention.
    pub mentioned: usize,
    /// Mean mentions per mentioned record, in thousandths (integer only).
    pub mean_mentions_millis: u64,
}

impl RankMetrics {
    /// Create metrics with all zeros.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compute metrics from a record map.
    #[must_use]
    pub fn from_records(records: &RecordMap) -> Self {
        let mut metrics = Self::empty();
        for record in records.values() {
            metrics.records += 1;
            if record.is_placeholder() {
                metrics.placeholders += 1;
            } else {
                metrics.events += 1;
            }
            if record.mentions > 0 {
                metrics.mentioned += 1;
            }
            metrics.total_mentions = metrics.total_mentions.saturating_add(record.mentions);
        }

        metrics.mean_mentions_millis = if metrics.mentioned > 0 {
            metrics.total_mentions.saturating_mul(1000) / (metrics.mentioned as u64)
        } else {
            0
        };
        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Event, EventId, Kind, RankingRecord};

    #[test]
    fn empty_map_is_all_zero() {
        assert_eq!(RankMetrics::from_records(&RecordMap::new()), RankMetrics::empty());
    }

    #[test]
    fn counts_events_and_placeholders() {
        let mut records = RecordMap::new();
        let mut hub = RankingRecord::from_event(Event::new("hub", Kind::TEXT_NOTE, vec![]));
        hub.add_mention(EventId::from("x"));
        hub.add_mention(EventId::from("y"));
        hub.add_mention(EventId::from("z"));
        records.insert(hub.event_id.clone(), hub);
        let ghost = RankingRecord::placeholder(EventId::from("ghost"), EventId::from("x"));
        records.insert(ghost.event_id.clone(), ghost);
        let quiet = RankingRecord::from_event(Event::new("quiet", Kind::TEXT_NOTE, vec![]));
        records.insert(quiet.event_id.clone(), quiet);

        let metrics = RankMetrics::from_records(&records);

        assert_eq!(metrics.records, 3);
        assert_eq!(metrics.events, 2);
        assert_eq!(metrics.placeholders, 1);
        assert_eq!(metrics.total_mentions, 4);
        assert_eq!(metrics.mentioned, 2);
        assert_eq!(metrics.mean_mentions_millis, 2000);
    }
}
