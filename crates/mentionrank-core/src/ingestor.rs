//! # Ingestor Module
//!
//! The single write path for external traffic.
//!
//! - Builds a fresh record for every incoming event
//! - Upserts it into the store (last write wins)
//! - Never validates payloads and never triggers recomputation
//!
//! Replacing a placeholder drops its derived mentions until the next
//! recomputation pass restores them. The receipt reports when that happens.

use crate::store::RankingStore;
use crate::{Event, EventId, RankingRecord};
use serde::{Deserialize, Serialize};

/// What an ingestion did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestOutcome {
    /// First record for this identifier.
    Inserted,
    /// An earlier event with the same identifier was overwritten.
    Replaced,
    /// A mention placeholder was overwritten by the real event.
    ReplacedPlaceholder,
}

/// Result of ingesting one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReceipt {
    pub event_id: EventId,
    pub outcome: IngestOutcome,
}

/// The Ingestor turns events into ranking records.
pub struct Ingestor;

impl Ingestor {
    /// Ingest a single event.
    pub fn ingest(store: &RankingStore, event: Event) -> IngestReceipt {
        let record = RankingRecord::from_event(event);
        let event_id = record.event_id.clone();

        let outcome = match store.upsert(record) {
            None => IngestOutcome::Inserted,
            Some(previous) if previous.is_placeholder() => {
                tracing::debug!(
                    event_id = %event_id,
                    lost_mentions = previous.mentions,
                    "placeholder replaced by event"
                );
                IngestOutcome::ReplacedPlaceholder
            }
            Some(_) => IngestOutcome::Replaced,
        };

        IngestReceipt { event_id, outcome }
    }

    /// Ingest events in order. Later duplicates overwrite earlier ones.
    pub fn ingest_batch<I>(store: &RankingStore, events: I) -> Vec<IngestReceipt>
    where
        I: IntoIterator<Item = Event>,
    {
        events
            .into_iter()
            .map(|event| Self::ingest(store, event))
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
