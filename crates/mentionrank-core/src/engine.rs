//! # Ranking Engine
//!
//! Ties the store, the mention pass and the published ordering together.
//!
//! The engine owns two independent locks:
//! - the store lock, inside [`RankingStore`]
//! - the snapshot lock, guarding the current [`OrderedSnapshot`]
//!
//! Only [`RankingEngine::recompute`] takes both, always store first.
//! Snapshot readers never wait on ingestion.

use crate::formats::{RecordMap, records_to_bytes};
use crate::ingestor::{IngestReceipt, Ingestor};
use crate::mention::{MentionGraph, RecomputeStats};
use crate::order::{OrderedSnapshot, order_by_rank};
use crate::store::RankingStore;
use crate::system::RankMetrics;
use crate::{Event, EventId, Kind, RankError, RankingRecord};
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// The ranking state engine.
#[derive(Debug, Default)]
pub struct RankingEngine {
    store: RankingStore,
    order: Mutex<OrderedSnapshot>,
}

impl RankingEngine {
    /// Create an empty engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &RankingStore {
        &self.store
    }

    /// Ingest one event. Never triggers recomputation.
    pub fn ingest(&self, event: Event) -> IngestReceipt {
        Ingestor::ingest(&self.store, event)
    }

    /// Ingest events in order.
    pub fn ingest_batch<I>(&self, events: I) -> Vec<IngestReceipt>
    where
        I: IntoIterator<Item = Event>,
    {
        Ingestor::ingest_batch(&self.store, events)
    }

    /// Run a full mention pass and publish a fresh ordering.
    ///
    /// The store lock is held for the whole pass, including the sort and
    /// the snapshot swap.
    pub fn recompute(&self) -> RecomputeStats {
        let mut records = self.store.lock();
        let stats = MentionGraph::recompute(&mut records);

        let ordered = order_by_rank(records.values().cloned().collect());
        *self.order.lock() = OrderedSnapshot::from(ordered);
        drop(records);

        tracing::debug!(
            records = stats.records,
            placeholders_created = stats.placeholders_created,
            mentions = stats.mentions,
            "mention pass complete"
        );
        stats
    }

    /// The most recently published ordering.
    ///
    /// Empty until the first [`recompute`](Self::recompute).
    #[must_use]
    pub fn current_order(&self) -> OrderedSnapshot {
        self.order.lock().clone()
    }

    /// Deep copy of every record.
    #[must_use]
    pub fn get_all(&self) -> RecordMap {
        self.store.get_all()
    }

    /// Clone of one record.
    #[must_use]
    pub fn get(&self, id: &EventId) -> Option<RankingRecord> {
        self.store.get(id)
    }

    /// Number of records, placeholders included.
    #[must_use]
    pub fn count(&self) -> usize {
        self.store.count()
    }

    /// Occurrences per event kind.
    #[must_use]
    pub fn count_by_kind(&self) -> BTreeMap<Kind, u64> {
        self.store.count_by_kind()
    }

    /// Merge a persisted blob into the store.
    pub fn restore(&self, bytes: &[u8]) -> Result<usize, RankError> {
        self.store.load(bytes)
    }

    /// Serialize the store.
    pub fn snapshot_bytes(&self) -> Result<Vec<u8>, RankError> {
        self.store.save()
    }

    /// Serialize the store together with its record count, both taken from
    /// one lock hold.
    pub fn snapshot_counted(&self) -> Result<(Vec<u8>, usize), RankError> {
        let records = self.store.lock();
        let bytes = records_to_bytes(&records)?;
        Ok((bytes, records.len()))
    }

    /// Serialize the store and hand the bytes to `write` while the store
    /// lock is still held, so no ingestion lands between encoding and
    /// writing.
    pub fn persist_with<F>(&self, write: F) -> Result<usize, RankError>
    where
        F: FnOnce(&[u8]) -> Result<(), RankError>,
    {
        let records = self.store.lock();
        let bytes = records_to_bytes(&records)?;
        write(&bytes)?;
        Ok(bytes.len())
    }

    /// Summary counters over the current store.
    #[must_use]
    pub fn metrics(&self) -> RankMetrics {
        RankMetrics::from_records(&self.store.lock())
    }
}

// =============================================================================
// TESTS
// =============================================================================
