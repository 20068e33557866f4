//! # Ranking Store
//!
//! The authoritative mapping from event identifier to [`RankingRecord`].
//!
//! A single mutex guards every read and write. Reads hand out owned copies,
//! so a caller never observes a later mutation through a value it already
//! holds.

use crate::formats::{RecordMap, records_from_bytes, records_to_bytes};
use crate::{EventId, Kind, RankError, RankingRecord};
use parking_lot::{Mutex, MutexGuard};
use std::collections::BTreeMap;

/// Concurrent record store.
#[derive(Debug, Default)]
pub struct RankingStore {
    records: Mutex<RecordMap>,
}

impl RankingStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `records`.
    #[must_use]
    pub fn with_records(records: RecordMap) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    /// Insert or overwrite a record by its identifier.
    ///
    /// Returns the record that was replaced, if any.
    pub fn upsert(&self, record: RankingRecord) -> Option<RankingRecord> {
        self.records.lock().insert(record.event_id.clone(), record)
    }

    /// Clone of a single record.
    #[must_use]
    pub fn get(&self, id: &EventId) -> Option<RankingRecord> {
        self.records.lock().get(id).cloned()
    }

    /// Deep copy of the full mapping.
    #[must_use]
    pub fn get_all(&self) -> RecordMap {
        self.records.lock().clone()
    }

    /// Number of records.
    #[must_use]
    pub fn count(&self) -> usize {
        self.records.lock().len()
    }

    /// Occurrences per event kind.
    ///
    /// Placeholders carry no kind and are skipped, so the counts can sum to
    /// less than [`count`](Self::count).
    #[must_use]
    pub fn count_by_kind(&self) -> BTreeMap<Kind, u64> {
        let records = self.records.lock();
        let mut kinds = BTreeMap::new();
        for kind in records.values().filter_map(RankingRecord::kind) {
            let entry = kinds.entry(kind).or_insert(0u64);
            *entry = entry.saturating_add(1);
        }
        kinds
    }

    /// Decode `bytes` and merge the records into the store.
    ///
    /// Decoded records overwrite existing ones with the same identifier.
    /// On error the store is left untouched. Returns the number of decoded
    /// records.
    pub fn load(&self, bytes: &[u8]) -> Result<usize, RankError> {
        let decoded = records_from_bytes(bytes)?;
        let loaded = decoded.len();
        self.records.lock().extend(decoded);
        Ok(loaded)
    }

    /// Serialize the full mapping.
    pub fn save(&self) -> Result<Vec<u8>, RankError> {
        records_to_bytes(&self.records.lock())
    }

    /// Hold the store lock. Used by passes that must be atomic with respect
    /// to ingestion.
    pub(crate) fn lock(&self) -> MutexGuard<'_, RecordMap> {
        self.records.lock()
    }
}

// =============================================================================
// TESTS
// =============================================================================
