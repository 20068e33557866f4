//! # Persistence Format
//!
//! Binary serialization for the ranking store.
//!
//! The format is defined here. Where the bytes go is decided by a
//! [`PersistenceGateway`](crate::storage::PersistenceGateway).
//!
//! Format: Header (5 bytes) + postcard-serialized record map.
//! - 4 bytes: Magic ("MRNK")
//! - 1 byte: Version
//!
//! An empty blob is the "no prior state" marker and decodes to an empty map.
//!
//! ## Limits
//!
//! Blob size and header are validated before the payload is parsed.

use crate::{EventId, RankError, RankingRecord, primitives};
use std::collections::BTreeMap;

// =============================================================================
// SECURITY LIMITS
// =============================================================================

/// Maximum allowed blob size.
///
/// Validated BEFORE attempting deserialization so a corrupted or hostile
/// blob cannot force a huge allocation.
pub const MAX_PERSISTENCE_PAYLOAD_SIZE: usize = 500 * 1024 * 1024; // 500 MB

/// Size of the header.
const HEADER_SIZE: usize = 5;

/// Records keyed by identifier, as persisted.
pub type RecordMap = BTreeMap<EventId, RankingRecord>;

// =============================================================================
// FILE HEADER
// =============================================================================

/// The persistence header precedes all record data.
#[derive(Debug, Clone, Copy)]
pub struct PersistenceHeader {
    pub magic: [u8; 4],
    pub version: u8,
}

impl PersistenceHeader {
    /// Create a new header with current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            magic: *primitives::MAGIC_BYTES,
            version: primitives::FORMAT_VERSION,
        }
    }

    /// Validate the header.
    pub fn validate(&self) -> Result<(), RankError> {
        if &self.magic != primitives::MAGIC_BYTES {
            return Err(RankError::DeserializationError(
                "Invalid magic bytes".to_string(),
            ));
        }
        if self.version != primitives::FORMAT_VERSION {
            return Err(RankError::DeserializationError(format!(
                "Unsupported version: {} (expected {})",
                self.version,
                primitives::FORMAT_VERSION
            )));
        }
        Ok(())
    }

    /// Write header to bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4] = self.version;
        bytes
    }

    /// Read header from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RankError> {
        if bytes.len() < HEADER_SIZE {
            return Err(RankError::DeserializationError(
                "Header too short".to_string(),
            ));
        }
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);
        Ok(Self {
            magic,
            version: bytes[4],
        })
    }
}

impl Default for PersistenceHeader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// SERIALIZATION FUNCTIONS
// =============================================================================

/// Serialize a record map to bytes (header + payload).
///
/// This is a pure transformation - no I/O.
pub fn records_to_bytes(records: &RecordMap) -> Result<Vec<u8>, RankError> {
    let header = PersistenceHeader::new();

    let payload = postcard::to_stdvec(records)
        .map_err(|e| RankError::SerializationError(e.to_string()))?;

    let mut result = Vec::with_capacity(HEADER_SIZE + payload.len());
    result.extend_from_slice(&header.to_bytes());
    result.extend_from_slice(&payload);

    Ok(result)
}

/// Deserialize a record map from bytes.
///
/// This is a pure transformation - no I/O. An empty slice yields an empty
/// map. Otherwise the size limit and header are checked before the payload
/// is decoded.
pub fn records_from_bytes(bytes: &[u8]) -> Result<RecordMap, RankError> {
    if bytes.is_empty() {
        return Ok(RecordMap::new());
    }

    if bytes.len() < HEADER_SIZE {
        return Err(RankError::DeserializationError(format!(
            "Data too short: minimum {} bytes required",
            HEADER_SIZE
        )));
    }

    if bytes.len() > MAX_PERSISTENCE_PAYLOAD_SIZE {
        return Err(RankError::DeserializationError(format!(
            "Data size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_PERSISTENCE_PAYLOAD_SIZE
        )));
    }

    let header = PersistenceHeader::from_bytes(bytes)?;
    header.validate()?;

    let payload = &bytes[HEADER_SIZE..];
    let mut records: RecordMap = postcard::from_bytes(payload).map_err(|e| {
        RankError::DeserializationError(format!("Failed to deserialize records: {}", e))
    })?;

    // Keys are authoritative; a record whose own id disagrees is re-keyed.
    for (key, record) in &mut records {
        if &record.event_id != key {
            record.event_id = key.clone();
        }
    }

    Ok(records)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Event, Kind, Tag};

    fn sample() -> RecordMap {
        let mut records = RecordMap::new();
        let a = Event::new("a", Kind::TEXT_NOTE, vec![]);
        let b = Event::new("b", Kind(7), vec![Tag::reference(&EventId::from("a"))]);
        let mut ra = RankingRecord::from_event(a);
        ra.add_mention(EventId::from("b"));
        records.insert(EventId::from("a"), ra);
        records.insert(EventId::from("b"), RankingRecord::from_event(b));
        records.insert(
            EventId::from("z"),
            RankingRecord::placeholder(EventId::from("z"), EventId::from("b")),
        );
        records
    }

    #[test]
    fn header_roundtrip() {
        let header = PersistenceHeader::new();
        let bytes = header.to_bytes();
        let restored = PersistenceHeader::from_bytes(&bytes).expect("parse header");

        assert_eq!(restored.magic, *primitives::MAGIC_BYTES);
        assert_eq!(restored.version, primitives::FORMAT_VERSION);
    }

    #[test]
    fn bytes_roundtrip_bit_exact() {
        let records = sample();

        let bytes1 = records_to_bytes(&records).expect("first serialize");
        let restored = records_from_bytes(&bytes1).expect("deserialize");
        let bytes2 = records_to_bytes(&restored).expect("second serialize");

        assert_eq!(restored, records);
        assert_eq!(
            bytes1, bytes2,
            "save -> load -> save must produce identical bytes"
        );
    }

    #[test]
    fn empty_blob_is_empty_store() {
        let restored = records_from_bytes(&[]).expect("empty is not an error");
        assert!(restored.is_empty());
    }

    #[test]
    fn invalid_magic_rejected() {
        let mut bytes = vec![0u8; 10];
        bytes[0..4].copy_from_slice(b"XXXX");

        let result = records_from_bytes(&bytes);
        assert!(matches!(result, Err(RankError::DeserializationError(_))));
    }

    #[test]
    fn truncated_header_rejected() {
        assert!(records_from_bytes(b"MRN").is_err());
    }

    #[test]
    fn wrong_version_rejected() {
        let mut bytes = records_to_bytes(&sample()).expect("serialize");
        bytes[4] = primitives::FORMAT_VERSION.wrapping_add(1);
        assert!(records_from_bytes(&bytes).is_err());
    }

    #[test]
    fn corrupted_payload_rejected() {
        let mut bytes = PersistenceHeader::new().to_bytes().to_vec();
        bytes.extend_from_slice(&[0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
        assert!(records_from_bytes(&bytes).is_err());
    }
}
