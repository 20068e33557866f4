//! # Engine Primitives
//!
//! Hardcoded runtime constants for the mentionrank engine.
//!
//! The engine starts with zero data but fixed logic.
//! These primitives are compiled into the binary and are immutable at runtime.

/// Baseline rank weight (`K`).
///
/// Every recomputation pass resets every record's score to this value.
pub const BASELINE_SCORE: i64 = 400;

/// Tag name of a cross-reference: `["e", <event id>]`.
pub const REFERENCE_TAG: &str = "e";

/// Magic bytes for the persisted store header.
///
/// - Blob = Magic Bytes ("MRNK") + Version (u8) before payload.
pub const MAGIC_BYTES: &[u8; 4] = b"MRNK";

/// Current serialization format version.
///
/// Increment this when making breaking changes to the serialization format.
pub const FORMAT_VERSION: u8 = 1;

/// Persistence namespace used when the host does not pick one.
pub const DEFAULT_NAMESPACE: &str = "mentionrank";

/// Persistence key holding the current store.
pub const DEFAULT_KEY: &str = "current";

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================
//
// The engine itself never rejects an event. These limits are enforced by
// hosts at their API boundary, before events reach the ingestor.

/// Maximum length of an event identifier.
pub const MAX_EVENT_ID_LENGTH: usize = 256;

/// Maximum number of tags on a single event.
pub const MAX_TAGS_PER_EVENT: usize = 2000;

/// Maximum length of event content (64KB).
pub const MAX_CONTENT_LENGTH: usize = 65536;

/// Maximum number of events in a single batch ingestion.
pub const MAX_BATCH_LENGTH: usize = 10000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_score_is_400() {
        assert_eq!(BASELINE_SCORE, 400);
    }

    #[test]
    fn magic_bytes_correct() {
        assert_eq!(MAGIC_BYTES, b"MRNK");
    }
}
