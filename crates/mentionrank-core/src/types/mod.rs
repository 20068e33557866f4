//! # Core Type Definitions
//!
//! This module contains all core types for the mentionrank engine:
//! - Event identifiers and classification (`EventId`, `Kind`)
//! - The tag-based event representation (`Tag`, `Event`)
//! - Ranking state (`Score`, `RankingRecord`)
//! - Error types (`RankError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer arithmetic only (no floating-point)
//! - Implement `Ord` where they key a `BTreeMap`/`BTreeSet`
//! - Use saturating arithmetic for counters to prevent overflow

use crate::primitives::{BASELINE_SCORE, REFERENCE_TAG};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Unique identifier of an event (its content hash, usually lowercase hex).
///
/// The engine treats the identifier as opaque: it is never parsed, only
/// compared and used as a map key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(pub String);

impl EventId {
    /// Create a new identifier.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EventId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Classification of an event (the Nostr `kind` field).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Kind(pub u64);

impl Kind {
    /// Short text note.
    pub const TEXT_NOTE: Self = Self(1);

    /// Get the raw kind value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

// =============================================================================
// EVENT
// =============================================================================

/// A single event tag: `[name, value, ...extra]`.
///
/// Serialized transparently as a JSON array of strings, matching the wire
/// shape hosts already use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Tag(pub Vec<String>);

impl Tag {
    /// Build a tag from its parts.
    #[must_use]
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    /// Build a cross-reference tag pointing at `target`.
    #[must_use]
    pub fn reference(target: &EventId) -> Self {
        Self(vec![REFERENCE_TAG.to_string(), target.0.clone()])
    }

    /// Tag name (first element).
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Tag value (second element).
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.0.get(1).map(String::as_str)
    }
}

/// An incoming content item.
///
/// This is a lightweight, tag-based view of the host's event type. The engine
/// reads `id`, `kind` and `tags`; every other field is carried as payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Content hash identifying this event.
    pub id: EventId,
    /// Author public key (hex).
    #[serde(default)]
    pub pubkey: String,
    /// Unix timestamp of creation.
    #[serde(default)]
    pub created_at: u64,
    /// Event classification.
    pub kind: Kind,
    /// Event tags.
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Free-form content.
    #[serde(default)]
    pub content: String,
}

impl Event {
    /// Create an event with no payload beyond id, kind and tags.
    #[must_use]
    pub fn new(id: impl Into<EventId>, kind: Kind, tags: Vec<Tag>) -> Self {
        Self {
            id: id.into(),
            pubkey: String::new(),
            created_at: 0,
            kind,
            tags,
            content: String::new(),
        }
    }

    /// Identifiers this event references through cross-reference tags.
    ///
    /// Duplicate references collapse to one. Tags without a value, or with
    /// an empty value, are skipped.
    #[must_use]
    pub fn references(&self) -> BTreeSet<EventId> {
        self.tags
            .iter()
            .filter(|tag| tag.name() == Some(REFERENCE_TAG))
            .filter_map(|tag| tag.value())
            .filter(|value| !value.is_empty())
            .map(EventId::from)
            .collect()
    }
}

// =============================================================================
// SCORE
// =============================================================================

/// Rank weight of a record.
///
/// Every recomputation pass resets it to [`BASELINE_SCORE`]. Adjusting it
/// afterwards is the job of collaborators outside this crate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Score(pub i64);

impl Score {
    /// The baseline score every pass starts from.
    pub const BASELINE: Self = Self(BASELINE_SCORE);

    /// Get the raw score value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

// =============================================================================
// RANKING RECORD
// =============================================================================

/// Ranking state for one event identifier.
///
/// A record without an `event` is a placeholder: some event referenced this
/// identifier before the event itself was ingested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingRecord {
    /// Key of the record.
    pub event_id: EventId,
    /// The event payload, `None` for placeholders.
    pub event: Option<Event>,
    /// Rank weight.
    pub score: Score,
    /// Number of distinct events referencing this one.
    pub mentions: u64,
    /// Identifiers of the events referencing this one.
    pub mention_map: BTreeSet<EventId>,
}

impl RankingRecord {
    /// Fresh record for a newly ingested event: zero score, no mentions.
    #[must_use]
    pub fn from_event(event: Event) -> Self {
        Self {
            event_id: event.id.clone(),
            event: Some(event),
            score: Score::default(),
            mentions: 0,
            mention_map: BTreeSet::new(),
        }
    }

    /// Placeholder for an identifier first seen as a reference target.
    #[must_use]
    pub fn placeholder(event_id: EventId, referenced_by: EventId) -> Self {
        let mut mention_map = BTreeSet::new();
        mention_map.insert(referenced_by);
        Self {
            event_id,
            event: None,
            score: Score::BASELINE,
            mentions: 1,
            mention_map,
        }
    }

    /// Whether this record has no event payload yet.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.event.is_none()
    }

    /// Kind of the underlying event, if any.
    #[must_use]
    pub fn kind(&self) -> Option<Kind> {
        self.event.as_ref().map(|e| e.kind)
    }

    /// Reset derived state to the start-of-pass values.
    pub fn reset(&mut self) {
        self.score = Score::BASELINE;
        self.mentions = 0;
        self.mention_map.clear();
    }

    /// Record that `source` references this record.
    ///
    /// Returns `false` if `source` was already counted.
    pub fn add_mention(&mut self, source: EventId) -> bool {
        let added = self.mention_map.insert(source);
        self.mentions = self.mention_map.len() as u64;
        added
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the mentionrank engine.
///
/// - No silent failures
/// - Use `Result<T, RankError>` for fallible operations
/// - The engine never panics; callers decide whether an error is fatal
#[derive(Debug, Error)]
pub enum RankError {
    /// The incoming event cannot be accepted.
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),

    /// A lifecycle operation was requested from the wrong state.
    #[error("Invalid lifecycle transition: {from} -> {to}")]
    InvalidTransition {
        /// State the controller was in.
        from: &'static str,
        /// State that was requested.
        to: &'static str,
    },
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: &str, refs: &[&str]) -> Event {
        let tags = refs.iter().map(|r| Tag::reference(&EventId::from(*r))).collect();
        Event::new(id, Kind::TEXT_NOTE, tags)
    }

    #[test]
    fn references_deduplicate() {
        let event = note("a", &["b", "c", "b"]);
        let refs: Vec<_> = event.references().into_iter().collect();
        assert_eq!(refs, vec![EventId::from("b"), EventId::from("c")]);
    }

    #[test]
    fn references_skip_malformed_tags() {
        let mut event = note("a", &["b"]);
        event.tags.push(Tag::new(["e"]));
        event.tags.push(Tag::new(["e", ""]));
        event.tags.push(Tag::new(["p", "somepubkey"]));
        event.tags.push(Tag::default());

        let refs: Vec<_> = event.references().into_iter().collect();
        assert_eq!(refs, vec![EventId::from("b")]);
    }

    #[test]
    fn from_event_starts_at_zero() {
        let record = RankingRecord::from_event(note("a", &[]));
        assert_eq!(record.event_id, EventId::from("a"));
        assert_eq!(record.score, Score(0));
        assert_eq!(record.mentions, 0);
        assert!(record.mention_map.is_empty());
        assert!(!record.is_placeholder());
    }

    #[test]
    fn placeholder_has_one_mention() {
        let record = RankingRecord::placeholder(EventId::from("b"), EventId::from("a"));
        assert!(record.is_placeholder());
        assert_eq!(record.score, Score::BASELINE);
        assert_eq!(record.mentions, 1);
        assert!(record.mention_map.contains(&EventId::from("a")));
    }

    #[test]
    fn add_mention_keeps_count_in_sync() {
        let mut record = RankingRecord::from_event(note("a", &[]));
        assert!(record.add_mention(EventId::from("x")));
        assert!(!record.add_mention(EventId::from("x")));
        assert!(record.add_mention(EventId::from("y")));
        assert_eq!(record.mentions, 2);

        record.reset();
        assert_eq!(record.mentions, 0);
        assert_eq!(record.score, Score::BASELINE);
        assert!(record.mention_map.is_empty());
    }
}
