//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use mentionrank_core::{
    Event, EventId, IngestOutcome, Kind, RankError, RankMetrics, RankingRecord, RecomputeStats,
    Tag,
    primitives::{MAX_CONTENT_LENGTH, MAX_EVENT_ID_LENGTH, MAX_TAGS_PER_EVENT},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Entries returned by `GET /order` when no limit is given.
pub const DEFAULT_ORDER_LIMIT: usize = 100;

/// Largest accepted `limit` for `GET /order`.
pub const MAX_ORDER_LIMIT: usize = 10_000;

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// STATUS RESPONSE
// =============================================================================

/// Engine status response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub records: usize,
    pub events: usize,
    pub placeholders: usize,
    pub total_mentions: u64,
    pub mentioned: usize,
    pub mean_mentions_millis: u64,
    /// Length of the published ordering.
    pub ordered: usize,
}

impl StatusResponse {
    pub fn new(metrics: RankMetrics, ordered: usize) -> Self {
        Self {
            records: metrics.records,
            events: metrics.events,
            placeholders: metrics.placeholders,
            total_mentions: metrics.total_mentions,
            mentioned: metrics.mentioned,
            mean_mentions_millis: metrics.mean_mentions_millis,
            ordered,
        }
    }
}

// =============================================================================
// EVENT REQUEST / INGEST RESPONSE
// =============================================================================

/// Event ingest request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRequest {
    pub id: String,
    #[serde(default)]
    pub pubkey: String,
    #[serde(default)]
    pub created_at: u64,
    pub kind: u64,
    #[serde(default)]
    pub tags: Vec<Vec<String>>,
    #[serde(default)]
    pub content: String,
}

impl EventRequest {
    /// Convert to an Event, validating sizes.
    ///
    /// The engine accepts anything; these limits keep oversized payloads out
    /// at the API boundary.
    pub fn to_event(&self) -> Result<Event, RankError> {
        if self.id.is_empty() {
            return Err(RankError::InvalidEvent("empty event id".to_string()));
        }
        if self.id.len() > MAX_EVENT_ID_LENGTH {
            return Err(RankError::InvalidEvent(format!(
                "Event id length {} exceeds maximum {} bytes",
                self.id.len(),
                MAX_EVENT_ID_LENGTH
            )));
        }
        if self.tags.len() > MAX_TAGS_PER_EVENT {
            return Err(RankError::InvalidEvent(format!(
                "Tag count {} exceeds maximum {}",
                self.tags.len(),
                MAX_TAGS_PER_EVENT
            )));
        }
        if self.content.len() > MAX_CONTENT_LENGTH {
            return Err(RankError::InvalidEvent(format!(
                "Content length {} exceeds maximum {} bytes",
                self.content.len(),
                MAX_CONTENT_LENGTH
            )));
        }

        Ok(Event {
            id: EventId::new(&self.id),
            pubkey: self.pubkey.clone(),
            created_at: self.created_at,
            kind: Kind(self.kind),
            tags: self.tags.iter().cloned().map(Tag).collect(),
            content: self.content.clone(),
        })
    }
}

/// Event ingest response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    pub success: bool,
    pub event_id: Option<String>,
    pub outcome: Option<IngestOutcome>,
    pub error: Option<String>,
}

impl IngestResponse {
    pub fn success(event_id: &EventId, outcome: IngestOutcome) -> Self {
        Self {
            success: true,
            event_id: Some(event_id.to_string()),
            outcome: Some(outcome),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            event_id: None,
            outcome: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// RECOMPUTE RESPONSE
// =============================================================================

/// Recomputation pass response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecomputeResponse {
    pub success: bool,
    pub records: usize,
    pub placeholders_created: usize,
    pub mentions: u64,
}

impl From<RecomputeStats> for RecomputeResponse {
    fn from(stats: RecomputeStats) -> Self {
        Self {
            success: true,
            records: stats.records,
            placeholders_created: stats.placeholders_created,
            mentions: stats.mentions,
        }
    }
}

// =============================================================================
// ORDER REQUEST/RESPONSE
// =============================================================================

/// Query string of `GET /order`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderQuery {
    pub limit: Option<usize>,
}

impl OrderQuery {
    /// Requested limit, defaulted and capped.
    #[must_use]
    pub fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_ORDER_LIMIT)
            .min(MAX_ORDER_LIMIT)
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankEntry {
    /// 1-based position.
    pub rank: usize,
    pub event_id: String,
    pub score: i64,
    pub mentions: u64,
    pub kind: Option<u64>,
    pub placeholder: bool,
}

impl RankEntry {
    pub fn new(rank: usize, record: &RankingRecord) -> Self {
        Self {
            rank,
            event_id: record.event_id.to_string(),
            score: record.score.value(),
            mentions: record.mentions,
            kind: record.kind().map(|k| k.value()),
            placeholder: record.is_placeholder(),
        }
    }

    /// Rows for the first records of an ordering.
    pub fn from_ordering(records: &[RankingRecord]) -> Vec<Self> {
        records
            .iter()
            .enumerate()
            .map(|(i, record)| Self::new(i + 1, record))
            .collect()
    }
}

/// Leaderboard response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
    /// Length of the full published ordering.
    pub total: usize,
    pub entries: Vec<RankEntry>,
}

// =============================================================================
// RECORD RESPONSE
// =============================================================================

/// Single record JSON representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordJson {
    pub event_id: String,
    pub event: Option<Event>,
    pub score: i64,
    pub mentions: u64,
    pub mentioned_by: Vec<String>,
}

impl From<RankingRecord> for RecordJson {
    fn from(record: RankingRecord) -> Self {
        Self {
            event_id: record.event_id.to_string(),
            score: record.score.value(),
            mentions: record.mentions,
            mentioned_by: record.mention_map.iter().map(ToString::to_string).collect(),
            event: record.event,
        }
    }
}

/// Record lookup response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordResponse {
    pub found: bool,
    pub record: Option<RecordJson>,
}

// =============================================================================
// KINDS RESPONSE
// =============================================================================

/// Occurrences of one event kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindCount {
    pub kind: u64,
    pub count: u64,
}

/// Kind histogram response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KindsResponse {
    pub kinds: Vec<KindCount>,
}

impl From<BTreeMap<Kind, u64>> for KindsResponse {
    fn from(kinds: BTreeMap<Kind, u64>) -> Self {
        Self {
            kinds: kinds
                .into_iter()
                .map(|(kind, count)| KindCount {
                    kind: kind.value(),
                    count,
                })
                .collect(),
        }
    }
}

// =============================================================================
// EXPORT RESPONSE
// =============================================================================

/// Export response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResponse {
    pub success: bool,
    pub data: Option<String>, // Base64 encoded
    pub records: Option<usize>,
    pub error: Option<String>,
}

impl ExportResponse {
    pub fn success(data: &[u8], records: usize) -> Self {
        Self {
            success: true,
            data: Some(base64::Engine::encode(
                &base64::engine::general_purpose::STANDARD,
                data,
            )),
            records: Some(records),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            records: None,
            error: Some(msg.into()),
        }
    }
}
