//! # mentionrank-core
//!
//! The ranking state engine for mentionrank.
//!
//! Events are ranked by how many other events reference them through `"e"`
//! tags. The crate keeps:
//! - a concurrent store of per-event ranking records
//! - a full recomputation pass deriving mentions from cross-references
//! - a deterministic, immutable ordering published after every pass
//! - a start/stop lifecycle that restores and persists the store
//!
//! ## Architectural Constraints
//!
//! - Synchronous: NO async runtime, NO network dependencies
//! - Deterministic: `BTreeMap`/`BTreeSet` everywhere, integer arithmetic only
//! - Best-effort: the store is a recomputable derived index, not a ledger

// =============================================================================
// MODULES
// =============================================================================

pub mod engine;
pub mod formats;
pub mod ingestor;
pub mod mention;
pub mod order;
pub mod primitives;
pub mod storage;
pub mod store;
pub mod system;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{Event, EventId, Kind, RankError, RankingRecord, Score, Tag};

// =============================================================================
// RE-EXPORTS: Ranking Engine
// =============================================================================

pub use engine::RankingEngine;
pub use ingestor::{IngestOutcome, IngestReceipt, Ingestor};
pub use mention::{MentionGraph, RecomputeStats};
pub use order::{OrderedSnapshot, order_by_rank};
pub use store::RankingStore;

// =============================================================================
// RE-EXPORTS: Formats and Storage
// =============================================================================

pub use formats::{PersistenceHeader, RecordMap, records_from_bytes, records_to_bytes};
pub use storage::{MemoryGateway, PersistenceGateway, RedbGateway, StorageSlot};

// =============================================================================
// RE-EXPORTS: System (from system module)
// =============================================================================

pub use system::{Lifecycle, LifecycleState, LoadOutcome, PersistOutcome, RankMetrics};
