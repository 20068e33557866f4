//! # Lifecycle Controller
//!
//! Synchronous start/stop state machine around a [`RankingEngine`].
//!
//! ```text
//! Stopped -> Starting -> Ready -> ShuttingDown -> Stopped
//! ```
//!
//! - `start` loads the persisted blob and reaches `Ready`. A blob that fails
//!   to read or decode is logged and the engine starts with whatever it
//!   already holds.
//! - `shutdown` writes the store through the gateway while holding the
//!   store lock, then reaches `Stopped`. A failed write is logged and the
//!   transition still completes.
//!
//! Readiness notification, the termination signal and the completion
//! handle belong to the async host, which calls into this type.

use crate::engine::RankingEngine;
use crate::storage::{PersistenceGateway, StorageSlot};
use crate::RankError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// =============================================================================
// STATES
// =============================================================================

/// Lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    #[default]
    Stopped,
    Starting,
    Ready,
    ShuttingDown,
}

impl LifecycleState {
    /// Get the state name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleState::Stopped => "stopped",
            LifecycleState::Starting => "starting",
            LifecycleState::Ready => "ready",
            LifecycleState::ShuttingDown => "shutting_down",
        }
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// What startup found in the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum LoadOutcome {
    /// A blob was decoded and merged.
    Restored { records: usize },
    /// Nothing was stored, or the stored blob was empty.
    NoData,
    /// The blob could not be read or decoded and was ignored.
    Discarded { reason: String },
}

/// What shutdown did with the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum PersistOutcome {
    /// The blob was handed to the gateway.
    Written { bytes: usize },
    /// Encoding or writing failed. The in-memory state is unchanged.
    Failed { reason: String },
}

// =============================================================================
// CONTROLLER
// =============================================================================

/// Drives one engine through its lifecycle.
pub struct Lifecycle {
    engine: Arc<RankingEngine>,
    gateway: Arc<dyn PersistenceGateway>,
    slot: StorageSlot,
    state: Mutex<LifecycleState>,
}

impl std::fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lifecycle")
            .field("slot", &self.slot)
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

impl Lifecycle {
    /// Create a controller in the `Stopped` state.
    #[must_use]
    pub fn new(
        engine: Arc<RankingEngine>,
        gateway: Arc<dyn PersistenceGateway>,
        slot: StorageSlot,
    ) -> Self {
        Self {
            engine,
            gateway,
            slot,
            state: Mutex::new(LifecycleState::Stopped),
        }
    }

    /// The engine under control.
    #[must_use]
    pub fn engine(&self) -> &Arc<RankingEngine> {
        &self.engine
    }

    /// Where the blob lives.
    #[must_use]
    pub fn slot(&self) -> &StorageSlot {
        &self.slot
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        *self.state.lock()
    }

    /// `Stopped -> Starting -> Ready`, loading persisted state on the way.
    pub fn start(&self) -> Result<LoadOutcome, RankError> {
        self.transition(LifecycleState::Stopped, LifecycleState::Starting)?;
        let outcome = self.load();
        self.transition(LifecycleState::Starting, LifecycleState::Ready)?;
        tracing::info!(
            namespace = %self.slot.namespace,
            key = %self.slot.key,
            records = self.engine.count(),
            "ranking engine ready"
        );
        Ok(outcome)
    }

    /// `Ready -> ShuttingDown -> Stopped`, persisting the store on the way.
    pub fn shutdown(&self) -> Result<PersistOutcome, RankError> {
        self.transition(LifecycleState::Ready, LifecycleState::ShuttingDown)?;
        let outcome = self.persist();
        self.transition(LifecycleState::ShuttingDown, LifecycleState::Stopped)?;
        tracing::info!("ranking engine stopped");
        Ok(outcome)
    }

    fn transition(&self, from: LifecycleState, to: LifecycleState) -> Result<(), RankError> {
        let mut state = self.state.lock();
        if *state != from {
            return Err(RankError::InvalidTransition {
                from: state.name(),
                to: to.name(),
            });
        }
        *state = to;
        Ok(())
    }

    fn load(&self) -> LoadOutcome {
        let bytes = match self.gateway.read(&self.slot.namespace, &self.slot.key) {
            Ok(Some(bytes)) if !bytes.is_empty() => bytes,
            Ok(_) => {
                tracing::debug!("no persisted ranking state");
                return LoadOutcome::NoData;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to read persisted ranking state");
                return LoadOutcome::Discarded {
                    reason: e.to_string(),
                };
            }
        };

        match self.engine.restore(&bytes) {
            Ok(records) => {
                tracing::info!(records, "restored ranking state");
                LoadOutcome::Restored { records }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to decode persisted ranking state");
                LoadOutcome::Discarded {
                    reason: e.to_string(),
                }
            }
        }
    }

    fn persist(&self) -> PersistOutcome {
        let gateway = &self.gateway;
        let slot = &self.slot;
        let result = self
            .engine
            .persist_with(|bytes| gateway.write(&slot.namespace, &slot.key, bytes));

        match result {
            Ok(bytes) => {
                tracing::info!(bytes, "persisted ranking state");
                PersistOutcome::Written { bytes }
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to persist ranking state");
                PersistOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryGateway;
    use crate::{Event, Kind};

    struct BrokenGateway;

    impl PersistenceGateway for BrokenGateway {
        fn read(&self, _: &str, _: &str) -> Result<Option<Vec<u8>>, RankError> {
            Err(RankError::IoError("unreachable disk".to_string()))
        }

        fn write(&self, _: &str, _: &str, _: &[u8]) -> Result<(), RankError> {
            Err(RankError::IoError("read-only".to_string()))
        }
    }

    fn lifecycle(gateway: Arc<dyn PersistenceGateway>) -> Lifecycle {
        Lifecycle::new(Arc::new(RankingEngine::new()), gateway, StorageSlot::default())
    }

    #[test]
    fn full_cycle_persists_and_restores() {
        let gateway = Arc::new(MemoryGateway::new());

        let first = lifecycle(gateway.clone());
        assert_eq!(first.start().expect("start"), LoadOutcome::NoData);
        assert_eq!(first.state(), LifecycleState::Ready);
        first.engine().ingest(Event::new("a", Kind::TEXT_NOTE, vec![]));
        assert!(matches!(
            first.shutdown().expect("shutdown"),
            PersistOutcome::Written { .. }
        ));
        assert_eq!(first.state(), LifecycleState::Stopped);

        let second = lifecycle(gateway);
        assert_eq!(
            second.start().expect("start"),
            LoadOutcome::Restored { records: 1 }
        );
        assert_eq!(second.engine().count(), 1);
    }

    #[test]
    fn empty_blob_is_no_data() {
        let gateway = Arc::new(MemoryGateway::new());
        gateway.write("mentionrank", "current", &[]).expect("write");

        let lifecycle = lifecycle(gateway);
        assert_eq!(lifecycle.start().expect("start"), LoadOutcome::NoData);
        assert_eq!(lifecycle.engine().count(), 0);
    }

    #[test]
    fn corrupt_blob_is_discarded_and_start_completes() {
        let gateway = Arc::new(MemoryGateway::new());
        gateway
            .write("mentionrank", "current", b"not a ranking blob")
            .expect("write");

        let lifecycle = lifecycle(gateway);
        let outcome = lifecycle.start().expect("start");

        assert!(matches!(outcome, LoadOutcome::Discarded { .. }));
        assert_eq!(lifecycle.state(), LifecycleState::Ready);
        assert_eq!(lifecycle.engine().count(), 0);
    }

    #[test]
    fn gateway_errors_are_not_fatal() {
        let lifecycle = lifecycle(Arc::new(BrokenGateway));

        assert!(matches!(
            lifecycle.start().expect("start"),
            LoadOutcome::Discarded { .. }
        ));
        assert!(matches!(
            lifecycle.shutdown().expect("shutdown"),
            PersistOutcome::Failed { .. }
        ));
        assert_eq!(lifecycle.state(), LifecycleState::Stopped);
    }

    #[test]
    fn invalid_transitions_are_rejected() {
        let lifecycle = lifecycle(Arc::new(MemoryGateway::new()));

        let err = lifecycle.shutdown().expect_err("not started");
        assert!(matches!(
            err,
            RankError::InvalidTransition {
                from: "stopped",
                to: "shutting_down"
            }
        ));

        lifecycle.start().expect("start");
        assert!(lifecycle.start().is_err());
        assert_eq!(lifecycle.state(), LifecycleState::Ready);
    }
}
