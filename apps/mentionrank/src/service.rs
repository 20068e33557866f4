//! # Ranking Service
//!
//! Async driver for the core [`Lifecycle`].
//!
//! The handshake with the host:
//! 1. [`RankingService::start`] spawns the lifecycle task on the caller's
//!    [`TaskTracker`] and returns once the engine is `Ready`.
//! 2. While running, the task recomputes the ranking on a fixed interval.
//! 3. Cancelling the [`CancellationToken`] makes the task persist the store
//!    and reach `Stopped`. The task then finishes, which is what the
//!    tracker's `wait()` observes.

use mentionrank_core::{
    Lifecycle, LifecycleState, LoadOutcome, PersistOutcome, RankError, RankingEngine,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// A started ranking engine.
#[derive(Debug, Clone)]
pub struct RankingService {
    lifecycle: Arc<Lifecycle>,
    load: LoadOutcome,
}

impl RankingService {
    /// Start the lifecycle and wait for readiness.
    ///
    /// `shutdown` is the termination signal and `tracker` the completion
    /// handle. `recompute_every` enables the periodic recomputation loop. A
    /// zero period disables it like `None`.
    pub async fn start(
        lifecycle: Arc<Lifecycle>,
        shutdown: CancellationToken,
        tracker: &TaskTracker,
        recompute_every: Option<Duration>,
    ) -> Result<Self, RankError> {
        let recompute_every = recompute_every.filter(|period| !period.is_zero());
        let (ready_tx, ready_rx) = oneshot::channel();

        let task_lifecycle = Arc::clone(&lifecycle);
        tracker.spawn(async move {
            let lifecycle = task_lifecycle;
            let started = lifecycle.start();
            let failed = started.is_err();
            let _ = ready_tx.send(started);
            if failed {
                return;
            }

            run_until_cancelled(lifecycle.engine(), &shutdown, recompute_every).await;

            match lifecycle.shutdown() {
                Ok(PersistOutcome::Written { bytes }) => {
                    tracing::debug!(bytes, "lifecycle task complete");
                }
                Ok(PersistOutcome::Failed { reason }) => {
                    tracing::warn!(%reason, "lifecycle task complete without persisting");
                }
                Err(e) => tracing::error!(error = %e, "shutdown transition failed"),
            }
        });

        let load = ready_rx.await.map_err(|_| {
            RankError::IoError("lifecycle task ended before readiness".to_string())
        })??;

        Ok(Self { lifecycle, load })
    }

    /// The running engine.
    #[must_use]
    pub fn engine(&self) -> Arc<RankingEngine> {
        Arc::clone(self.lifecycle.engine())
    }

    /// What startup restored.
    #[must_use]
    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.load
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }
}

/// Recompute on every tick until `shutdown` fires. The first tick fires
/// immediately, publishing an ordering for the restored store.
async fn run_until_cancelled(
    engine: &RankingEngine,
    shutdown: &CancellationToken,
    recompute_every: Option<Duration>,
) {
    let Some(period) = recompute_every else {
        shutdown.cancelled().await;
        return;
    };

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                let stats = engine.recompute();
                tracing::debug!(
                    records = stats.records,
                    placeholders_created = stats.placeholders_created,
                    "periodic recompute"
                );
            }
        }
    }
}
