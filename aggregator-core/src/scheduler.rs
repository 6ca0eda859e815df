use chrono::Utc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::batch::fetch_all;
use crate::config::ScheduleConfig;
use crate::error::{CycleError, SchedulerError};
use crate::fetcher::Fetcher;
use crate::gate::{PersistOutcome, PersistenceGate};
use crate::notify::Notifier;
use crate::sources::SourceLister;
use crate::store::Store;
use crate::throttle::RecheckThrottle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Running,
}

/// Mutable state carried from one cycle to the next.
#[derive(Debug)]
pub struct SchedulerContext {
    pub throttle: RecheckThrottle,
    pub gate: PersistenceGate,
    state: CycleState,
}

impl SchedulerContext {
    pub fn new(config: &ScheduleConfig) -> Self {
        Self::with_gate(config, PersistenceGate::new())
    }

    pub fn with_gate(config: &ScheduleConfig, gate: PersistenceGate) -> Self {
        Self {
            throttle: RecheckThrottle::new(config.aggregate_interval),
            gate,
            state: CycleState::Idle,
        }
    }

    pub fn state(&self) -> CycleState {
        self.state
    }
}

/// Marks the context `Running` for as long as it lives.
///
/// A cycle needs `&mut` access to its scheduler, so two cycles can never
/// overlap on one scheduler and entering always starts from `Idle`. Dropping
/// the guard, including when a tick future is dropped mid-cycle, is the only
/// way back to `Idle`.
struct RunningGuard<'a> {
    state: &'a mut CycleState,
}

impl<'a> RunningGuard<'a> {
    fn enter(state: &'a mut CycleState) -> Self {
        debug_assert_eq!(*state, CycleState::Idle);
        *state = CycleState::Running;
        Self { state }
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        *self.state = CycleState::Idle;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub listed: usize,
    pub due: usize,
    pub fetched: usize,
    pub failed: usize,
    pub persist: PersistOutcome,
}

pub struct CycleScheduler<L, F, S, N> {
    pub sources: L,
    pub fetcher: F,
    pub store: S,
    pub notifier: N,
    pub config: ScheduleConfig,
    pub context: SchedulerContext,
}

impl<L, F, S, N> CycleScheduler<L, F, S, N>
where
    L: SourceLister,
    F: Fetcher,
    S: Store,
    N: Notifier,
{
    pub fn new(sources: L, fetcher: F, store: S, notifier: N, config: ScheduleConfig) -> Self {
        let context = SchedulerContext::new(&config);
        Self {
            sources,
            fetcher,
            store,
            notifier,
            config,
            context,
        }
    }

    /// Runs one full cycle: list, throttle, fetch, then persist.
    pub async fn tick(&mut self) -> Result<CycleReport, CycleError> {
        self.tick_at(Utc::now().timestamp_millis()).await
    }

    pub async fn tick_at(&mut self, now_ms: i64) -> Result<CycleReport, CycleError> {
        let Self {
            sources,
            fetcher,
            store,
            notifier,
            context,
            ..
        } = self;
        let SchedulerContext {
            throttle,
            gate,
            state,
        } = context;
        let _running = RunningGuard::enter(state);

        let candidates = sources.list_sources().await?;
        let listed = candidates.len();
        let due = throttle.due(candidates, now_ms);
        let due_count = due.len();

        let batch = fetch_all(&*fetcher, due).await;
        let persist = gate
            .persist(&*store, &*notifier, &batch.successes, now_ms)
            .await?;

        let report = CycleReport {
            listed,
            due: due_count,
            fetched: batch.successes.len(),
            failed: batch.failures.len(),
            persist,
        };
        if due_count > 0 {
            info!(
                listed,
                due = due_count,
                fetched = report.fetched,
                failed = report.failed,
                entries = batch.entry_count(),
                outcome = ?report.persist,
                "aggregation cycle complete"
            );
        }
        Ok(report)
    }
}

pub struct SchedulerHandle {
    cancel_tx: broadcast::Sender<()>,
    join: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stops the loop once the current cycle, if any, has finished.
    pub async fn stop(self) -> Result<(), SchedulerError> {
        let _ = self.cancel_tx.send(());
        self.join.await.map_err(SchedulerError::from)
    }
}

/// Runs cycles in the background. The next tick is armed only after the
/// previous cycle has completed, whatever its outcome.
pub fn spawn_scheduler<L, F, S, N>(mut scheduler: CycleScheduler<L, F, S, N>) -> SchedulerHandle
where
    L: SourceLister + 'static,
    F: Fetcher + 'static,
    S: Store + 'static,
    N: Notifier + 'static,
{
    let (cancel_tx, mut cancel_rx) = broadcast::channel(1);
    let join = tokio::spawn(async move {
        let tick_interval = scheduler.config.tick_interval;
        loop {
            if let Err(err) = scheduler.tick().await {
                warn!(error = %err, "aggregation cycle failed");
            }

            tokio::select! {
                _ = cancel_rx.recv() => {
                    info!("scheduler shutdown requested");
                    break;
                }
                _ = tokio::time::sleep(tick_interval) => {}
            }
        }
    });

    SchedulerHandle { cancel_tx, join }
}
