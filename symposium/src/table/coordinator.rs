//! Sets the table: N forks, N philosophers in a ring, all dining at once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::config::TableConfig;
use crate::error::SymposiumResult;
use crate::providers::{Providers, SeededProviders, TimeProvider, TokioProviders};

use super::events::EventLog;
use super::fork::{Fork, ForkId, PhilosopherId};
use super::invariants::{standard_invariants, Invariant};
use super::philosopher::Philosopher;
use super::report::{DiningReport, PhilosopherFailure, TableStatus};

/// A philosopher's place on the ring and the forks on either side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Seat {
    /// Who sits here.
    pub philosopher: PhilosopherId,
    /// `fork[i]`.
    pub left: ForkId,
    /// `fork[(i + 1) % n]`.
    pub right: ForkId,
}

/// Ring layout for `seats` philosophers.
pub fn seat_ring(seats: usize) -> Vec<Seat> {
    (0..seats)
        .map(|i| Seat {
            philosopher: PhilosopherId(i),
            left: ForkId(i),
            right: ForkId((i + 1) % seats),
        })
        .collect()
}

/// Coordinator for one dining philosophers run.
///
/// # Example
///
/// ```ignore
/// let report = DiningTable::new(TableConfig::default())?
///     .shutdown(token)
///     .run()
///     .await;
/// assert!(report.is_success());
/// ```
pub struct DiningTable {
    config: TableConfig,
    forks: Vec<Fork>,
    journal: EventLog,
    shutdown: CancellationToken,
    invariants: Vec<Box<dyn Invariant>>,
}

impl DiningTable {
    /// Validate `config` and lay out the forks.
    ///
    /// The standard invariants are registered up front.
    pub fn new(config: TableConfig) -> SymposiumResult<Self> {
        config.validate()?;
        let forks = (0..config.seats).map(|i| Fork::new(ForkId(i))).collect();
        let invariants = standard_invariants(config.seats, config.cycles);
        Ok(Self {
            config,
            forks,
            journal: EventLog::new(),
            shutdown: CancellationToken::new(),
            invariants,
        })
    }

    /// Record events into `journal` instead of a private one.
    ///
    /// Events already in `journal` are kept but not checked; invariants only
    /// see what this run records.
    pub fn journal(mut self, journal: EventLog) -> Self {
        self.journal = journal;
        self
    }

    /// Stop every philosopher when `token` is cancelled.
    pub fn shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Check an additional invariant after the run.
    pub fn invariant(mut self, invariant: impl Invariant + 'static) -> Self {
        self.invariants.push(Box::new(invariant));
        self
    }

    /// Handles to the forks, indexed by [`ForkId`].
    pub fn forks(&self) -> &[Fork] {
        &self.forks
    }

    /// Run with providers chosen from the config: seeded if `seed` is set.
    pub async fn run(self) -> DiningReport {
        match self.config.seed {
            Some(seed) => self.run_with(SeededProviders::new(seed)).await,
            None => self.run_with(TokioProviders::new()).await,
        }
    }

    /// Run every philosopher to termination and check the invariants.
    pub async fn run_with<P: Providers>(self, providers: P) -> DiningReport {
        let DiningTable {
            config,
            forks,
            journal,
            shutdown,
            invariants,
        } = self;
        let config = Arc::new(config);
        let started = providers.time().now();
        let first_event = journal.len();

        tracing::info!(
            seats = config.seats,
            cycles = config.cycles,
            order = ?config.fork_order,
            "=== DINING PHILOSOPHERS START ==="
        );

        // The deadline cancels only this table, never the caller's token.
        let table_token = shutdown.child_token();
        let expired = Arc::new(AtomicBool::new(false));
        let watchdog = config.deadline.map(|limit| {
            let token = table_token.clone();
            let expired = Arc::clone(&expired);
            let time = providers.time().clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = time.sleep(limit) => {
                        tracing::warn!(?limit, "deadline exceeded, cancelling the table");
                        expired.store(true, Ordering::SeqCst);
                        token.cancel();
                    }
                    _ = token.cancelled() => {}
                }
            })
        });

        let mut handles = Vec::with_capacity(config.seats);
        for seat in seat_ring(config.seats) {
            let philosopher = Philosopher::new(
                seat.philosopher,
                forks[seat.left.0].clone(),
                forks[seat.right.0].clone(),
                Arc::clone(&config),
                providers.for_stream(seat.philosopher.0 as u64),
                table_token.clone(),
                journal.clone(),
            );
            let span = tracing::info_span!("philosopher", id = seat.philosopher.0);
            handles.push((
                seat.philosopher,
                tokio::spawn(philosopher.dine().instrument(span)),
            ));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        let mut failures = Vec::new();
        let joined = futures::future::join_all(
            handles
                .into_iter()
                .map(|(id, handle)| async move { (id, handle.await) }),
        )
        .await;
        for (id, result) in joined {
            match result {
                Ok(outcome) => outcomes.push(outcome),
                Err(err) => {
                    tracing::error!(philosopher = id.0, error = %err, "philosopher task failed");
                    failures.push(PhilosopherFailure {
                        philosopher: id,
                        reason: err.to_string(),
                    });
                }
            }
        }

        if let Some(watchdog) = watchdog {
            watchdog.abort();
        }

        let events = journal.since(first_event);
        let violations: Vec<_> = invariants
            .iter()
            .filter_map(|inv| inv.verify(&events).err())
            .collect();
        for violation in &violations {
            tracing::error!(%violation, "invariant violated");
        }

        let any_interrupted = outcomes.iter().any(|o| o.interrupted);
        let status = if any_interrupted && expired.load(Ordering::SeqCst) {
            TableStatus::DeadlineExceeded
        } else if any_interrupted {
            TableStatus::Interrupted
        } else {
            TableStatus::Completed
        };

        let elapsed = providers.time().now().saturating_sub(started);
        tracing::info!(?status, ?elapsed, "=== DINING PHILOSOPHERS END ===");

        DiningReport {
            seats: config.seats,
            cycles: config.cycles,
            fork_order: config.fork_order,
            seed: config.seed,
            status,
            outcomes,
            failures,
            violations,
            elapsed,
            events_recorded: events.len(),
        }
    }
}
