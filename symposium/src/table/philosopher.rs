//! The philosopher: think, pick up two forks, eat, put both down.
//!
//! ```text
//!   ┌──────────┐    ┌────────┐    ┌────────┐    ┌───────────┐
//!   │ Thinking │ ─> │ Hungry │ ─> │ Eating │ ─> │ Releasing │ ─┐
//!   └──────────┘    └────────┘    └────────┘    └───────────┘  │
//!        ^                                                     │
//!        └──────────────── next cycle ─────────────────────────┤
//!                                                              v
//!                                                        ┌────────────┐
//!                                                        │ Terminated │
//!                                                        └────────────┘
//! ```
//!
//! Every suspension point (both pauses, the optional pickup pause and each
//! blocked fork acquisition) races against the shutdown token. Held forks
//! live in a [`HeldForks`] whose `Drop` puts them down, so returning early
//! on cancellation releases them.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::config::TableConfig;
use crate::providers::{Providers, RandomProvider, TimeProvider};

use super::events::{EventKind, EventLog, Side, TableEvent};
use super::fork::{Fork, ForkGuard, PhilosopherId};

/// Order in which a philosopher picks up its two forks.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum ForkOrder {
    /// Even seats take left then right, odd seats right then left.
    ///
    /// Neighbours never both reach for the fork between them second, which
    /// breaks the circular wait.
    #[default]
    Asymmetric,
    /// Every seat takes left then right. Can deadlock.
    LeftFirst,
}

impl ForkOrder {
    /// The sides `id` reaches for, first to second.
    pub fn sides_for(self, id: PhilosopherId) -> [Side; 2] {
        match self {
            ForkOrder::Asymmetric if !id.is_even() => [Side::Right, Side::Left],
            _ => [Side::Left, Side::Right],
        }
    }
}

/// How a philosopher left the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhilosopherOutcome {
    /// Seat of the philosopher.
    pub id: PhilosopherId,
    /// Cycles fully completed.
    pub cycles_completed: usize,
    /// Whether shutdown cut the run short.
    pub interrupted: bool,
}

/// Shutdown fired at a suspension point.
#[derive(Debug)]
struct Interrupted;

/// A philosopher seated between two forks.
pub struct Philosopher<P: Providers> {
    id: PhilosopherId,
    left: Fork,
    right: Fork,
    config: Arc<TableConfig>,
    providers: P,
    shutdown: CancellationToken,
    journal: EventLog,
}

impl<P: Providers> Philosopher<P> {
    /// Seat a philosopher between `left` and `right`.
    pub fn new(
        id: PhilosopherId,
        left: Fork,
        right: Fork,
        config: Arc<TableConfig>,
        providers: P,
        shutdown: CancellationToken,
        journal: EventLog,
    ) -> Self {
        Self {
            id,
            left,
            right,
            config,
            providers,
            shutdown,
            journal,
        }
    }

    fn fork(&self, side: Side) -> &Fork {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// Run every cycle, or until shutdown.
    pub async fn dine(self) -> PhilosopherOutcome {
        let cycles = self.config.cycles;
        for cycle in 1..=cycles {
            if self.run_cycle(cycle).await.is_err() {
                tracing::info!(cycle, "interrupted");
                self.note(EventKind::Interrupted { cycle });
                return PhilosopherOutcome {
                    id: self.id,
                    cycles_completed: cycle - 1,
                    interrupted: true,
                };
            }
        }

        tracing::info!(cycles, "left the table");
        self.note(EventKind::Finished { cycles });
        PhilosopherOutcome {
            id: self.id,
            cycles_completed: cycles,
            interrupted: false,
        }
    }

    async fn run_cycle(&self, cycle: usize) -> Result<(), Interrupted> {
        tracing::info!(cycle, "thinking");
        self.note(EventKind::Thinking { cycle });
        let pause = self
            .providers
            .random()
            .random_range(self.config.think_time.clone());
        self.pause(pause).await?;

        tracing::info!(cycle, "waiting for forks");
        self.note(EventKind::Hungry { cycle });
        let forks = self.pick_up_forks().await?;

        tracing::info!(cycle, "eating");
        self.note(EventKind::Eating { cycle });
        let pause = self
            .providers
            .random()
            .random_range(self.config.eat_time.clone());
        self.pause(pause).await?;

        forks.put_down();
        tracing::info!(cycle, "released forks");
        self.note(EventKind::Released { cycle });
        tracing::info!(cycle, "finished cycle");
        self.note(EventKind::CycleFinished { cycle });
        Ok(())
    }

    async fn pick_up_forks(&self) -> Result<HeldForks<P::Time>, Interrupted> {
        let mut held = HeldForks {
            who: self.id,
            journal: self.journal.clone(),
            time: self.providers.time().clone(),
            guards: Vec::with_capacity(2),
        };

        let [first, second] = self.config.fork_order.sides_for(self.id);
        let guard = self.interruptible(self.fork(first).acquire(self.id)).await?;
        held.push(first, guard);

        if !self.config.pickup_pause.is_zero() {
            self.pause(self.config.pickup_pause).await?;
        }

        let guard = self.interruptible(self.fork(second).acquire(self.id)).await?;
        held.push(second, guard);
        tracing::info!("picked up both forks");
        Ok(held)
    }

    async fn pause(&self, duration: Duration) -> Result<(), Interrupted> {
        self.interruptible(self.providers.time().sleep(duration))
            .await
    }

    async fn interruptible<F: Future>(&self, fut: F) -> Result<F::Output, Interrupted> {
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Err(Interrupted),
            out = fut => Ok(out),
        }
    }

    fn note(&self, kind: EventKind) {
        self.journal.record(TableEvent {
            at: self.providers.time().now(),
            philosopher: self.id,
            kind,
        });
    }
}

/// Forks currently held by one philosopher.
///
/// Dropping it journals a put-down for each fork and then frees it.
struct HeldForks<T: TimeProvider> {
    who: PhilosopherId,
    journal: EventLog,
    time: T,
    guards: Vec<ForkGuard>,
}

impl<T: TimeProvider> HeldForks<T> {
    fn push(&mut self, side: Side, guard: ForkGuard) {
        tracing::info!(fork = %guard.fork(), %side, "picked up fork");
        self.journal.record(TableEvent {
            at: self.time.now(),
            philosopher: self.who,
            kind: EventKind::PickedUp {
                fork: guard.fork(),
                side,
            },
        });
        self.guards.push(guard);
    }

    fn put_down(mut self) {
        self.release_all();
    }

    fn release_all(&mut self) {
        for guard in self.guards.drain(..) {
            self.journal.record(TableEvent {
                at: self.time.now(),
                philosopher: self.who,
                kind: EventKind::PutDown { fork: guard.fork() },
            });
            drop(guard);
        }
    }
}

impl<T: TimeProvider> Drop for HeldForks<T> {
    fn drop(&mut self) {
        if !self.guards.is_empty() {
            tracing::debug!(held = self.guards.len(), "putting forks down on early exit");
            self.release_all();
        }
    }
}
