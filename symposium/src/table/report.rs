//! Result of a dining philosophers run.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use super::fork::PhilosopherId;
use super::invariants::InvariantViolation;
use super::philosopher::{ForkOrder, PhilosopherOutcome};

/// How the table as a whole ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    /// Every philosopher finished all cycles.
    Completed,
    /// Shutdown was requested before everyone finished.
    Interrupted,
    /// The configured deadline cancelled the table.
    DeadlineExceeded,
}

/// A philosopher task that ended abnormally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhilosopherFailure {
    /// Seat of the failed philosopher.
    pub philosopher: PhilosopherId,
    /// Panic or join error text.
    pub reason: String,
}

/// Report produced by [`DiningTable::run`](super::DiningTable::run).
#[derive(Debug, Clone, Serialize)]
pub struct DiningReport {
    /// Philosophers at the table.
    pub seats: usize,
    /// Cycles each philosopher was asked to complete.
    pub cycles: usize,
    /// Fork acquisition policy used.
    pub fork_order: ForkOrder,
    /// Seed for pause durations, if any.
    pub seed: Option<u64>,
    /// Overall outcome.
    pub status: TableStatus,
    /// One entry per philosopher that exited normally, in seat order.
    pub outcomes: Vec<PhilosopherOutcome>,
    /// Philosophers whose task panicked.
    pub failures: Vec<PhilosopherFailure>,
    /// Invariants that did not hold over the journal.
    pub violations: Vec<InvariantViolation>,
    /// Time from start to the last philosopher leaving.
    pub elapsed: Duration,
    /// Number of journal entries checked.
    pub events_recorded: usize,
}

impl DiningReport {
    /// Completed, with no failures and no violations.
    pub fn is_success(&self) -> bool {
        self.status == TableStatus::Completed
            && self.failures.is_empty()
            && self.violations.is_empty()
    }

    /// Total cycles completed across the table.
    pub fn meals_served(&self) -> usize {
        self.outcomes.iter().map(|o| o.cycles_completed).sum()
    }

    /// Philosophers that completed every cycle.
    pub fn finished(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.interrupted).count()
    }
}

impl fmt::Display for DiningReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Dining Report ===")?;
        writeln!(f, "Seats: {}", self.seats)?;
        writeln!(f, "Cycles per philosopher: {}", self.cycles)?;
        writeln!(f, "Fork order: {:?}", self.fork_order)?;
        if let Some(seed) = self.seed {
            writeln!(f, "Seed: {}", seed)?;
        }
        writeln!(f, "Status: {:?}", self.status)?;
        writeln!(f, "Meals served: {}", self.meals_served())?;
        writeln!(f, "Elapsed: {:?}", self.elapsed)?;
        writeln!(f, "Events checked: {}", self.events_recorded)?;
        writeln!(f)?;

        for outcome in &self.outcomes {
            if outcome.interrupted {
                writeln!(
                    f,
                    "⏹ {}: interrupted after {} cycle(s)",
                    outcome.id, outcome.cycles_completed
                )?;
            } else {
                writeln!(f, "✅ {}: {} cycle(s)", outcome.id, outcome.cycles_completed)?;
            }
        }
        for failure in &self.failures {
            writeln!(f, "❌ {}: {}", failure.philosopher, failure.reason)?;
        }
        for violation in &self.violations {
            writeln!(f, "❌ invariant {}", violation)?;
        }

        Ok(())
    }
}
