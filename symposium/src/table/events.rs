//! Transition journal for the dining table.
//!
//! Every philosopher records its transitions into a shared [`EventLog`].
//! Pickups are recorded while the fork is held and put-downs before it is
//! freed, so the journal order is consistent with fork ownership and
//! invariants can replay it.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;

use super::fork::{ForkId, PhilosopherId};

/// Which of a philosopher's two forks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// `fork[i]` for philosopher `i`.
    Left,
    /// `fork[(i + 1) % n]` for philosopher `i`.
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

/// A single philosopher transition. Cycles are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    /// Started thinking.
    Thinking { cycle: usize },
    /// Started waiting for forks.
    Hungry { cycle: usize },
    /// Took one fork.
    PickedUp { fork: ForkId, side: Side },
    /// Holds both forks and started eating.
    Eating { cycle: usize },
    /// Is about to free one fork.
    PutDown { fork: ForkId },
    /// Freed both forks after eating.
    Released { cycle: usize },
    /// Completed a think/eat cycle.
    CycleFinished { cycle: usize },
    /// Completed every cycle and left the table.
    Finished { cycles: usize },
    /// Cancelled during `cycle`; held forks were put down.
    Interrupted { cycle: usize },
}

/// A transition stamped with the time it happened and who made it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableEvent {
    /// Time since the table started.
    pub at: Duration,
    /// Philosopher making the transition.
    pub philosopher: PhilosopherId,
    /// What happened.
    #[serde(flatten)]
    pub kind: EventKind,
}

/// Shared, cloneable journal of table events.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    inner: Arc<Mutex<Vec<TableEvent>>>,
}

impl EventLog {
    /// Create an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn record(&self, event: TableEvent) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    /// Copy of every event recorded so far, in recording order.
    pub fn snapshot(&self) -> Vec<TableEvent> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Copy of the events recorded at or after position `start`.
    pub fn since(&self, start: usize) -> Vec<TableEvent> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.get(start..).map(<[TableEvent]>::to_vec).unwrap_or_default()
    }

    /// Events recorded by one philosopher.
    pub fn for_philosopher(&self, id: PhilosopherId) -> Vec<TableEvent> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| e.philosopher == id)
            .cloned()
            .collect()
    }

    /// Number of events recorded.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
