//! Invariants checked over the event journal after a table run.
//!
//! Each invariant replays the journal and reports the first violation it
//! finds. The coordinator collects violations into the report instead of
//! panicking, so one run can surface several.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use super::events::{EventKind, TableEvent};
use super::fork::{ForkId, PhilosopherId};

/// A named violation found by an [`Invariant`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvariantViolation {
    /// Name of the invariant that failed.
    pub invariant: String,
    /// What was observed.
    pub detail: String,
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.invariant, self.detail)
    }
}

/// A named property of a table run.
pub trait Invariant: Send + Sync {
    /// The human-readable name of this invariant.
    fn name(&self) -> &str;

    /// Check the property against the full journal.
    ///
    /// Returns a description of the first violation found.
    fn check(&self, events: &[TableEvent]) -> Result<(), String>;

    /// Run [`Invariant::check`] and attach this invariant's name.
    fn verify(&self, events: &[TableEvent]) -> Result<(), InvariantViolation> {
        self.check(events).map_err(|detail| InvariantViolation {
            invariant: self.name().to_string(),
            detail,
        })
    }
}

impl<I: Invariant + ?Sized> Invariant for Box<I> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn check(&self, events: &[TableEvent]) -> Result<(), String> {
        (**self).check(events)
    }
}

/// Create a boxed invariant from a name and closure.
///
/// ```
/// use symposium::table::{invariant_fn, EventKind};
///
/// let inv = invariant_fn("someone_ate", |events| {
///     if events.iter().any(|e| matches!(e.kind, EventKind::Eating { .. })) {
///         Ok(())
///     } else {
///         Err("nobody ate".to_string())
///     }
/// });
/// assert_eq!(inv.name(), "someone_ate");
/// ```
pub fn invariant_fn<F>(name: &str, check: F) -> Box<dyn Invariant>
where
    F: Fn(&[TableEvent]) -> Result<(), String> + Send + Sync + 'static,
{
    Box::new(FnInvariant {
        name: name.to_string(),
        check,
    })
}

struct FnInvariant<F> {
    name: String,
    check: F,
}

impl<F> Invariant for FnInvariant<F>
where
    F: Fn(&[TableEvent]) -> Result<(), String> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self, events: &[TableEvent]) -> Result<(), String> {
        (self.check)(events)
    }
}

/// No fork is ever picked up while another philosopher holds it.
pub struct MutualExclusion;

impl Invariant for MutualExclusion {
    fn name(&self) -> &str {
        "mutual_exclusion"
    }

    fn check(&self, events: &[TableEvent]) -> Result<(), String> {
        let mut holders: BTreeMap<ForkId, PhilosopherId> = BTreeMap::new();
        for event in events {
            match event.kind {
                EventKind::PickedUp { fork, .. } => {
                    if let Some(other) = holders.insert(fork, event.philosopher) {
                        return Err(format!(
                            "{} picked up {} at {:?} while {} held it",
                            event.philosopher, fork, event.at, other
                        ));
                    }
                }
                EventKind::PutDown { fork } => match holders.remove(&fork) {
                    Some(holder) if holder == event.philosopher => {}
                    Some(holder) => {
                        return Err(format!(
                            "{} put down {} held by {}",
                            event.philosopher, fork, holder
                        ));
                    }
                    None => {
                        return Err(format!(
                            "{} put down {} which nobody held",
                            event.philosopher, fork
                        ));
                    }
                },
                _ => {}
            }
        }
        Ok(())
    }
}

/// Eating happens with both forks held, and both are put down before the
/// philosopher reports them released.
pub struct EatsHoldingBothForks;

impl Invariant for EatsHoldingBothForks {
    fn name(&self) -> &str {
        "eats_holding_both_forks"
    }

    fn check(&self, events: &[TableEvent]) -> Result<(), String> {
        let mut held: BTreeMap<PhilosopherId, BTreeSet<ForkId>> = BTreeMap::new();
        let mut eating: BTreeSet<PhilosopherId> = BTreeSet::new();
        for event in events {
            let who = event.philosopher;
            let mine = held.entry(who).or_default();
            match event.kind {
                EventKind::PickedUp { fork, .. } => {
                    mine.insert(fork);
                }
                EventKind::PutDown { fork } => {
                    mine.remove(&fork);
                }
                EventKind::Eating { cycle } => {
                    if mine.len() != 2 {
                        return Err(format!(
                            "{} started eating in cycle {} holding {} fork(s)",
                            who,
                            cycle,
                            mine.len()
                        ));
                    }
                    eating.insert(who);
                }
                EventKind::Released { cycle } => {
                    if !eating.remove(&who) {
                        return Err(format!("{} released in cycle {} without eating", who, cycle));
                    }
                    if !mine.is_empty() {
                        return Err(format!(
                            "{} reported release in cycle {} still holding {:?}",
                            who, cycle, mine
                        ));
                    }
                }
                EventKind::Thinking { cycle } | EventKind::Hungry { cycle } => {
                    if eating.contains(&who) {
                        return Err(format!(
                            "{} moved on in cycle {} without releasing",
                            who, cycle
                        ));
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// A philosopher holds no fork when it finishes or is interrupted.
pub struct NoForkHeldAtExit;

impl Invariant for NoForkHeldAtExit {
    fn name(&self) -> &str {
        "no_fork_held_at_exit"
    }

    fn check(&self, events: &[TableEvent]) -> Result<(), String> {
        let mut held: BTreeMap<PhilosopherId, BTreeSet<ForkId>> = BTreeMap::new();
        for event in events {
            let mine = held.entry(event.philosopher).or_default();
            match event.kind {
                EventKind::PickedUp { fork, .. } => {
                    mine.insert(fork);
                }
                EventKind::PutDown { fork } => {
                    mine.remove(&fork);
                }
                EventKind::Finished { .. } | EventKind::Interrupted { .. } => {
                    if !mine.is_empty() {
                        return Err(format!(
                            "{} left the table holding {:?}",
                            event.philosopher, mine
                        ));
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Every seat terminates exactly once, and philosophers that were not
/// interrupted complete exactly `cycles` cycles.
pub struct CycleCompletion {
    seats: usize,
    cycles: usize,
}

impl CycleCompletion {
    /// Expect `seats` philosophers running `cycles` cycles each.
    pub fn new(seats: usize, cycles: usize) -> Self {
        Self { seats, cycles }
    }
}

impl Invariant for CycleCompletion {
    fn name(&self) -> &str {
        "cycle_completion"
    }

    fn check(&self, events: &[TableEvent]) -> Result<(), String> {
        let mut finished_cycles = vec![0usize; self.seats];
        let mut exits = vec![0usize; self.seats];
        let mut interrupted = vec![false; self.seats];

        for event in events {
            let seat = event.philosopher.0;
            if seat >= self.seats {
                return Err(format!("event from unknown seat {}", event.philosopher));
            }
            match event.kind {
                EventKind::CycleFinished { .. } => finished_cycles[seat] += 1,
                EventKind::Finished { cycles } => {
                    exits[seat] += 1;
                    if cycles != self.cycles {
                        return Err(format!(
                            "{} finished after {} cycles, expected {}",
                            event.philosopher, cycles, self.cycles
                        ));
                    }
                }
                EventKind::Interrupted { .. } => {
                    exits[seat] += 1;
                    interrupted[seat] = true;
                }
                _ => {}
            }
        }

        for seat in 0..self.seats {
            if exits[seat] != 1 {
                return Err(format!(
                    "philosopher-{} terminated {} times",
                    seat, exits[seat]
                ));
            }
            if !interrupted[seat] && finished_cycles[seat] != self.cycles {
                return Err(format!(
                    "philosopher-{} completed {} cycles, expected {}",
                    seat, finished_cycles[seat], self.cycles
                ));
            }
        }
        Ok(())
    }
}

/// The invariants every table run is checked against.
pub fn standard_invariants(seats: usize, cycles: usize) -> Vec<Box<dyn Invariant>> {
    vec![
        Box::new(MutualExclusion),
        Box::new(EatsHoldingBothForks),
        Box::new(NoForkHeldAtExit),
        Box::new(CycleCompletion::new(seats, cycles)),
    ]
}
