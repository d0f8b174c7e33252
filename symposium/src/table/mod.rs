//! Dining philosophers.
//!
//! ## Submodules
//!
//! - `fork` - the exclusive resource and its RAII guard
//! - `philosopher` - the think/pick up/eat/put down cycle
//! - `coordinator` - ring layout, spawning and joining
//! - `events` - transition journal
//! - `invariants` - properties checked over the journal
//! - `report` - run outcome

pub mod coordinator;
pub mod events;
pub mod fork;
pub mod invariants;
pub mod philosopher;
pub mod report;

pub use coordinator::{seat_ring, DiningTable, Seat};
pub use events::{EventKind, EventLog, Side, TableEvent};
pub use fork::{Fork, ForkGuard, ForkId, PhilosopherId};
pub use invariants::{
    invariant_fn, standard_invariants, CycleCompletion, EatsHoldingBothForks, Invariant,
    InvariantViolation, MutualExclusion, NoForkHeldAtExit,
};
pub use philosopher::{ForkOrder, Philosopher, PhilosopherOutcome};
pub use report::{DiningReport, PhilosopherFailure, TableStatus};
