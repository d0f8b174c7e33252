//! # Symposium
//!
//! Two operating-systems concurrency scenarios on tokio:
//!
//! 1. **Process bursts**: independent timed tasks read from an
//!    `<id> <seconds>` file.
//! 2. **Dining philosophers**: N philosophers around a ring of N forks,
//!    each cycling think → pick up two forks → eat → put both down.
//!
//! ## Deadlock avoidance
//!
//! With every philosopher reaching left first, all N can hold their left
//! fork and wait forever on the right one. [`ForkOrder::Asymmetric`] has
//! odd seats reach right first instead. Each odd seat then competes with its
//! right-hand neighbour for the same first fork, so the circular wait
//! cannot close.
//!
//! ```text
//!        fork-0
//!   P4 (L→R) ───── P0 (L→R)
//!   │                 │
//! fork-4            fork-1
//!   │                 │
//!   P3 (R→L)      P1 (R→L)
//!     \             /
//!    fork-3     fork-2
//!        \       /
//!        P2 (L→R)
//! ```
//!
//! ## Release guarantee
//!
//! A fork is held through a [`ForkGuard`]. Cancelling a philosopher drops
//! its in-flight future, which drops the guards, so a held fork is always
//! put down, whether the shutdown arrives while thinking, while blocked on
//! a fork or while eating.
//!
//! ## Quick Start
//!
//! ```ignore
//! use symposium::{DiningTable, TableConfig};
//!
//! let report = DiningTable::new(TableConfig::default())?.run().await;
//! println!("{report}");
//! ```

#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

pub mod bursts;
pub mod config;
pub mod error;
pub mod providers;
pub mod table;

pub use bursts::{run_process_phase, BurstReport, BurstRunner, ProcessRecord};
pub use config::{BurstConfig, TableConfig};
pub use error::{InputReadError, SymposiumError, SymposiumResult};
pub use providers::{
    Providers, RandomProvider, SeededProviders, SeededRandomProvider, TimeProvider,
    TokioProviders, TokioRandomProvider, TokioTimeProvider,
};
pub use table::{
    seat_ring, DiningReport, DiningTable, EventKind, EventLog, Fork, ForkGuard, ForkId, ForkOrder,
    Invariant, PhilosopherId, TableEvent, TableStatus,
};
