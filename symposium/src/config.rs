//! # Run Configuration
//!
//! Both phases take their parameters explicitly; nothing is read from
//! globals.
//!
//! ## Dining table
//!
//! | Parameter | Config Field | Default | Description |
//! |-----------|--------------|---------|-------------|
//! | Seats | `seats` | 5 | Philosophers and forks around the ring (≥ 2) |
//! | Cycles | `cycles` | 3 | Think/eat cycles per philosopher (≥ 1) |
//! | Think time | `think_time` | 0-1000ms | Pause while holding no fork |
//! | Eat time | `eat_time` | 0-1000ms | Pause while holding both forks |
//! | Fork order | `fork_order` | asymmetric | Acquisition policy |
//! | Pickup pause | `pickup_pause` | 0 | Pause between first and second fork |
//! | Deadline | `deadline` | none | Cancel the table after this long |
//! | Seed | `seed` | none | Reproducible pause durations |
//!
//! ## Process bursts
//!
//! | Parameter | Config Field | Default | Description |
//! |-----------|--------------|---------|-------------|
//! | Input | `input` | `processes.txt` | `<id> <seconds>` per line |
//! | Burst unit | `burst_unit` | 1s | Wall time of one burst second |

use std::ops::Range;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{SymposiumError, SymposiumResult};
use crate::table::ForkOrder;

/// Configuration for the dining philosophers phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Number of philosophers, which is also the number of forks.
    pub seats: usize,
    /// Think/eat cycles each philosopher performs.
    pub cycles: usize,
    /// Range the thinking pause is drawn from.
    pub think_time: Range<Duration>,
    /// Range the eating pause is drawn from.
    pub eat_time: Range<Duration>,
    /// Order in which philosophers pick up their forks.
    pub fork_order: ForkOrder,
    /// Pause between picking up the first and the second fork.
    pub pickup_pause: Duration,
    /// Cancel every philosopher if the table has not finished by then.
    pub deadline: Option<Duration>,
    /// Seed for pause durations. `None` uses the thread RNG.
    pub seed: Option<u64>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            seats: 5,
            cycles: 3,
            think_time: Duration::ZERO..Duration::from_millis(1000),
            eat_time: Duration::ZERO..Duration::from_millis(1000),
            fork_order: ForkOrder::Asymmetric,
            pickup_pause: Duration::ZERO,
            deadline: None,
            seed: None,
        }
    }
}

impl TableConfig {
    /// Default table with pauses shortened to at most 10ms.
    pub fn quick() -> Self {
        Self {
            think_time: Duration::ZERO..Duration::from_millis(10),
            eat_time: Duration::ZERO..Duration::from_millis(10),
            ..Self::default()
        }
    }

    /// Set the number of seats.
    pub fn with_seats(mut self, seats: usize) -> Self {
        self.seats = seats;
        self
    }

    /// Set the number of cycles per philosopher.
    pub fn with_cycles(mut self, cycles: usize) -> Self {
        self.cycles = cycles;
        self
    }

    /// Set the fork acquisition order.
    pub fn with_fork_order(mut self, order: ForkOrder) -> Self {
        self.fork_order = order;
        self
    }

    /// Set the pause between the two pickups.
    pub fn with_pickup_pause(mut self, pause: Duration) -> Self {
        self.pickup_pause = pause;
        self
    }

    /// Set a deadline for the whole table.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Seed the pause durations.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Reject configurations the table cannot run.
    ///
    /// A single seat would make one philosopher take the same fork twice,
    /// so the ring needs at least two.
    pub fn validate(&self) -> SymposiumResult<()> {
        if self.seats < 2 {
            return Err(SymposiumError::InvalidConfig(format!(
                "seats must be at least 2, got {}: one seat's left and right are the same fork",
                self.seats
            )));
        }
        if self.cycles == 0 {
            return Err(SymposiumError::InvalidConfig(
                "cycles must be at least 1".to_string(),
            ));
        }
        if self.think_time.start > self.think_time.end {
            return Err(SymposiumError::InvalidConfig(format!(
                "think_time range is inverted: {:?}",
                self.think_time
            )));
        }
        if self.eat_time.start > self.eat_time.end {
            return Err(SymposiumError::InvalidConfig(format!(
                "eat_time range is inverted: {:?}",
                self.eat_time
            )));
        }
        Ok(())
    }
}

/// Configuration for the process-burst phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurstConfig {
    /// Line-oriented input holding `<id> <seconds>` records.
    pub input: PathBuf,
    /// Wall duration of one burst second.
    pub burst_unit: Duration,
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("processes.txt"),
            burst_unit: Duration::from_secs(1),
        }
    }
}
