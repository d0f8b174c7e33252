//! Forks: the exclusive resources shared by neighbouring philosophers.
//!
//! A fork is released by dropping the [`ForkGuard`] returned from
//! [`Fork::acquire`]. Dropping happens on every exit path, including when the
//! future holding the guard is cancelled, so a held fork cannot leak.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Position of a fork on the ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ForkId(pub usize);

impl fmt::Display for ForkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fork-{}", self.0)
    }
}

/// Seat of a philosopher on the ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PhilosopherId(pub usize);

impl PhilosopherId {
    /// Even seats take their left fork first under the asymmetric order.
    pub fn is_even(self) -> bool {
        self.0 % 2 == 0
    }
}

impl fmt::Display for PhilosopherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "philosopher-{}", self.0)
    }
}

const NO_HOLDER: usize = usize::MAX;

/// A binary mutual-exclusion primitive.
///
/// Cloning a `Fork` yields another handle to the same fork.
#[derive(Debug, Clone)]
pub struct Fork {
    id: ForkId,
    lock: Arc<Mutex<()>>,
    holder: Arc<AtomicUsize>,
}

impl Fork {
    /// Create a free fork.
    pub fn new(id: ForkId) -> Self {
        Self {
            id,
            lock: Arc::new(Mutex::new(())),
            holder: Arc::new(AtomicUsize::new(NO_HOLDER)),
        }
    }

    /// This fork's position on the ring.
    pub fn id(&self) -> ForkId {
        self.id
    }

    /// Wait until the fork is free and take it.
    ///
    /// Waiters are served in FIFO order. The fork stays held until the
    /// returned guard is dropped.
    pub async fn acquire(&self, by: PhilosopherId) -> ForkGuard {
        let permit = Arc::clone(&self.lock).lock_owned().await;
        self.claim(by, permit)
    }

    /// Take the fork if it is free right now.
    pub fn try_acquire(&self, by: PhilosopherId) -> Option<ForkGuard> {
        let permit = Arc::clone(&self.lock).try_lock_owned().ok()?;
        Some(self.claim(by, permit))
    }

    /// Who holds the fork, if anyone.
    ///
    /// Observation only; philosophers never consult this.
    pub fn holder(&self) -> Option<PhilosopherId> {
        match self.holder.load(Ordering::SeqCst) {
            NO_HOLDER => None,
            id => Some(PhilosopherId(id)),
        }
    }

    /// Whether the fork is currently held.
    pub fn is_held(&self) -> bool {
        self.holder().is_some()
    }

    fn claim(&self, by: PhilosopherId, permit: OwnedMutexGuard<()>) -> ForkGuard {
        let previous = self.holder.swap(by.0, Ordering::SeqCst);
        assert!(
            previous == NO_HOLDER,
            "{} taken by {} while still held by philosopher-{}",
            self.id,
            by,
            previous
        );
        ForkGuard {
            fork: self.id,
            by,
            holder: Arc::clone(&self.holder),
            _permit: permit,
        }
    }
}

/// Proof that a philosopher holds a fork.
///
/// Dropping the guard clears the holder and then frees the lock.
#[must_use = "the fork is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ForkGuard {
    fork: ForkId,
    by: PhilosopherId,
    holder: Arc<AtomicUsize>,
    _permit: OwnedMutexGuard<()>,
}

impl ForkGuard {
    /// The fork this guard holds.
    pub fn fork(&self) -> ForkId {
        self.fork
    }

    /// The philosopher holding it.
    pub fn holder(&self) -> PhilosopherId {
        self.by
    }
}

impl Drop for ForkGuard {
    fn drop(&mut self) {
        // Fields drop after this body, so the holder is cleared before the
        // lock becomes available to the next waiter.
        self.holder.store(NO_HOLDER, Ordering::SeqCst);
    }
}
