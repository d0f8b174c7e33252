//! Random number generation providers.
//!
//! [`TokioRandomProvider`] draws from the thread RNG for normal runs.
//! [`SeededRandomProvider`] is a ChaCha8 generator that can be split into
//! independent streams, one per philosopher, so a seed reproduces every
//! philosopher's pause sequence regardless of task interleaving.

use std::cell::RefCell;
use std::ops::Range;
use std::sync::{Arc, Mutex, PoisonError};

use rand::distr::uniform::SampleUniform;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Provider trait for random number generation.
pub trait RandomProvider: Clone + Send + Sync + 'static {
    /// Generate a value in `range` (exclusive upper bound).
    ///
    /// Empty ranges yield `range.start` instead of panicking.
    fn random_range<T>(&self, range: Range<T>) -> T
    where
        T: SampleUniform + PartialOrd;

    /// Derive an independent provider for the given stream number.
    fn stream(&self, stream: u64) -> Self;
}

thread_local! {
    static RNG: RefCell<rand::rngs::ThreadRng> = RefCell::new(rand::rng());
}

/// Production random provider using the thread-local RNG.
#[derive(Debug, Clone, Default)]
pub struct TokioRandomProvider;

impl TokioRandomProvider {
    /// Create a new production random provider.
    pub fn new() -> Self {
        Self
    }
}

impl RandomProvider for TokioRandomProvider {
    fn random_range<T>(&self, range: Range<T>) -> T
    where
        T: SampleUniform + PartialOrd,
    {
        if range.start >= range.end {
            return range.start;
        }
        RNG.with(|rng| rng.borrow_mut().random_range(range))
    }

    fn stream(&self, _stream: u64) -> Self {
        Self
    }
}

/// Deterministic random provider seeded with a `u64`.
#[derive(Debug, Clone)]
pub struct SeededRandomProvider {
    seed: u64,
    rng: Arc<Mutex<ChaCha8Rng>>,
}

impl SeededRandomProvider {
    /// Create a provider on stream 0 of `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Arc::new(Mutex::new(ChaCha8Rng::seed_from_u64(seed))),
        }
    }
}

impl RandomProvider for SeededRandomProvider {
    fn random_range<T>(&self, range: Range<T>) -> T
    where
        T: SampleUniform + PartialOrd,
    {
        if range.start >= range.end {
            return range.start;
        }
        self.rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .random_range(range)
    }

    fn stream(&self, stream: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        rng.set_stream(stream);
        Self {
            seed: self.seed,
            rng: Arc::new(Mutex::new(rng)),
        }
    }
}
