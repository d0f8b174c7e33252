//! Provider bundle for time and randomness.
//!
//! Code that pauses or draws random durations takes a single `P: Providers`
//! type parameter instead of one per concern.
//!
//! - [`TokioProviders`]: tokio timer and the thread RNG
//! - [`SeededProviders`]: tokio timer and a seeded ChaCha8 RNG

mod random;
mod time;

pub use random::{RandomProvider, SeededRandomProvider, TokioRandomProvider};
pub use time::{TimeProvider, TokioTimeProvider};

/// Bundle of the provider types for one runtime environment.
pub trait Providers: Clone + Send + Sync + 'static {
    /// Time provider type.
    type Time: TimeProvider;

    /// Random provider type.
    type Random: RandomProvider;

    /// Get the time provider instance.
    fn time(&self) -> &Self::Time;

    /// Get the random provider instance.
    fn random(&self) -> &Self::Random;

    /// Same time source, independent random stream.
    ///
    /// Each philosopher gets its own stream so draws do not depend on
    /// scheduling order.
    fn for_stream(&self, stream: u64) -> Self;
}

/// Production providers.
#[derive(Debug, Clone, Default)]
pub struct TokioProviders {
    time: TokioTimeProvider,
    random: TokioRandomProvider,
}

impl TokioProviders {
    /// Create a new production providers bundle.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Providers for TokioProviders {
    type Time = TokioTimeProvider;
    type Random = TokioRandomProvider;

    fn time(&self) -> &Self::Time {
        &self.time
    }

    fn random(&self) -> &Self::Random {
        &self.random
    }

    fn for_stream(&self, stream: u64) -> Self {
        Self {
            time: self.time.clone(),
            random: self.random.stream(stream),
        }
    }
}

/// Providers with a reproducible random source.
#[derive(Debug, Clone)]
pub struct SeededProviders {
    time: TokioTimeProvider,
    random: SeededRandomProvider,
}

impl SeededProviders {
    /// Create a bundle seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            time: TokioTimeProvider::new(),
            random: SeededRandomProvider::new(seed),
        }
    }
}

impl Providers for SeededProviders {
    type Time = TokioTimeProvider;
    type Random = SeededRandomProvider;

    fn time(&self) -> &Self::Time {
        &self.time
    }

    fn random(&self) -> &Self::Random {
        &self.random
    }

    fn for_stream(&self, stream: u64) -> Self {
        Self {
            time: self.time.clone(),
            random: self.random.stream(stream),
        }
    }
}
