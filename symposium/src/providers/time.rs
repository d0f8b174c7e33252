//! Time provider abstraction.
//!
//! Philosophers and burst tasks never call `tokio::time` directly; they go
//! through a [`TimeProvider`] so the same code runs against wall-clock time
//! in the binary and against paused tokio time in tests.

use std::time::Duration;

use async_trait::async_trait;

/// Provider trait for time operations.
#[async_trait]
pub trait TimeProvider: Clone + Send + Sync + 'static {
    /// Sleep for the specified duration.
    async fn sleep(&self, duration: Duration);

    /// Time elapsed since the provider was created.
    fn now(&self) -> Duration;
}

/// Time provider backed by tokio's timer.
///
/// Under `tokio::time::pause()` the timer auto-advances, so sleeps cost no
/// wall time while ordering is preserved.
#[derive(Debug, Clone)]
pub struct TokioTimeProvider {
    start: tokio::time::Instant,
}

impl TokioTimeProvider {
    /// Create a new provider anchored at the current instant.
    pub fn new() -> Self {
        Self {
            start: tokio::time::Instant::now(),
        }
    }
}

impl Default for TokioTimeProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TimeProvider for TokioTimeProvider {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn now(&self) -> Duration {
        self.start.elapsed()
    }
}
