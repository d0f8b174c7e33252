//! Runs each process record as an independent timed task.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::providers::{TimeProvider, TokioTimeProvider};

use super::records::ProcessRecord;

/// How a single burst task ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BurstOutcome {
    /// Ran for its full burst.
    Finished,
    /// Shutdown arrived first.
    Interrupted,
    /// The task panicked or was aborted.
    Failed(String),
}

/// Result of one burst task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BurstResult {
    /// The record that was run.
    pub record: ProcessRecord,
    /// How it ended.
    pub outcome: BurstOutcome,
}

/// Report generated after running every registered burst.
#[derive(Debug, Clone, Serialize)]
pub struct BurstReport {
    /// Results in registration order.
    pub results: Vec<BurstResult>,
    /// Wall time from first start to last exit.
    pub total_wall_time: Duration,
    /// Number of bursts that ran to completion.
    pub finished: usize,
    /// Number of bursts cut short by shutdown.
    pub interrupted: usize,
    /// Number of bursts whose task failed.
    pub failed: usize,
}

impl BurstReport {
    /// Share of bursts that finished, as a percentage.
    pub fn success_rate(&self) -> f64 {
        let total = self.results.len();
        if total == 0 {
            0.0
        } else {
            (self.finished as f64 / total as f64) * 100.0
        }
    }
}

impl fmt::Display for BurstReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Process Simulation Report ===")?;
        writeln!(f, "Processes: {}", self.results.len())?;
        writeln!(f, "Finished: {}", self.finished)?;
        writeln!(f, "Interrupted: {}", self.interrupted)?;
        writeln!(f, "Failed: {}", self.failed)?;
        writeln!(f, "Success Rate: {:.2}%", self.success_rate())?;
        writeln!(f, "Total Wall Time: {:?}", self.total_wall_time)?;
        writeln!(f)?;

        for result in &self.results {
            let pid = result.record.pid;
            match &result.outcome {
                BurstOutcome::Finished => writeln!(f, "✅ process {}: finished", pid)?,
                BurstOutcome::Interrupted => writeln!(f, "⏹ process {}: interrupted", pid)?,
                BurstOutcome::Failed(reason) => writeln!(f, "❌ process {}: {}", pid, reason)?,
            }
        }

        Ok(())
    }
}

/// Builder that runs registered bursts concurrently.
#[derive(Debug)]
pub struct BurstRunner<T: TimeProvider = TokioTimeProvider> {
    records: Vec<ProcessRecord>,
    burst_unit: Duration,
    time: T,
}

impl BurstRunner<TokioTimeProvider> {
    /// Create a runner where one burst second lasts `burst_unit`.
    pub fn new(burst_unit: Duration) -> Self {
        Self::with_time(burst_unit, TokioTimeProvider::new())
    }
}

impl<T: TimeProvider> BurstRunner<T> {
    /// Create a runner on a specific time provider.
    pub fn with_time(burst_unit: Duration, time: T) -> Self {
        Self {
            records: Vec::new(),
            burst_unit,
            time,
        }
    }

    /// Register one record.
    pub fn register(mut self, record: ProcessRecord) -> Self {
        self.records.push(record);
        self
    }

    /// Register every record in order.
    pub fn register_all(mut self, records: impl IntoIterator<Item = ProcessRecord>) -> Self {
        self.records.extend(records);
        self
    }

    /// Wall duration of `record`'s burst.
    pub fn burst_duration(&self, record: &ProcessRecord) -> Duration {
        let units = u32::try_from(record.burst).unwrap_or(u32::MAX);
        self.burst_unit.saturating_mul(units)
    }

    /// Start every burst at once and wait for all of them.
    pub async fn run(self, shutdown: &CancellationToken) -> BurstReport {
        let started = self.time.now();

        let handles: Vec<_> = self
            .records
            .iter()
            .map(|record| {
                let record = *record;
                let wall = self.burst_duration(&record);
                let time = self.time.clone();
                let shutdown = shutdown.clone();
                let span = tracing::info_span!("process", pid = record.pid);
                let handle = tokio::spawn(run_burst(record, wall, time, shutdown).instrument(span));
                (record, handle)
            })
            .collect();

        let joined = futures::future::join_all(
            handles
                .into_iter()
                .map(|(record, handle)| async move { (record, handle.await) }),
        )
        .await;

        let mut results = Vec::with_capacity(joined.len());
        let (mut finished, mut interrupted, mut failed) = (0, 0, 0);
        for (record, joined) in joined {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(err) => BurstOutcome::Failed(err.to_string()),
            };
            match outcome {
                BurstOutcome::Finished => finished += 1,
                BurstOutcome::Interrupted => interrupted += 1,
                BurstOutcome::Failed(_) => failed += 1,
            }
            results.push(BurstResult { record, outcome });
        }

        BurstReport {
            results,
            total_wall_time: self.time.now().saturating_sub(started),
            finished,
            interrupted,
            failed,
        }
    }
}

async fn run_burst<T: TimeProvider>(
    record: ProcessRecord,
    wall: Duration,
    time: T,
    shutdown: CancellationToken,
) -> BurstOutcome {
    tracing::info!(burst = record.burst, "started with burst time {}s", record.burst);
    tokio::select! {
        biased;
        _ = shutdown.cancelled() => {
            tracing::info!("interrupted");
            BurstOutcome::Interrupted
        }
        _ = time.sleep(wall) => {
            tracing::info!("finished");
            BurstOutcome::Finished
        }
    }
}
