//! Process-burst simulation.
//!
//! Reads `<id> <seconds>` records and runs each as an independent timed
//! task. There is no shared state between tasks; the only failure mode is
//! bad input, which aborts the phase before anything starts.

pub mod records;
pub mod runner;

pub use records::{load_records, parse_records, ProcessRecord};
pub use runner::{BurstOutcome, BurstReport, BurstResult, BurstRunner};

use tokio_util::sync::CancellationToken;

use crate::config::BurstConfig;
use crate::error::InputReadError;

/// Load the configured input and run every burst.
///
/// A read error is logged and returned; no task has been started by then.
pub async fn run_process_phase(
    config: &BurstConfig,
    shutdown: &CancellationToken,
) -> Result<BurstReport, InputReadError> {
    tracing::info!(input = %config.input.display(), "=== PROCESS SIMULATION START ===");

    let records = load_records(&config.input).inspect_err(|err| {
        tracing::error!(error = %err, "error reading process records");
    })?;

    let report = BurstRunner::new(config.burst_unit)
        .register_all(records)
        .run(shutdown)
        .await;

    tracing::info!(
        finished = report.finished,
        interrupted = report.interrupted,
        "=== PROCESS SIMULATION END ==="
    );
    Ok(report)
}
