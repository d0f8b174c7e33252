//! Dining table test modules.

mod cancellation;
mod deadlock;
mod exclusion;
mod scenarios;

use std::time::Duration;

use symposium::{DiningReport, DiningTable, SeededProviders, TableConfig};

/// Virtual time after which a table is considered stuck.
pub const STUCK_AFTER: Duration = Duration::from_secs(600);

/// Run `config` with a seeded RNG, failing the test if it never finishes.
pub async fn run_seeded(config: TableConfig, seed: u64) -> DiningReport {
    let table = DiningTable::new(config).expect("valid config");
    tokio::time::timeout(STUCK_AFTER, table.run_with(SeededProviders::new(seed)))
        .await
        .unwrap_or_else(|_| panic!("table did not finish (seed={seed})"))
}

/// Panic with the full report unless the run was clean.
pub fn assert_table_success(report: &DiningReport) {
    assert!(report.is_success(), "table run failed:\n{report}");
}
