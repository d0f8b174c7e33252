//! The naive left-first order deadlocks; the asymmetric order does not.

use std::time::Duration;

use symposium::{DiningTable, ForkOrder, SeededProviders, TableConfig, TableStatus};

use super::{assert_table_success, run_seeded, STUCK_AFTER};

/// Everyone is hungry at once and lingers between the two pickups.
fn everyone_hungry(order: ForkOrder) -> TableConfig {
    TableConfig {
        think_time: Duration::ZERO..Duration::ZERO,
        eat_time: Duration::from_millis(10)..Duration::from_millis(50),
        ..TableConfig::default()
    }
    .with_fork_order(order)
    .with_pickup_pause(Duration::from_millis(10))
}

#[tokio::test(start_paused = true)]
async fn test_left_first_deadlocks() {
    let table = DiningTable::new(everyone_hungry(ForkOrder::LeftFirst)).expect("valid config");
    let forks = table.forks().to_vec();

    let result = tokio::time::timeout(STUCK_AFTER, table.run_with(SeededProviders::new(1))).await;
    assert!(result.is_err(), "left-first table should never finish");

    // Every philosopher is stuck holding its left fork.
    for (seat, fork) in forks.iter().enumerate() {
        assert_eq!(fork.holder().map(|p| p.0), Some(seat));
    }
}

#[tokio::test(start_paused = true)]
async fn test_deadline_breaks_deadlock() {
    let config = everyone_hungry(ForkOrder::LeftFirst).with_deadline(Duration::from_secs(1));
    let table = DiningTable::new(config).expect("valid config");
    let forks = table.forks().to_vec();

    let report = tokio::time::timeout(STUCK_AFTER, table.run_with(SeededProviders::new(1)))
        .await
        .expect("deadline did not fire");

    assert_eq!(report.status, TableStatus::DeadlineExceeded);
    assert!(report.outcomes.iter().all(|o| o.interrupted));
    assert_eq!(report.meals_served(), 0);
    assert!(report.violations.is_empty(), "{report}");
    assert!(forks.iter().all(|f| !f.is_held()));
}

#[tokio::test(start_paused = true)]
async fn test_asymmetric_survives_same_pressure() {
    for seats in [2, 3, 5, 8] {
        for seed in 0..5 {
            let config = everyone_hungry(ForkOrder::Asymmetric).with_seats(seats);
            let report = run_seeded(config, seed).await;
            assert_table_success(&report);
            assert_eq!(report.meals_served(), seats * 3);
        }
    }
}
