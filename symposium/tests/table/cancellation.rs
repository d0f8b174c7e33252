//! Shutdown while philosophers think, wait and eat.

use std::time::Duration;

use symposium::{
    DiningTable, EventKind, EventLog, PhilosopherId, SeededProviders, TableConfig, TableStatus,
};
use tokio_util::sync::CancellationToken;

use super::STUCK_AFTER;

fn slow_meals() -> TableConfig {
    TableConfig {
        think_time: Duration::ZERO..Duration::from_millis(200),
        eat_time: Duration::from_secs(1)..Duration::from_secs(2),
        ..TableConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_cancel_mid_run_frees_every_fork() {
    let token = CancellationToken::new();
    let table = DiningTable::new(slow_meals())
        .expect("valid config")
        .shutdown(token.clone());
    let forks = table.forks().to_vec();

    tokio::spawn({
        let token = token.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(1500)).await;
            token.cancel();
        }
    });

    let report = tokio::time::timeout(STUCK_AFTER, table.run_with(SeededProviders::new(5)))
        .await
        .expect("table ignored shutdown");

    assert_eq!(report.status, TableStatus::Interrupted);
    assert!(report.violations.is_empty(), "{report}");
    assert!(report.failures.is_empty(), "{report}");
    assert!(!report.is_success());
    assert_eq!(report.outcomes.len(), 5);
    assert!(report.outcomes.iter().all(|o| o.interrupted));
    assert!(report.outcomes.iter().all(|o| o.cycles_completed < 3));

    for fork in &forks {
        assert!(!fork.is_held(), "{} still held", fork.id());
        let guard = fork.try_acquire(PhilosopherId(0));
        assert!(guard.is_some(), "{} cannot be picked up", fork.id());
    }
}

#[tokio::test(start_paused = true)]
async fn test_interrupted_eater_puts_forks_down_first() {
    let token = CancellationToken::new();
    let journal = EventLog::new();
    let config = TableConfig {
        eat_time: Duration::from_secs(2)..Duration::from_secs(3),
        ..slow_meals()
    };
    let table = DiningTable::new(config)
        .expect("valid config")
        .journal(journal.clone())
        .shutdown(token.clone());

    tokio::spawn({
        let token = token.clone();
        async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            token.cancel();
        }
    });
    let report = table.run_with(SeededProviders::new(2)).await;
    assert_eq!(report.status, TableStatus::Interrupted);

    // The first meal starts within 200ms and lasts at least 2s.
    let mut saw_interrupted_eater = false;
    for seat in 0..5 {
        let kinds: Vec<EventKind> = journal
            .for_philosopher(PhilosopherId(seat))
            .into_iter()
            .map(|e| e.kind)
            .collect();
        let Some(EventKind::Interrupted { .. }) = kinds.last() else {
            panic!("seat {seat} did not end interrupted: {kinds:?}");
        };
        let Some(eating) = kinds
            .iter()
            .rposition(|k| matches!(k, EventKind::Eating { .. }))
        else {
            continue;
        };
        let after = &kinds[eating + 1..];
        if after.iter().any(|k| matches!(k, EventKind::Released { .. })) {
            continue;
        }
        saw_interrupted_eater = true;
        let put_downs = after
            .iter()
            .filter(|k| matches!(k, EventKind::PutDown { .. }))
            .count();
        assert_eq!(put_downs, 2, "seat {seat}: {kinds:?}");
    }
    assert!(saw_interrupted_eater);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_before_start() {
    let token = CancellationToken::new();
    token.cancel();

    let report = DiningTable::new(TableConfig::default())
        .expect("valid config")
        .shutdown(token)
        .run_with(SeededProviders::new(0))
        .await;

    assert_eq!(report.status, TableStatus::Interrupted);
    assert!(report.violations.is_empty(), "{report}");
    assert_eq!(report.meals_served(), 0);
    assert!(report
        .outcomes
        .iter()
        .all(|o| o.interrupted && o.cycles_completed == 0));
}

#[tokio::test(start_paused = true)]
async fn test_deadline_leaves_caller_token_alone() {
    let token = CancellationToken::new();
    let report = DiningTable::new(slow_meals().with_deadline(Duration::from_millis(500)))
        .expect("valid config")
        .shutdown(token.clone())
        .run_with(SeededProviders::new(4))
        .await;

    assert_eq!(report.status, TableStatus::DeadlineExceeded);
    assert!(!token.is_cancelled());
}
