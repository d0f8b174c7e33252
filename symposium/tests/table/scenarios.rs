//! End-to-end table runs.

use std::time::Duration;

use symposium::{DiningTable, EventKind, PhilosopherId, TableConfig, TableStatus};

use super::{assert_table_success, run_seeded};

#[tokio::test(start_paused = true)]
async fn test_five_philosophers_three_cycles() {
    let report = run_seeded(TableConfig::default(), 42).await;

    assert_table_success(&report);
    assert_eq!(report.status, TableStatus::Completed);
    assert_eq!(report.outcomes.len(), 5);
    assert_eq!(report.finished(), 5);
    assert_eq!(report.meals_served(), 15);
    for (seat, outcome) in report.outcomes.iter().enumerate() {
        assert_eq!(outcome.id, PhilosopherId(seat));
        assert_eq!(outcome.cycles_completed, 3);
    }
}

#[tokio::test(start_paused = true)]
async fn test_two_philosophers_never_deadlock() {
    for seed in 0..25 {
        let report = run_seeded(TableConfig::default().with_seats(2), seed).await;
        assert_table_success(&report);
    }
}

#[tokio::test(start_paused = true)]
async fn test_ring_sizes_under_contention() {
    // No thinking and a pause between pickups keeps everyone competing.
    for seats in 2..=8 {
        for seed in 0..4 {
            let config = TableConfig {
                think_time: Duration::ZERO..Duration::ZERO,
                eat_time: Duration::from_millis(1)..Duration::from_millis(20),
                pickup_pause: Duration::from_millis(5),
                ..TableConfig::default().with_seats(seats)
            };
            let report = run_seeded(config, seed).await;
            assert_table_success(&report);
            assert_eq!(report.meals_served(), seats * 3);
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_cycle_count_is_configurable() {
    let report = run_seeded(TableConfig::quick().with_seats(3).with_cycles(7), 9).await;
    assert_table_success(&report);
    assert!(report.outcomes.iter().all(|o| o.cycles_completed == 7));
}

#[tokio::test(start_paused = true)]
async fn test_journal_order_per_philosopher() {
    let journal = symposium::EventLog::new();
    let table = DiningTable::new(TableConfig::quick())
        .expect("valid config")
        .journal(journal.clone());
    let report = table
        .run_with(symposium::SeededProviders::new(3))
        .await;
    assert_table_success(&report);

    for seat in 0..5 {
        let kinds: Vec<EventKind> = journal
            .for_philosopher(PhilosopherId(seat))
            .into_iter()
            .map(|e| e.kind)
            .collect();

        // thinking, hungry, 2 pickups, eating, 2 put-downs, released, cycle finished
        assert_eq!(kinds.len(), 3 * 9 + 1, "seat {seat}: {kinds:?}");
        for (cycle, chunk) in kinds.chunks(9).take(3).enumerate() {
            let cycle = cycle + 1;
            assert_eq!(chunk[0], EventKind::Thinking { cycle });
            assert_eq!(chunk[1], EventKind::Hungry { cycle });
            assert!(matches!(chunk[2], EventKind::PickedUp { .. }));
            assert!(matches!(chunk[3], EventKind::PickedUp { .. }));
            assert_eq!(chunk[4], EventKind::Eating { cycle });
            assert!(matches!(chunk[5], EventKind::PutDown { .. }));
            assert!(matches!(chunk[6], EventKind::PutDown { .. }));
            assert_eq!(chunk[7], EventKind::Released { cycle });
            assert_eq!(chunk[8], EventKind::CycleFinished { cycle });
        }
        assert_eq!(kinds.last(), Some(&EventKind::Finished { cycles: 3 }));
    }
}

#[tokio::test(start_paused = true)]
async fn test_run_picks_seeded_providers_from_config() {
    let report = DiningTable::new(TableConfig::quick().with_seed(77))
        .expect("valid config")
        .run()
        .await;
    assert_table_success(&report);
    assert_eq!(report.seed, Some(77));
}

#[tokio::test(start_paused = true)]
async fn test_reused_journal_only_checks_current_run() {
    let journal = symposium::EventLog::new();
    for seed in 0..2 {
        let report = DiningTable::new(TableConfig::quick())
            .expect("valid config")
            .journal(journal.clone())
            .run_with(symposium::SeededProviders::new(seed))
            .await;
        assert_table_success(&report);
        assert_eq!(report.events_recorded, 5 * (3 * 9 + 1));
    }
    assert_eq!(journal.len(), 2 * 5 * (3 * 9 + 1));
}
