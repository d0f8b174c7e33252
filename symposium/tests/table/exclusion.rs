//! Mutual exclusion, observed through the journal and through fork holders.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use symposium::table::invariant_fn;
use symposium::{DiningTable, EventKind, SeededProviders, TableConfig};

use super::assert_table_success;

/// Two neighbours can never eat at the same time: they share a fork.
fn neighbours_never_eat_together(seats: usize) -> Box<dyn symposium::Invariant> {
    invariant_fn("neighbours_never_eat_together", move |events| {
        let mut eating = BTreeSet::new();
        for event in events {
            let seat = event.philosopher.0;
            match event.kind {
                EventKind::Eating { .. } => {
                    let left = (seat + seats - 1) % seats;
                    let right = (seat + 1) % seats;
                    if eating.contains(&left) || eating.contains(&right) {
                        return Err(format!(
                            "seat {seat} ate next to a neighbour at {:?}",
                            event.at
                        ));
                    }
                    eating.insert(seat);
                }
                EventKind::PutDown { .. } => {
                    eating.remove(&seat);
                }
                _ => {}
            }
        }
        Ok(())
    })
}

#[tokio::test(start_paused = true)]
async fn test_neighbours_never_eat_together() {
    for seats in [2, 3, 5, 6] {
        for seed in 0..5 {
            let report = DiningTable::new(TableConfig::default().with_seats(seats))
                .expect("valid config")
                .invariant(neighbours_never_eat_together(seats))
                .run_with(SeededProviders::new(seed))
                .await;
            assert_table_success(&report);
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_custom_violation_is_reported() {
    let report = DiningTable::new(TableConfig::quick())
        .expect("valid config")
        .invariant(invariant_fn("never_holds", |_| {
            Err("deliberately failing".to_string())
        }))
        .run_with(SeededProviders::new(1))
        .await;

    assert!(!report.is_success());
    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].invariant, "never_holds");
}

#[tokio::test(start_paused = true)]
async fn test_forks_only_held_by_adjacent_philosophers() {
    let table = DiningTable::new(TableConfig::default()).expect("valid config");
    let forks = table.forks().to_vec();
    let seats = forks.len();

    let done = Arc::new(AtomicBool::new(false));
    let sampler = tokio::spawn({
        let done = Arc::clone(&done);
        async move {
            let mut samples = 0usize;
            while !done.load(Ordering::SeqCst) {
                for fork in &forks {
                    if let Some(holder) = fork.holder() {
                        let i = fork.id().0;
                        let owners = [i, (i + seats - 1) % seats];
                        assert!(
                            owners.contains(&holder.0),
                            "{} held by non-adjacent {}",
                            fork.id(),
                            holder
                        );
                    }
                }
                samples += 1;
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
            samples
        }
    });

    let report = table.run_with(SeededProviders::new(8)).await;
    done.store(true, Ordering::SeqCst);
    let samples = sampler.await.expect("sampler panicked");

    assert_table_success(&report);
    assert!(samples > 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_contention_on_worker_threads() {
    for seats in 2..=8 {
        for seed in 0..10 {
            let config = TableConfig {
                cycles: 10,
                think_time: Duration::ZERO..Duration::from_micros(200),
                eat_time: Duration::ZERO..Duration::from_micros(200),
                pickup_pause: Duration::from_micros(50),
                ..TableConfig::default().with_seats(seats)
            };
            let table = DiningTable::new(config)
                .expect("valid config")
                .invariant(neighbours_never_eat_together(seats));
            let forks = table.forks().to_vec();

            let report = tokio::time::timeout(
                Duration::from_secs(30),
                table.run_with(SeededProviders::new(seed)),
            )
            .await
            .unwrap_or_else(|_| panic!("table stuck (seats={seats}, seed={seed})"));

            assert_table_success(&report);
            assert_eq!(report.meals_served(), seats * 10);
            assert!(forks.iter().all(|f| !f.is_held()));
        }
    }
}
