//! Persistence round-trips through the binary wire format.

use nlhe_solver_core::abstraction::AbstractionLevel;
use nlhe_solver_core::cfr::{CfrSolver, RegretTable};
use nlhe_solver_core::config::TrainingConfig;
use nlhe_solver_core::Action;

fn trained_solver(seed: u64, iterations: u64) -> CfrSolver {
    let config = TrainingConfig {
        name: "persist".to_string(),
        iterations,
        monte_carlo: true,
        seed: Some(seed),
        hand_abstraction: AbstractionLevel::None,
        bet_abstraction: AbstractionLevel::Minimal,
        equity_samples: 100,
        prune_interval: 0,
        prune_threshold: 0.01,
        progress_interval: 10,
        output_dir: "strategies".to_string(),
    };
    let solver = CfrSolver::from_config(&config);
    solver.train(iterations, true);
    solver
}

#[test]
fn strategy_survives_save_and_load_into_fresh_solver() {
    // Scenario S6: averages agree key-for-key after a round trip.
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("persist");

    let trained = trained_solver(21, 10);
    assert!(!trained.strategy_table().is_empty());
    trained.save_strategy(&base).unwrap();

    let fresh = trained_solver(22, 0);
    assert!(fresh.strategy_table().is_empty());
    fresh.load_strategy(&base).unwrap();

    let mut keys = trained.strategy_table().keys();
    keys.sort();
    let mut loaded_keys = fresh.strategy_table().keys();
    loaded_keys.sort();
    assert_eq!(keys, loaded_keys);

    for key in &keys {
        let original = trained.average_strategy(key);
        let restored = fresh.average_strategy(key);
        assert_eq!(original.len(), restored.len(), "action set changed for {key}");
        for (action, probability) in original {
            assert!(
                (restored[&action] - probability).abs() < 1e-12,
                "{key} {action} drifted on reload"
            );
        }
    }
}

#[test]
fn both_strategy_files_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("pair");

    let trained = trained_solver(23, 5);
    trained.save_strategy(&base).unwrap();

    assert!(dir.path().join("pair.current").exists());
    assert!(dir.path().join("pair.sum").exists());
}

#[test]
fn regret_table_round_trips_cell_wise() {
    // Property 8 for the regret table, which shares the wire format.
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("regrets.bin");

    let trained = trained_solver(24, 8);
    let table = trained.regret_table();
    assert!(!table.is_empty());
    table.save(&path).unwrap();

    let restored = RegretTable::new();
    restored.load(&path).unwrap();
    assert_eq!(restored.len(), table.len());
    for key in table.keys() {
        let original = table.regrets_for(&key);
        let loaded = restored.regrets_for(&key);
        assert_eq!(original.len(), loaded.len());
        for (action, value) in original {
            assert!((loaded[&action] - value).abs() < 1e-12);
        }
    }
}

#[test]
fn corrupt_file_reports_corrupt_not_panic() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.bin");
    // Claims one info set, then a key length far past end-of-file.
    std::fs::write(&path, [1, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0x7F]).unwrap();

    let table = RegretTable::new();
    assert!(table.load(&path).is_err());
}

#[test]
fn failed_save_leaves_training_state_intact() {
    let trained = trained_solver(25, 5);
    let before = trained.strategy_table().len();

    let result = trained.save_strategy("/no/such/directory/strategy");
    assert!(result.is_err());
    assert_eq!(trained.strategy_table().len(), before);

    seed_check(&trained);
}

fn seed_check(solver: &CfrSolver) {
    // The tables remain usable after the failed I/O.
    solver
        .regret_table()
        .add_regret("BTN|PREFLOP|0|", Action::Fold, 1.0);
    assert!(solver.regret_table().get_regret("BTN|PREFLOP|0|", Action::Fold) >= 1.0);
}
