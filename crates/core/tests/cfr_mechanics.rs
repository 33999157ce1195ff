//! CFR training mechanics: smoke training, regret-matching behaviour,
//! and a full-tree traversal on a river subgame.

use std::sync::Arc;

use nlhe_solver_core::abstraction::{AbstractionLevel, BetAbstraction, HandAbstraction};
use nlhe_solver_core::cfr::CfrSolver;
use nlhe_solver_core::config::TrainingConfig;
use nlhe_solver_core::eval::NativeEvaluator;
use nlhe_solver_core::{infoset_key, Action, GameState, Sampler};

fn smoke_config(seed: u64) -> TrainingConfig {
    TrainingConfig {
        name: "smoke".to_string(),
        iterations: 100,
        monte_carlo: true,
        seed: Some(seed),
        hand_abstraction: AbstractionLevel::None,
        bet_abstraction: AbstractionLevel::Minimal,
        equity_samples: 100,
        prune_interval: 0, // keep counts monotone for the assertions below
        prune_threshold: 0.01,
        progress_interval: 10,
        output_dir: "strategies".to_string(),
    }
}

#[test]
fn smoke_training_grows_and_normalises() {
    let solver = CfrSolver::from_config(&smoke_config(11));

    // (a) Info sets appear from the very first iteration.
    solver.train(1, true);
    let after_first = solver.stats().info_sets;
    assert!(after_first > 0);

    // (b) With pruning disabled the count never shrinks.
    let mut last = after_first;
    for _ in 0..99 {
        solver.train(1, true);
        let count = solver.stats().info_sets;
        assert!(count >= last, "info sets shrank from {last} to {count}");
        last = count;
    }
    assert_eq!(solver.stats().iterations, 100);

    // (c) Every average strategy is a probability distribution.
    for key in solver.strategy_table().keys() {
        let average = solver.average_strategy(&key);
        let total: f64 = average.values().sum();
        assert!((total - 1.0).abs() < 1e-9, "{key} sums to {total}");
        assert!(average.values().all(|&p| (0.0..=1.0).contains(&p)));
    }
}

#[test]
fn pruning_drops_quiet_info_sets() {
    let solver = CfrSolver::from_config(&smoke_config(12));
    solver.train(60, true);
    let before = solver.regret_table().len();
    assert!(before > 0);

    // An unreachable threshold empties the whole table.
    let removed = solver.regret_table().prune(f64::INFINITY);
    assert_eq!(removed, before);
    assert_eq!(solver.regret_table().len(), 0);
}

#[test]
fn seeded_regrets_drive_the_strategy() {
    // Scenario S4: regrets {FOLD: 0, CALL: 3, RAISE: 1} yield
    // probabilities {0, 0.75, 0.25}.
    let solver = CfrSolver::from_config(&smoke_config(13));
    let key = "BTN|PREFLOP|0|";
    let actions = [Action::Fold, Action::Call(100), Action::Raise(250)];

    solver.regret_table().add_regret(key, Action::Call(100), 3.0);
    solver.regret_table().add_regret(key, Action::Raise(250), 1.0);

    let strategy = solver.strategy(key, &actions);
    assert!((strategy[0] - 0.0).abs() < 1e-12);
    assert!((strategy[1] - 0.75).abs() < 1e-12);
    assert!((strategy[2] - 0.25).abs() < 1e-12);
}

#[test]
fn zero_regrets_fall_back_to_uniform() {
    // Scenario S5: an untouched key plays uniformly over its actions.
    let solver = CfrSolver::from_config(&smoke_config(14));
    let actions = [Action::Fold, Action::Call(100), Action::Raise(250)];
    let strategy = solver.strategy("SB|PREFLOP|5|", &actions);
    for p in strategy {
        assert!((p - 1.0 / 3.0).abs() < 1e-12);
    }
}

/// Deal a hand and check it down to the river so a small full-tree
/// subgame remains.
fn river_state(seed: u64) -> GameState {
    let sampler = Sampler::with_seed(seed);
    let mut state = GameState::new();
    state.deal_hole_cards(&sampler).unwrap();
    state.apply(Action::Call(100)).unwrap();
    state.apply(Action::Call(50)).unwrap();
    state.apply(Action::Check).unwrap();
    for _ in 0..2 {
        state.start_next_round().unwrap();
        state.apply(Action::Check).unwrap();
        state.apply(Action::Check).unwrap();
        state.apply(Action::Check).unwrap();
    }
    state.start_next_round().unwrap();
    state
}

#[test]
fn full_tree_traversal_solves_a_river_subgame() {
    let solver = CfrSolver::from_config(&smoke_config(15));
    let state = river_state(77);

    let utility = solver.run_from(&state, false).unwrap();
    assert!(
        utility.iter().sum::<f64>().abs() < 1e-9,
        "expected utilities {utility:?} not zero-sum"
    );

    // The river actor's root info set was visited and regret-matched.
    let key = infoset_key(&state, state.current_actor(), solver.hand_abstraction()).unwrap();
    assert!(solver.strategy_table().has(&key));
    for &regret in solver.regret_table().regrets_for(&key).values() {
        assert!(regret >= 0.0);
    }
}

#[test]
fn full_tree_and_monte_carlo_share_table_shapes() {
    // Both traversal variants write the same root info set for the same
    // state; MC just touches fewer descendants.
    let evaluator = Arc::new(NativeEvaluator::new());
    let hand = Arc::new(HandAbstraction::new(AbstractionLevel::None, evaluator));
    let state = river_state(78);

    let full = CfrSolver::new(
        GameState::new(),
        Arc::clone(&hand),
        BetAbstraction::new(AbstractionLevel::Minimal),
    )
    .with_sampler(Arc::new(Sampler::with_seed(1)));
    let sampled = CfrSolver::new(
        GameState::new(),
        hand,
        BetAbstraction::new(AbstractionLevel::Minimal),
    )
    .with_sampler(Arc::new(Sampler::with_seed(1)));

    full.run_from(&state, false).unwrap();
    sampled.run_from(&state, true).unwrap();

    let full_keys = full.strategy_table().keys();
    for key in sampled.strategy_table().keys() {
        assert!(
            full_keys.contains(&key),
            "MC visited {key} that full traversal never saw"
        );
    }
}
