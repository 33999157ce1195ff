//! Statistical check of the outcome-sampling regret estimator.
//!
//! The importance weight 1/sigma makes the expected one-shot regret
//! update for each action equal to its counterfactual value, whatever
//! sampling distribution the current regrets induce. Two solvers seeded
//! with very different regret profiles (uniform vs. heavily skewed
//! sampling) must therefore converge to the same per-action average
//! update.

use std::sync::Arc;

use nlhe_solver_core::abstraction::{AbstractionLevel, BetAbstraction, HandAbstraction};
use nlhe_solver_core::cfr::CfrSolver;
use nlhe_solver_core::eval::NativeEvaluator;
use nlhe_solver_core::{infoset_key, Action, GameState, Sampler};

const SAMPLES: u32 = 10_000;
/// Regrets this large keep the CFR+ clamp from biting on any one-shot
/// delta, so stored-minus-seed recovers the raw update.
const SEED_REGRET: f64 = 1_000.0;

fn solver(seed: u64) -> CfrSolver {
    let evaluator = Arc::new(NativeEvaluator::new());
    let hand = Arc::new(HandAbstraction::new(AbstractionLevel::None, evaluator));
    CfrSolver::new(
        GameState::new(),
        hand,
        BetAbstraction::new(AbstractionLevel::Minimal),
    )
    .with_sampler(Arc::new(Sampler::with_seed(seed)))
}

/// A fixed river subgame: seeded deal, limped preflop, checked down.
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

/// Root actions of the river subgame under the minimal bet abstraction.
fn root_actions(state: &GameState, solver: &CfrSolver) -> Vec<Action> {
    let actor = state.current_actor();
    solver.bet_abstraction().abstract_actions(
        &state.legal_actions(),
        state.pot(),
        state.player(actor).stack,
        state.street(),
    )
}

/// Average one-shot regret delta per root action, under regrets seeded
/// by `seed_for`.
fn average_deltas(
    solver: &CfrSolver,
    state: &GameState,
    key: &str,
    actions: &[Action],
    seed_for: impl Fn(usize) -> f64,
) -> Vec<f64> {
    let mut totals = vec![0.0; actions.len()];
    for _ in 0..SAMPLES {
        solver.regret_table().clear();
        solver.strategy_table().clear();
        for (index, &action) in actions.iter().enumerate() {
            solver.regret_table().add_regret(key, action, seed_for(index));
        }

        solver.run_from(state, true).unwrap();

        for (index, &action) in actions.iter().enumerate() {
            totals[index] += solver.regret_table().get_regret(key, action) - seed_for(index);
        }
    }
    totals.iter().map(|t| t / f64::from(SAMPLES)).collect()
}

#[test]
fn one_shot_update_expectation_is_sampling_invariant() {
    let state = river_state(55);
    let solver = solver(900);

    let actor = state.current_actor();
    let key = infoset_key(&state, actor, solver.hand_abstraction()).unwrap();
    let actions = root_actions(&state, &solver);
    assert!(actions.len() >= 2, "river root should offer several actions");

    // Uniform sampling: every action seeded equally.
    let uniform = average_deltas(&solver, &state, &key, &actions, |_| SEED_REGRET);

    // Skewed sampling: the first action drawn three times as often.
    let skewed = average_deltas(&solver, &state, &key, &actions, |index| {
        if index == 0 {
            3.0 * SEED_REGRET
        } else {
            SEED_REGRET
        }
    });

    for (index, action) in actions.iter().enumerate() {
        assert!(
            (uniform[index] - skewed[index]).abs() < 0.8,
            "estimator for {action} drifted with the sampling distribution: \
             uniform {:.3} vs skewed {:.3}",
            uniform[index],
            skewed[index]
        );
    }
}

#[test]
fn zero_probability_actions_receive_no_update() {
    // Seed one action with all the regret mass: the others have sigma=0
    // under regret matching and must keep exactly their seeded value
    // when unsampled (the estimator never divides by zero).
    let state = river_state(56);
    let solver = solver(901);

    let actor = state.current_actor();
    let key = infoset_key(&state, actor, solver.hand_abstraction()).unwrap();
    let actions = root_actions(&state, &solver);

    // 20 runs cannot drain the seed even at the worst case of a full
    // stack lost per run, so actions[0] keeps all the positive mass.
    solver.regret_table().add_regret(&key, actions[0], SEED_REGRET);
    for _ in 0..20 {
        solver.run_from(&state, true).unwrap();
    }

    for &action in &actions[1..] {
        let regret = solver.regret_table().get_regret(&key, action);
        assert!(
            regret.abs() < f64::EPSILON,
            "unsampled {action} accumulated regret {regret}"
        );
    }
}
