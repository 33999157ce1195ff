//! Counterfactual Regret Minimization: regret matching, the shared
//! tables, and the solver.

mod solver;
mod tables;

pub use solver::{CfrSolver, ProgressCallback, TrainingStats};
pub use tables::{RegretTable, StrategyTable};

use rustc_hash::FxHashMap;

use crate::game::Action;

/// Derive a strategy over `actions` from cumulative regrets.
///
/// Probabilities are proportional to positive regret mass; when no
/// action carries positive regret the strategy is uniform. The result is
/// aligned index-for-index with `actions`.
#[must_use]
pub fn regret_match(regrets: &FxHashMap<Action, f64>, actions: &[Action]) -> Vec<f64> {
    let positive_sum: f64 = actions
        .iter()
        .map(|a| regrets.get(a).copied().unwrap_or(0.0).max(0.0))
        .sum();

    if positive_sum > 0.0 {
        actions
            .iter()
            .map(|a| regrets.get(a).copied().unwrap_or(0.0).max(0.0) / positive_sum)
            .collect()
    } else {
        #[allow(clippy::cast_precision_loss)]
        let uniform = 1.0 / actions.len() as f64;
        vec![uniform; actions.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regrets(entries: &[(Action, f64)]) -> FxHashMap<Action, f64> {
        entries.iter().copied().collect()
    }

    #[test]
    fn positive_regrets_normalised() {
        let actions = [Action::Fold, Action::Call(100), Action::Raise(300)];
        let strategy = regret_match(
            &regrets(&[
                (Action::Fold, 0.0),
                (Action::Call(100), 3.0),
                (Action::Raise(300), 1.0),
            ]),
            &actions,
        );
        assert!((strategy[0] - 0.0).abs() < 1e-12);
        assert!((strategy[1] - 0.75).abs() < 1e-12);
        assert!((strategy[2] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn all_zero_regrets_fall_back_to_uniform() {
        let actions = [Action::Fold, Action::Call(100), Action::Raise(300)];
        let strategy = regret_match(&regrets(&[]), &actions);
        for p in strategy {
            assert!((p - 1.0 / 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn negative_regrets_are_ignored() {
        let actions = [Action::Check, Action::Bet(150)];
        let strategy = regret_match(
            &regrets(&[(Action::Check, -5.0), (Action::Bet(150), 2.0)]),
            &actions,
        );
        assert!((strategy[0] - 0.0).abs() < 1e-12);
        assert!((strategy[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn unknown_actions_count_as_zero_regret() {
        let actions = [Action::Check, Action::Bet(150)];
        let strategy = regret_match(&regrets(&[(Action::Check, 4.0)]), &actions);
        assert!((strategy[0] - 1.0).abs() < 1e-12);
        assert!((strategy[1] - 0.0).abs() < 1e-12);
    }

    #[test]
    fn strategy_always_sums_to_one() {
        let actions = [Action::Fold, Action::Call(100)];
        for seed in [&[][..], &[(Action::Fold, 2.5)][..]] {
            let strategy = regret_match(&regrets(seed), &actions);
            let sum: f64 = strategy.iter().sum();
            assert!((sum - 1.0).abs() < 1e-12);
        }
    }
}
