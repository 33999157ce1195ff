//! Bet abstraction: collapse continuous bet/raise sizes to a small menu.
//!
//! Fold, check, and call pass through untouched. Aggressive actions are
//! rebuilt from multiplier tables: preflop multipliers scale the big
//! blind, postflop multipliers scale the current pot; a negative entry
//! is the all-in sentinel. Candidates are clipped to the stack,
//! deduplicated, and raises must strictly exceed the call amount.

use crate::game::{Action, Chips, Street, BIG_BLIND};

use super::AbstractionLevel;

/// All-in sentinel inside the multiplier tables.
const ALL_IN: f64 = -1.0;

/// Multiplier menus for one abstraction level.
struct Multipliers {
    preflop: &'static [f64],
    postflop: &'static [f64],
}

const MINIMAL: Multipliers = Multipliers {
    preflop: &[2.5, 3.5, ALL_IN],
    postflop: &[0.5, 1.0, ALL_IN],
};

const STANDARD: Multipliers = Multipliers {
    preflop: &[2.0, 2.5, 3.0, 4.0, ALL_IN],
    postflop: &[0.33, 0.5, 0.75, 1.0, 1.5, ALL_IN],
};

const DETAILED: Multipliers = Multipliers {
    preflop: &[2.0, 2.25, 2.5, 2.75, 3.0, 3.5, 4.0, 5.0, ALL_IN],
    postflop: &[0.25, 0.33, 0.5, 0.66, 0.75, 1.0, 1.25, 1.5, 2.0, ALL_IN],
};

#[derive(Debug, Clone, Copy)]
pub struct BetAbstraction {
    level: AbstractionLevel,
}

impl BetAbstraction {
    #[must_use]
    pub const fn new(level: AbstractionLevel) -> Self {
        Self { level }
    }

    #[must_use]
    pub const fn level(&self) -> AbstractionLevel {
        self.level
    }

    /// Replace the aggressive part of a legal-action menu with the
    /// level's abstracted sizes. `None` passes everything through.
    #[must_use]
    pub fn abstract_actions(
        &self,
        legal: &[Action],
        pot: Chips,
        stack: Chips,
        street: Street,
    ) -> Vec<Action> {
        let Some(multipliers) = self.multipliers() else {
            return legal.to_vec();
        };

        let mut actions = Vec::with_capacity(legal.len());
        let mut call_amount = None;
        let mut has_bet = false;
        let mut has_raise = false;
        for &action in legal {
            match action {
                Action::Fold | Action::Check => actions.push(action),
                Action::Call(a) => {
                    call_amount = Some(a);
                    actions.push(action);
                }
                Action::Bet(_) => has_bet = true,
                Action::Raise(_) => has_raise = true,
            }
        }

        if has_bet {
            let sizes = candidate_sizes(multipliers, pot, stack, street);
            actions.extend(sizes.into_iter().map(Action::Bet));
        }
        if has_raise {
            let call = call_amount.unwrap_or(0);
            let sizes = candidate_sizes(multipliers, pot, stack, street);
            actions.extend(sizes.into_iter().filter(|&s| s > call).map(Action::Raise));
        }
        actions
    }

    /// Snap a single raw action onto the abstracted menu by L1 distance
    /// on the amount, within the same variant.
    #[must_use]
    pub fn abstract_single(
        &self,
        action: Action,
        pot: Chips,
        stack: Chips,
        street: Street,
    ) -> Action {
        let Some(multipliers) = self.multipliers() else {
            return action;
        };
        match action {
            Action::Fold | Action::Check | Action::Call(_) => action,
            Action::Bet(amount) => {
                match closest(amount, &candidate_sizes(multipliers, pot, stack, street)) {
                    Some(snapped) => Action::Bet(snapped),
                    None => action,
                }
            }
            Action::Raise(amount) => {
                match closest(amount, &candidate_sizes(multipliers, pot, stack, street)) {
                    Some(snapped) => Action::Raise(snapped),
                    None => action,
                }
            }
        }
    }

    fn multipliers(&self) -> Option<&'static Multipliers> {
        match self.level {
            AbstractionLevel::None => None,
            AbstractionLevel::Minimal => Some(&MINIMAL),
            AbstractionLevel::Standard => Some(&STANDARD),
            AbstractionLevel::Detailed => Some(&DETAILED),
        }
    }
}

/// Concrete chip sizes for a multiplier menu: clipped to the stack,
/// rounded to the cent grid, strictly positive, sorted, deduplicated.
fn candidate_sizes(
    multipliers: &Multipliers,
    pot: Chips,
    stack: Chips,
    street: Street,
) -> Vec<Chips> {
    let (table, reference) = if street == Street::Preflop {
        (multipliers.preflop, BIG_BLIND)
    } else {
        (multipliers.postflop, pot)
    };

    let mut sizes: Vec<Chips> = table
        .iter()
        .map(|&mult| {
            if mult < 0.0 {
                stack
            } else {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let scaled = (f64::from(reference) * mult).round() as Chips;
                scaled.min(stack)
            }
        })
        .filter(|&s| s > 0)
        .collect();
    sizes.sort_unstable();
    sizes.dedup();
    sizes
}

/// Closest size by absolute distance; earlier entries win ties.
fn closest(target: Chips, sizes: &[Chips]) -> Option<Chips> {
    sizes
        .iter()
        .copied()
        .min_by_key(|&s| (i64::from(s) - i64::from(target)).abs())
}
