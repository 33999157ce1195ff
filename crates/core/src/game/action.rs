//! Player actions and the round-delimited action history.

use std::fmt;

use super::{chips_to_bb, Chips, Position};
use crate::error::SolverError;

/// A betting action. Amount-bearing variants carry the chips the actor
/// puts into the pot with this action, in centi-big-blinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Fold,
    Check,
    Call(Chips),
    Bet(Chips),
    Raise(Chips),
}

impl Action {
    /// Chips committed by this action (zero for fold and check).
    #[must_use]
    pub const fn amount(self) -> Chips {
        match self {
            Self::Fold | Self::Check => 0,
            Self::Call(a) | Self::Bet(a) | Self::Raise(a) => a,
        }
    }

    /// True for bets and raises.
    #[must_use]
    pub const fn is_aggressive(self) -> bool {
        matches!(self, Self::Bet(_) | Self::Raise(_))
    }

    /// Numeric tag used by the persisted table format.
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Fold => 0,
            Self::Check => 1,
            Self::Call(_) => 2,
            Self::Bet(_) => 3,
            Self::Raise(_) => 4,
        }
    }

    /// Rebuild an action from its persisted tag and amount.
    ///
    /// # Errors
    ///
    /// Returns `Corrupt` for an unknown tag.
    pub fn from_tag(tag: u8, amount: Chips) -> Result<Self, SolverError> {
        match tag {
            0 => Ok(Self::Fold),
            1 => Ok(Self::Check),
            2 => Ok(Self::Call(amount)),
            3 => Ok(Self::Bet(amount)),
            4 => Ok(Self::Raise(amount)),
            t => Err(SolverError::Corrupt(format!("unknown action tag: {t}"))),
        }
    }

    /// Compact token for info-set keys: `f`, `x`, `c150`, `b300`, `r600`.
    #[must_use]
    pub fn token(self) -> String {
        match self {
            Self::Fold => "f".to_string(),
            Self::Check => "x".to_string(),
            Self::Call(a) => format!("c{a}"),
            Self::Bet(a) => format!("b{a}"),
            Self::Raise(a) => format!("r{a}"),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fold => write!(f, "FOLD"),
            Self::Check => write!(f, "CHECK"),
            Self::Call(a) => write!(f, "CALL {:.2}", chips_to_bb(*a)),
            Self::Bet(a) => write!(f, "BET {:.2}", chips_to_bb(*a)),
            Self::Raise(a) => write!(f, "RAISE {:.2}", chips_to_bb(*a)),
        }
    }
}

/// Ordered action history annotated with round boundaries.
#[derive(Debug, Clone, Default)]
pub struct ActionHistory {
    actions: Vec<(Position, Action)>,
    round_starts: Vec<usize>,
}

impl ActionHistory {
    #[must_use]
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
            round_starts: vec![0],
        }
    }

    pub fn push(&mut self, position: Position, action: Action) {
        self.actions.push((position, action));
    }

    /// Mark the boundary of a new betting round.
    pub fn start_new_round(&mut self) {
        self.round_starts.push(self.actions.len());
    }

    pub fn clear(&mut self) {
        self.actions.clear();
        self.round_starts.clear();
        self.round_starts.push(0);
    }

    #[must_use]
    pub fn actions(&self) -> &[(Position, Action)] {
        &self.actions
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Actions of one round, indexed from zero.
    #[must_use]
    pub fn round(&self, index: usize) -> &[(Position, Action)] {
        let Some(&start) = self.round_starts.get(index) else {
            return &[];
        };
        let end = self
            .round_starts
            .get(index + 1)
            .copied()
            .unwrap_or(self.actions.len());
        &self.actions[start..end]
    }

    /// Deterministic encoding for info-set keys: rounds joined by `/`,
    /// tokens `<POS>:<action-token>` joined by `,`.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for (i, &start) in self.round_starts.iter().enumerate() {
            if i > 0 {
                out.push('/');
            }
            let end = self
                .round_starts
                .get(i + 1)
                .copied()
                .unwrap_or(self.actions.len());
            for (j, (position, action)) in self.actions[start..end].iter().enumerate() {
                if j > 0 {
                    out.push(',');
                }
                out.push_str(position.label());
                out.push(':');
                out.push_str(&action.token());
            }
        }
        out
    }
}

impl fmt::Display for ActionHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_is_zero_for_fold_and_check() {
        assert_eq!(Action::Fold.amount(), 0);
        assert_eq!(Action::Check.amount(), 0);
        assert_eq!(Action::Bet(300).amount(), 300);
    }

    #[test]
    fn equality_includes_amount() {
        assert_eq!(Action::Call(100), Action::Call(100));
        assert_ne!(Action::Call(100), Action::Call(150));
        assert_ne!(Action::Bet(100), Action::Raise(100));
    }

    #[test]
    fn tags_round_trip() {
        let actions = [
            Action::Fold,
            Action::Check,
            Action::Call(100),
            Action::Bet(250),
            Action::Raise(600),
        ];
        for action in actions {
            let rebuilt = Action::from_tag(action.tag(), action.amount()).unwrap();
            assert_eq!(rebuilt, action);
        }
        assert!(Action::from_tag(9, 0).is_err());
    }

    #[test]
    fn history_encodes_rounds_with_delimiters() {
        let mut history = ActionHistory::new();
        history.push(Position::Btn, Action::Call(100));
        history.push(Position::Sb, Action::Call(50));
        history.push(Position::Bb, Action::Check);
        history.start_new_round();
        history.push(Position::Sb, Action::Bet(150));

        assert_eq!(history.encode(), "BTN:c100,SB:c50,BB:x/SB:b150");
        assert_eq!(history.round(0).len(), 3);
        assert_eq!(history.round(1).len(), 1);
        assert!(history.round(2).is_empty());
    }

    #[test]
    fn cleared_history_encodes_empty() {
        let mut history = ActionHistory::new();
        history.push(Position::Btn, Action::Fold);
        history.start_new_round();
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.encode(), "");
    }
}
