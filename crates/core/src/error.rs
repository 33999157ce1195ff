use thiserror::Error;

use crate::game::Action;

/// Errors that can occur in the solver.
#[derive(Debug, Error)]
pub enum SolverError {
    /// An action outside the legal set was applied to a state.
    #[error("illegal action {0} for current state")]
    IllegalAction(Action),

    /// Payoffs were requested on a non-terminal state.
    #[error("payoffs requested on a non-terminal state")]
    NotTerminal,

    /// A hand bucket was requested for a board size outside 0/3/4/5.
    #[error("invalid board size: {0} cards")]
    InvalidBoard(usize),

    /// The deck ran out of cards mid-deal; indicates corrupt state.
    #[error("deck exhausted")]
    DeckExhausted,

    /// A state invariant was violated; programming bug.
    #[error("invalid game state: {0}")]
    InvalidState(String),

    /// I/O failure while saving or loading tables.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A table file failed to parse.
    #[error("corrupt table file: {0}")]
    Corrupt(String),
}
