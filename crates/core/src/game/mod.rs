//! Game-level types for the three-handed no-limit hold'em oracle.

mod action;
mod state;

use std::fmt;

pub use action::{Action, ActionHistory};
pub use state::{GameState, PlayerState, RoundFlow};

use crate::error::SolverError;

/// Chip amounts in hundredths of a big blind (1 BB = 100).
///
/// Integer chips keep [`Action`] hashable with exact equality, so actions
/// serve directly as table keys without float-epsilon comparisons.
pub type Chips = u32;

/// Small blind post.
pub const SMALL_BLIND: Chips = 50;
/// Big blind post.
pub const BIG_BLIND: Chips = 100;
/// Starting stack per hand (25 BB).
pub const STARTING_STACK: Chips = 2_500;
/// Fixed three seats: small blind, big blind, button.
pub const NUM_PLAYERS: usize = 3;

/// Convert a chip amount to big blinds.
#[must_use]
pub fn chips_to_bb(chips: Chips) -> f64 {
    f64::from(chips) / 100.0
}

/// Seat in a three-handed game. Rotation across hands is not modelled;
/// the button is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    Sb,
    Bb,
    Btn,
}

/// All seats in table order SB, BB, BTN.
pub const SEATS: [Position; NUM_PLAYERS] = [Position::Sb, Position::Bb, Position::Btn];

impl Position {
    /// Seat index: SB=0, BB=1, BTN=2.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Sb => 0,
            Self::Bb => 1,
            Self::Btn => 2,
        }
    }

    /// Next seat clockwise (postflop betting order SB -> BB -> BTN -> SB).
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Sb => Self::Bb,
            Self::Bb => Self::Btn,
            Self::Btn => Self::Sb,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sb => "SB",
            Self::Bb => "BB",
            Self::Btn => "BTN",
        }
    }

    /// Parse the label produced by [`Position::label`].
    ///
    /// # Errors
    ///
    /// Returns `Corrupt` for anything other than `SB`, `BB`, or `BTN`.
    pub fn parse(s: &str) -> Result<Self, SolverError> {
        match s {
            "SB" => Ok(Self::Sb),
            "BB" => Ok(Self::Bb),
            "BTN" => Ok(Self::Btn),
            _ => Err(SolverError::Corrupt(format!("unknown position: {s}"))),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Betting round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
}

impl Street {
    /// Number of community cards on this street.
    #[must_use]
    pub const fn board_len(self) -> usize {
        match self {
            Self::Preflop => 0,
            Self::Flop => 3,
            Self::Turn => 4,
            Self::River => 5,
        }
    }

    /// The following street, or `None` after the river.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Preflop => Some(Self::Flop),
            Self::Flop => Some(Self::Turn),
            Self::Turn => Some(Self::River),
            Self::River => None,
        }
    }

    /// Infer the street from a board size.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBoard` for sizes outside {0, 3, 4, 5}.
    pub fn from_board_len(len: usize) -> Result<Self, SolverError> {
        match len {
            0 => Ok(Self::Preflop),
            3 => Ok(Self::Flop),
            4 => Ok(Self::Turn),
            5 => Ok(Self::River),
            n => Err(SolverError::InvalidBoard(n)),
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Preflop => "PREFLOP",
            Self::Flop => "FLOP",
            Self::Turn => "TURN",
            Self::River => "RIVER",
        }
    }
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
