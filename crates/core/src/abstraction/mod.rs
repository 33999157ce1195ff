//! State-space abstraction: hand buckets and bet sizing.

mod bet;
mod hand;

use std::fmt;

use serde::Deserialize;

pub use bet::BetAbstraction;
pub use hand::HandAbstraction;

/// How aggressively the state space is collapsed. Shared by the hand and
/// bet abstractions; the two may be configured at different levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AbstractionLevel {
    /// Single hand bucket per street / raw bet menu.
    None,
    Minimal,
    #[default]
    Standard,
    Detailed,
}

impl AbstractionLevel {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Minimal => "minimal",
            Self::Standard => "standard",
            Self::Detailed => "detailed",
        }
    }
}

impl fmt::Display for AbstractionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
