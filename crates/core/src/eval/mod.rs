//! Hand evaluation behind a capability trait.
//!
//! The solver never evaluates cards itself; it consumes an [`Evaluator`]
//! that ranks a holding against a board and estimates equity by Monte
//! Carlo rollout. Implementations must interchange without the solver
//! noticing: [`NativeEvaluator`] enumerates five-card hands directly,
//! [`RsPokerEvaluator`] delegates to the `rs_poker` ranker.

mod native;
mod rspoker;

pub use native::NativeEvaluator;
pub use rspoker::RsPokerEvaluator;

use crate::poker::{full_deck, Card};
use crate::sampler::Sampler;

/// Hand class, weakest first. An ace-high straight flush is simply the
/// top straight flush; no separate royal category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HandCategory {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

/// Total strength of a best five-card hand.
///
/// Ordered by category first, then by a category-specific packed score,
/// so two strengths from the *same* evaluator compare correctly. Scores
/// are not comparable across evaluator implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct HandStrength {
    pub category: HandCategory,
    pub score: u32,
}

/// Number of opponents assumed by hand-abstraction equity rollouts.
pub const DEFAULT_OPPONENTS: usize = 2;

/// Capability trait for showdown evaluation and equity estimation.
pub trait Evaluator: Send + Sync {
    /// Rank the best five-card hand from a holding plus board.
    fn strength(&self, hole: [Card; 2], board: &[Card]) -> HandStrength;

    /// Equity of `hole` on `board` against `opponents` random hands,
    /// estimated over `trials` Monte Carlo rollouts. Ties count half.
    fn equity(
        &self,
        hole: [Card; 2],
        board: &[Card],
        opponents: usize,
        trials: u32,
        sampler: &Sampler,
    ) -> f64 {
        if trials == 0 {
            return 0.5;
        }

        let mut stub: Vec<Card> = full_deck()
            .into_iter()
            .filter(|c| !hole.contains(c) && !board.contains(c))
            .collect();

        let board_needed = 5 - board.len();
        let mut wins = 0u32;
        let mut ties = 0u32;

        let mut runout: Vec<Card> = Vec::with_capacity(5);
        for _ in 0..trials {
            sampler.shuffle(&mut stub);
            runout.clear();
            runout.extend_from_slice(board);
            runout.extend_from_slice(&stub[..board_needed]);

            let hero = self.strength(hole, &runout);
            let mut beaten = false;
            let mut tied = false;
            for opponent in 0..opponents {
                let offset = board_needed + opponent * 2;
                let villain =
                    self.strength([stub[offset], stub[offset + 1]], &runout);
                if villain > hero {
                    beaten = true;
                    break;
                }
                if villain == hero {
                    tied = true;
                }
            }
            if !beaten {
                if tied {
                    ties += 1;
                } else {
                    wins += 1;
                }
            }
        }

        (f64::from(wins) + 0.5 * f64::from(ties)) / f64::from(trials)
    }
}
