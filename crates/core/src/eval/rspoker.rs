//! Third-party evaluator backend built on the `rs_poker` ranker.

use crate::poker::{Card, Hand, Rank, Rankable};

use super::{Evaluator, HandCategory, HandStrength};

/// Evaluator that delegates ranking to `rs_poker`'s `Rankable`.
///
/// Interchangeable with [`NativeEvaluator`](super::NativeEvaluator); the
/// packed scores differ but ordering within one backend is consistent,
/// which is all the solver relies on.
#[derive(Debug, Default, Clone, Copy)]
pub struct RsPokerEvaluator;

impl RsPokerEvaluator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for RsPokerEvaluator {
    fn strength(&self, hole: [Card; 2], board: &[Card]) -> HandStrength {
        let mut hand = Hand::default();
        for &card in board {
            hand.insert(card);
        }
        for card in hole {
            hand.insert(card);
        }
        let (category, score) = match hand.rank() {
            Rank::HighCard(s) => (HandCategory::HighCard, s),
            Rank::OnePair(s) => (HandCategory::OnePair, s),
            Rank::TwoPair(s) => (HandCategory::TwoPair, s),
            Rank::ThreeOfAKind(s) => (HandCategory::ThreeOfAKind, s),
            Rank::Straight(s) => (HandCategory::Straight, s),
            Rank::Flush(s) => (HandCategory::Flush, s),
            Rank::FullHouse(s) => (HandCategory::FullHouse, s),
            Rank::FourOfAKind(s) => (HandCategory::FourOfAKind, s),
            Rank::StraightFlush(s) => (HandCategory::StraightFlush, s),
        };
        HandStrength { category, score }
    }
}
