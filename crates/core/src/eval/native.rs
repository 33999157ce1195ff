//! Built-in evaluator: exhaustive best-five-of-seven ranking.

use crate::poker::{value_rank, Card};

use super::{Evaluator, HandCategory, HandStrength};

/// Evaluates hands by enumerating every five-card combination of the
/// holding plus board and keeping the strongest.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeEvaluator;

impl NativeEvaluator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for NativeEvaluator {
    fn strength(&self, hole: [Card; 2], board: &[Card]) -> HandStrength {
        let mut cards: Vec<Card> = Vec::with_capacity(2 + board.len());
        cards.extend_from_slice(&hole);
        cards.extend_from_slice(board);

        if cards.len() < 5 {
            // Incomplete board; rank as a bare high-card holding.
            let mut ranks: Vec<u8> = cards.iter().map(|&c| value_rank(c.value)).collect();
            ranks.sort_unstable_by(|a, b| b.cmp(a));
            return HandStrength {
                category: HandCategory::HighCard,
                score: pack(&ranks),
            };
        }

        let n = cards.len();
        let mut best: Option<HandStrength> = None;
        for a in 0..n - 4 {
            for b in a + 1..n - 3 {
                for c in b + 1..n - 2 {
                    for d in c + 1..n - 1 {
                        for e in d + 1..n {
                            let five = [cards[a], cards[b], cards[c], cards[d], cards[e]];
                            let strength = evaluate_five(&five);
                            if best.map_or(true, |current| strength > current) {
                                best = Some(strength);
                            }
                        }
                    }
                }
            }
        }
        best.unwrap_or(HandStrength {
            category: HandCategory::HighCard,
            score: 0,
        })
    }
}

/// Pack rank digits (high significance first) into a single score.
fn pack(digits: &[u8]) -> u32 {
    digits.iter().fold(0u32, |acc, &d| acc * 15 + u32::from(d))
}

fn evaluate_five(cards: &[Card; 5]) -> HandStrength {
    let ranks: Vec<u8> = cards.iter().map(|&c| value_rank(c.value)).collect();
    let is_flush = cards.iter().all(|c| c.suit == cards[0].suit);
    let straight_high = straight_high(&ranks);

    // (rank, count) sorted by count desc then rank desc.
    let mut counts = [0u8; 15];
    for &r in &ranks {
        counts[r as usize] += 1;
    }
    let mut by_freq: Vec<(u8, u8)> = (2u8..=14)
        .filter(|&r| counts[r as usize] > 0)
        .map(|r| (r, counts[r as usize]))
        .collect();
    by_freq.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(b.0.cmp(&a.0)));

    if let Some(high) = straight_high {
        let category = if is_flush {
            HandCategory::StraightFlush
        } else {
            HandCategory::Straight
        };
        return HandStrength {
            category,
            score: pack(&[high]),
        };
    }

    let kickers: Vec<u8> = by_freq.iter().map(|&(r, _)| r).collect();
    let (category, score) = match (by_freq[0].1, by_freq.get(1).map_or(0, |&(_, c)| c)) {
        (4, _) => (HandCategory::FourOfAKind, pack(&kickers[..2])),
        (3, 2) => (HandCategory::FullHouse, pack(&kickers[..2])),
        _ if is_flush => {
            let mut desc = ranks.clone();
            desc.sort_unstable_by(|a, b| b.cmp(a));
            (HandCategory::Flush, pack(&desc))
        }
        (3, _) => (HandCategory::ThreeOfAKind, pack(&kickers[..3])),
        (2, 2) => (HandCategory::TwoPair, pack(&kickers[..3])),
        (2, _) => (HandCategory::OnePair, pack(&kickers[..4])),
        _ => (HandCategory::HighCard, pack(&kickers)),
    };
    HandStrength { category, score }
}

/// High card of a five-card straight, with the wheel ranked by its five.
fn straight_high(ranks: &[u8]) -> Option<u8> {
    let mut sorted = ranks.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    if sorted.len() != 5 {
        return None;
    }
    if sorted[4] - sorted[0] == 4 {
        return Some(sorted[4]);
    }
    if sorted == [2, 3, 4, 5, 14] {
        return Some(5);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poker::parse_card;

    fn strength(hole: [&str; 2], board: &[&str]) -> HandStrength {
        let hole = [parse_card(hole[0]).unwrap(), parse_card(hole[1]).unwrap()];
        let board: Vec<Card> = board.iter().map(|l| parse_card(l).unwrap()).collect();
        NativeEvaluator::new().strength(hole, &board)
    }

    #[test]
    fn detects_straight_flush() {
        let s = strength(["As", "Ks"], &["Qs", "Js", "Ts", "2h", "3d"]);
        assert_eq!(s.category, HandCategory::StraightFlush);
        assert_eq!(s.score, 14);
    }

    #[test]
    fn detects_wheel_straight_ranked_by_five() {
        let wheel = strength(["Ah", "2d"], &["3c", "4s", "5h", "9d", "Jc"]);
        assert_eq!(wheel.category, HandCategory::Straight);
        assert_eq!(wheel.score, 5);

        let six_high = strength(["6h", "2d"], &["3c", "4s", "5h", "9d", "Jc"]);
        assert_eq!(six_high.category, HandCategory::Straight);
        assert!(six_high > wheel);
    }

    #[test]
    fn detects_quads_with_kicker() {
        let s = strength(["Ah", "Ad"], &["Ac", "As", "Kh", "2d", "3c"]);
        assert_eq!(s.category, HandCategory::FourOfAKind);
        assert_eq!(s.score, pack(&[14, 13]));
    }

    #[test]
    fn detects_full_house_over_flush() {
        let full = strength(["Ah", "Ad"], &["Ac", "Kh", "Kd", "2d", "3c"]);
        assert_eq!(full.category, HandCategory::FullHouse);
        let flush = strength(["Ah", "Qh"], &["9h", "5h", "2h", "Kc", "Kd"]);
        assert_eq!(flush.category, HandCategory::Flush);
        assert!(full > flush);
    }

    #[test]
    fn two_pair_beats_one_pair_kickers_break_ties() {
        let two = strength(["Ah", "Kd"], &["Ac", "Kh", "7d", "2d", "3c"]);
        assert_eq!(two.category, HandCategory::TwoPair);

        let pair_ace_kicker = strength(["Ah", "Qd"], &["Ac", "8h", "7d", "2d", "3c"]);
        let pair_jack_kicker = strength(["Ah", "Jd"], &["Ac", "8h", "7d", "2d", "3c"]);
        assert_eq!(pair_ace_kicker.category, HandCategory::OnePair);
        assert!(pair_ace_kicker > pair_jack_kicker);
        assert!(two > pair_ace_kicker);
    }

    #[test]
    fn best_five_of_seven_is_chosen() {
        // Board plays: broadway straight on the board beats the pocket pair.
        let s = strength(["2h", "2d"], &["Ah", "Kd", "Qs", "Jc", "Th"]);
        assert_eq!(s.category, HandCategory::Straight);
        assert_eq!(s.score, 14);
    }

    #[test]
    fn hole_card_symmetry() {
        let board = ["9c", "5d", "2h", "Kc", "8s"];
        assert_eq!(strength(["Ah", "Td"], &board), strength(["Td", "Ah"], &board));
    }
}
