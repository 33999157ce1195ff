//! Card types and deck helpers.
//!
//! Re-exports the `rs_poker` card primitives used throughout the crate and
//! adds the few deck-level operations the rules oracle needs.

pub use rs_poker::core::{Card, Hand, Rank, Rankable, Suit, Value};

use crate::error::SolverError;

/// All four suits in a fixed order.
pub const SUITS: [Suit; 4] = [Suit::Spade, Suit::Heart, Suit::Diamond, Suit::Club];

/// All thirteen values, ascending.
pub const VALUES: [Value; 13] = [
    Value::Two,
    Value::Three,
    Value::Four,
    Value::Five,
    Value::Six,
    Value::Seven,
    Value::Eight,
    Value::Nine,
    Value::Ten,
    Value::Jack,
    Value::Queen,
    Value::King,
    Value::Ace,
];

/// Convert a `Value` to a numeric rank (Two=2, ..., Ace=14).
#[must_use]
pub fn value_rank(v: Value) -> u8 {
    u8::from(v) + 2
}

/// Index of a suit in [`SUITS`].
#[must_use]
pub fn suit_index(s: Suit) -> u8 {
    match s {
        Suit::Spade => 0,
        Suit::Heart => 1,
        Suit::Diamond => 2,
        Suit::Club => 3,
    }
}

/// A fresh, unshuffled 52-card deck.
#[must_use]
pub fn full_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(52);
    for &value in &VALUES {
        for &suit in &SUITS {
            deck.push(Card::new(value, suit));
        }
    }
    deck
}

/// Two-character label for a card, e.g. `"As"` or `"Td"`.
#[must_use]
pub fn card_label(card: Card) -> String {
    let value = match card.value {
        Value::Two => '2',
        Value::Three => '3',
        Value::Four => '4',
        Value::Five => '5',
        Value::Six => '6',
        Value::Seven => '7',
        Value::Eight => '8',
        Value::Nine => '9',
        Value::Ten => 'T',
        Value::Jack => 'J',
        Value::Queen => 'Q',
        Value::King => 'K',
        Value::Ace => 'A',
    };
    let suit = match card.suit {
        Suit::Spade => 's',
        Suit::Heart => 'h',
        Suit::Diamond => 'd',
        Suit::Club => 'c',
    };
    format!("{value}{suit}")
}

/// Parse a two-character card label such as `"Kh"`.
///
/// # Errors
///
/// Returns `InvalidState` if the label is not a value character followed
/// by a suit character.
pub fn parse_card(label: &str) -> Result<Card, SolverError> {
    let mut chars = label.chars();
    let (Some(v), Some(s), None) = (chars.next(), chars.next(), chars.next()) else {
        return Err(SolverError::InvalidState(format!("bad card label: {label}")));
    };
    let value = match v.to_ascii_uppercase() {
        '2' => Value::Two,
        '3' => Value::Three,
        '4' => Value::Four,
        '5' => Value::Five,
        '6' => Value::Six,
        '7' => Value::Seven,
        '8' => Value::Eight,
        '9' => Value::Nine,
        'T' => Value::Ten,
        'J' => Value::Jack,
        'Q' => Value::Queen,
        'K' => Value::King,
        'A' => Value::Ace,
        _ => return Err(SolverError::InvalidState(format!("bad card value: {label}"))),
    };
    let suit = match s.to_ascii_lowercase() {
        's' => Suit::Spade,
        'h' => Suit::Heart,
        'd' => Suit::Diamond,
        'c' => Suit::Club,
        _ => return Err(SolverError::InvalidState(format!("bad card suit: {label}"))),
    };
    Ok(Card::new(value, suit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_deck_has_52_unique_cards() {
        let deck = full_deck();
        assert_eq!(deck.len(), 52);
        for (i, a) in deck.iter().enumerate() {
            for b in &deck[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn value_rank_spans_two_to_ace() {
        assert_eq!(value_rank(Value::Two), 2);
        assert_eq!(value_rank(Value::Ace), 14);
    }

    #[test]
    fn card_labels_round_trip() {
        for &card in &full_deck() {
            let parsed = parse_card(&card_label(card)).unwrap();
            assert_eq!(parsed, card);
        }
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_card("Xx").is_err());
        assert!(parse_card("A").is_err());
        assert!(parse_card("Asd").is_err());
    }
}
