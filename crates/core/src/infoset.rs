//! Information-set key construction.
//!
//! A key is `"<position>|<street>|<bucket>|<history>"`. Private cards
//! enter only through the hand bucket, so two states a player cannot
//! tell apart map to the same key regardless of opponents' holdings.

use crate::abstraction::HandAbstraction;
use crate::error::SolverError;
use crate::game::{GameState, Position};

/// Build the info-set key for one seat's view of a state.
///
/// # Errors
///
/// Returns `InvalidState` if the seat has no hole cards, or
/// `InvalidBoard` from the hand abstraction on a malformed board.
pub fn infoset_key(
    state: &GameState,
    position: Position,
    abstraction: &HandAbstraction,
) -> Result<String, SolverError> {
    let hole = state.player(position).hole.ok_or_else(|| {
        SolverError::InvalidState(format!("{position} has no hole cards"))
    })?;
    let bucket = abstraction.bucket(hole, state.board())?;
    Ok(format!(
        "{}|{}|{}|{}",
        position,
        state.street(),
        bucket,
        state.history().encode()
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::abstraction::AbstractionLevel;
    use crate::eval::NativeEvaluator;
    use crate::game::Action;
    use crate::sampler::Sampler;

    fn abstraction() -> HandAbstraction {
        HandAbstraction::new(AbstractionLevel::None, Arc::new(NativeEvaluator::new()))
    }

    fn dealt_state(seed: u64) -> GameState {
        let mut state = GameState::new();
        state.deal_hole_cards(&Sampler::with_seed(seed)).unwrap();
        state
    }

    #[test]
    fn key_has_four_pipe_separated_fields() {
        let state = dealt_state(1);
        let abs = abstraction();
        let key = infoset_key(&state, Position::Btn, &abs).unwrap();
        let parts: Vec<&str> = key.split('|').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "BTN");
        assert_eq!(parts[1], "PREFLOP");
        assert_eq!(parts[2], "0");
        assert_eq!(parts[3], "");
    }

    #[test]
    fn key_tracks_public_history() {
        let mut state = dealt_state(2);
        let abs = abstraction();
        state.apply(Action::Call(100)).unwrap();
        state.apply(Action::Raise(300)).unwrap();
        let key = infoset_key(&state, Position::Bb, &abs).unwrap();
        assert!(key.ends_with("|BTN:c100,SB:r300"));
    }

    #[test]
    fn key_ignores_opponent_hole_cards() {
        // Same public line from two different deals: with a single-bucket
        // abstraction the keys coincide even though every hand differs.
        let abs = abstraction();
        let mut first = dealt_state(3);
        let mut second = dealt_state(4);
        for state in [&mut first, &mut second] {
            state.apply(Action::Call(100)).unwrap();
            state.apply(Action::Call(50)).unwrap();
        }
        let key_a = infoset_key(&first, Position::Bb, &abs).unwrap();
        let key_b = infoset_key(&second, Position::Bb, &abs).unwrap();
        assert_eq!(key_a, key_b);
    }

    #[test]
    fn undealt_state_is_rejected() {
        let state = GameState::new();
        let abs = abstraction();
        assert!(matches!(
            infoset_key(&state, Position::Sb, &abs),
            Err(SolverError::InvalidState(_))
        ));
    }
}
