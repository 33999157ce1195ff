//! The game rules oracle: hand setup, betting flow, terminal payoffs.

use std::fmt;
use std::sync::Arc;

use crate::error::SolverError;
use crate::eval::{Evaluator, NativeEvaluator};
use crate::poker::{card_label, full_deck, Card};
use crate::sampler::Sampler;

use super::{
    Action, ActionHistory, Chips, Position, Street, BIG_BLIND, NUM_PLAYERS, SEATS, SMALL_BLIND,
    STARTING_STACK,
};

/// Outcome of applying one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundFlow {
    /// Betting continues; the actor has advanced.
    Continues,
    /// The betting round (or the hand) has closed.
    Closed,
}

/// Per-seat state within a hand.
#[derive(Debug, Clone)]
pub struct PlayerState {
    /// Chips behind.
    pub stack: Chips,
    /// Chips committed this betting round.
    pub current_bet: Chips,
    /// Chips committed over the whole hand, blinds included.
    pub contributed: Chips,
    pub folded: bool,
    pub hole: Option<[Card; 2]>,
}

impl PlayerState {
    fn fresh() -> Self {
        Self {
            stack: STARTING_STACK,
            current_bet: 0,
            contributed: 0,
            folded: false,
            hole: None,
        }
    }
}

/// Full state of one hand of three-handed no-limit hold'em.
///
/// The solver treats this as opaque: it deals, lists legal actions,
/// applies one, and reads payoffs at terminals. Branching is done by
/// cloning; states are never shared across threads.
#[derive(Clone)]
pub struct GameState {
    players: [PlayerState; NUM_PLAYERS],
    board: Vec<Card>,
    deck: Vec<Card>,
    street: Street,
    pot: Chips,
    actor: Position,
    last_aggressor: Option<Position>,
    /// Seats that still owe an action this round. Aggression re-arms the
    /// other active seats; blinds post without clearing these, which is
    /// what gives the big blind its preflop option.
    pending: [bool; NUM_PLAYERS],
    history: ActionHistory,
    evaluator: Arc<dyn Evaluator>,
}

impl GameState {
    /// A fresh hand with blinds posted, using the native evaluator.
    #[must_use]
    pub fn new() -> Self {
        Self::with_evaluator(Arc::new(NativeEvaluator::new()))
    }

    /// A fresh hand with blinds posted and the given showdown evaluator.
    #[must_use]
    pub fn with_evaluator(evaluator: Arc<dyn Evaluator>) -> Self {
        let mut state = Self {
            players: [PlayerState::fresh(), PlayerState::fresh(), PlayerState::fresh()],
            board: Vec::with_capacity(5),
            deck: Vec::new(),
            street: Street::Preflop,
            pot: 0,
            actor: Position::Btn,
            last_aggressor: None,
            pending: [true; NUM_PLAYERS],
            history: ActionHistory::new(),
            evaluator,
        };
        state.reset();
        state
    }

    /// Return to a fresh hand: full stacks, blinds posted, new deck,
    /// button first to act.
    pub fn reset(&mut self) {
        for player in &mut self.players {
            *player = PlayerState::fresh();
        }
        self.board.clear();
        self.deck = full_deck();
        self.street = Street::Preflop;
        self.pot = 0;
        // Three-handed preflop order is BTN -> SB -> BB.
        self.actor = Position::Btn;
        self.last_aggressor = None;
        self.pending = [true; NUM_PLAYERS];
        self.history.clear();
        self.post_blinds();
    }

    fn post_blinds(&mut self) {
        self.commit(Position::Sb, SMALL_BLIND);
        self.commit(Position::Bb, BIG_BLIND);
    }

    /// Move chips from a seat's stack into the pot.
    fn commit(&mut self, position: Position, amount: Chips) {
        let player = &mut self.players[position.index()];
        player.stack -= amount;
        player.current_bet += amount;
        player.contributed += amount;
        self.pot += amount;
    }

    /// Shuffle the deck and deal two hidden cards to each seat.
    ///
    /// # Errors
    ///
    /// Returns `DeckExhausted` if the deck cannot cover the deal.
    pub fn deal_hole_cards(&mut self, sampler: &Sampler) -> Result<(), SolverError> {
        sampler.shuffle(&mut self.deck);
        for index in 0..NUM_PLAYERS {
            let first = self.draw()?;
            let second = self.draw()?;
            self.players[index].hole = Some([first, second]);
        }
        Ok(())
    }

    /// Extend the board to the size mandated by `street`, burning one
    /// card first.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` when the board is already at or past the
    /// target size, `DeckExhausted` when the deck runs dry.
    pub fn deal_board(&mut self, street: Street) -> Result<(), SolverError> {
        let target = street.board_len();
        if self.board.len() >= target {
            return Err(SolverError::InvalidState(format!(
                "board has {} cards, cannot deal to {street}",
                self.board.len()
            )));
        }
        self.draw()?; // burn
        while self.board.len() < target {
            let card = self.draw()?;
            self.board.push(card);
        }
        Ok(())
    }

    fn draw(&mut self) -> Result<Card, SolverError> {
        self.deck.pop().ok_or(SolverError::DeckExhausted)
    }

    #[must_use]
    pub fn current_actor(&self) -> Position {
        self.actor
    }

    #[must_use]
    pub fn street(&self) -> Street {
        self.street
    }

    #[must_use]
    pub fn pot(&self) -> Chips {
        self.pot
    }

    #[must_use]
    pub fn board(&self) -> &[Card] {
        &self.board
    }

    #[must_use]
    pub fn player(&self, position: Position) -> &PlayerState {
        &self.players[position.index()]
    }

    #[must_use]
    pub fn history(&self) -> &ActionHistory {
        &self.history
    }

    #[must_use]
    pub fn last_aggressor(&self) -> Option<Position> {
        self.last_aggressor
    }

    /// Highest current-round bet at the table.
    #[must_use]
    pub fn max_bet(&self) -> Chips {
        self.players.iter().map(|p| p.current_bet).max().unwrap_or(0)
    }

    /// Chips a seat must add to match the highest bet.
    #[must_use]
    pub fn call_amount(&self, position: Position) -> Chips {
        self.max_bet() - self.players[position.index()].current_bet
    }

    fn active_count(&self) -> usize {
        self.players.iter().filter(|p| !p.folded).count()
    }

    /// The betting round is settled once every active seat has acted
    /// since the last aggression and all active bets match.
    fn round_settled(&self) -> bool {
        let max_bet = self.max_bet();
        SEATS.iter().all(|&seat| {
            let player = &self.players[seat.index()];
            player.folded || (!self.pending[seat.index()] && player.current_bet == max_bet)
        })
    }

    fn next_active_after(&self, position: Position) -> Position {
        let mut seat = position.next();
        while self.players[seat.index()].folded {
            seat = seat.next();
        }
        seat
    }

    /// The canonical action menu for the current actor.
    ///
    /// Fold only against an outstanding bet; check only without one; call
    /// at the exact matching amount when it fits the stack; bets at
    /// {half pot, pot, 2x pot, all-in} and raises at {2x call, 3x top
    /// bet, 5x top bet, all-in}, clipped to the stack and deduplicated.
    /// `apply` accepts any structurally valid amount, so a bet
    /// abstraction may substitute its own sizes for the aggressive menu.
    #[must_use]
    pub fn legal_actions(&self) -> Vec<Action> {
        let player = &self.players[self.actor.index()];
        let call = self.call_amount(self.actor);
        let mut actions = Vec::with_capacity(7);

        if call > 0 {
            actions.push(Action::Fold);
        } else {
            actions.push(Action::Check);
        }
        if call > 0 && call <= player.stack {
            actions.push(Action::Call(call));
        }

        if player.stack > 0 {
            if call == 0 {
                let mut sizes = vec![
                    (self.pot / 2).min(player.stack),
                    self.pot.min(player.stack),
                    (self.pot * 2).min(player.stack),
                    player.stack,
                ];
                sizes.retain(|&s| s > 0);
                sizes.sort_unstable();
                sizes.dedup();
                actions.extend(sizes.into_iter().map(Action::Bet));
            } else {
                let top = self.max_bet();
                let mut sizes = vec![
                    (call * 2).min(player.stack),
                    (top * 3).min(player.stack),
                    (top * 5).min(player.stack),
                    player.stack,
                ];
                sizes.retain(|&s| s > call);
                sizes.sort_unstable();
                sizes.dedup();
                actions.extend(sizes.into_iter().map(Action::Raise));
            }
        }

        actions
    }

    /// Whether an action is structurally valid for the current actor.
    ///
    /// Wider than the listing from [`legal_actions`]: any bet amount up
    /// to the stack and any raise strictly above the call amount are
    /// accepted, so abstracted sizes apply cleanly.
    #[must_use]
    pub fn is_legal(&self, action: Action) -> bool {
        let player = &self.players[self.actor.index()];
        let call = self.call_amount(self.actor);
        match action {
            Action::Fold => call > 0,
            Action::Check => call == 0,
            Action::Call(a) => call > 0 && a == call && a <= player.stack,
            Action::Bet(a) => call == 0 && a > 0 && a <= player.stack,
            Action::Raise(a) => call > 0 && a > call && a <= player.stack,
        }
    }

    /// Apply one action for the current actor, record it, and advance.
    ///
    /// Returns whether the betting round continues or has closed. When it
    /// closes on a non-terminal state the caller is expected to invoke
    /// [`start_next_round`](Self::start_next_round).
    ///
    /// # Errors
    ///
    /// Returns `IllegalAction` without mutating anything if the action is
    /// not structurally valid here.
    pub fn apply(&mut self, action: Action) -> Result<RoundFlow, SolverError> {
        if !self.is_legal(action) {
            return Err(SolverError::IllegalAction(action));
        }

        let actor = self.actor;
        match action {
            Action::Fold => self.players[actor.index()].folded = true,
            Action::Check => {}
            Action::Call(amount) => self.commit(actor, amount),
            Action::Bet(amount) | Action::Raise(amount) => {
                self.commit(actor, amount);
                self.last_aggressor = Some(actor);
                for seat in SEATS {
                    self.pending[seat.index()] = !self.players[seat.index()].folded;
                }
            }
        }
        self.pending[actor.index()] = false;
        self.history.push(actor, action);

        if self.active_count() <= 1 || self.round_settled() {
            return Ok(RoundFlow::Closed);
        }
        self.actor = self.next_active_after(actor);
        Ok(RoundFlow::Continues)
    }

    /// Consolidate bets, deal the next street, and hand action to the
    /// first active seat from the small blind.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` when called after the river or on an
    /// unfinished round, `DeckExhausted` if the deck runs dry.
    pub fn start_next_round(&mut self) -> Result<(), SolverError> {
        let Some(street) = self.street.next() else {
            return Err(SolverError::InvalidState(
                "no betting round after the river".to_string(),
            ));
        };
        if self.active_count() <= 1 {
            return Err(SolverError::InvalidState(
                "hand is already decided".to_string(),
            ));
        }
        if !self.round_settled() {
            return Err(SolverError::InvalidState(
                "betting round is still open".to_string(),
            ));
        }
        self.street = street;
        for seat in SEATS {
            self.players[seat.index()].current_bet = 0;
            self.pending[seat.index()] = !self.players[seat.index()].folded;
        }
        self.last_aggressor = None;
        self.deal_board(street)?;
        self.actor = if self.players[Position::Sb.index()].folded {
            self.next_active_after(Position::Sb)
        } else {
            Position::Sb
        };
        self.history.start_new_round();
        Ok(())
    }

    /// A hand ends when at most one seat remains, or when river betting
    /// has settled.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.active_count() <= 1 || (self.street == Street::River && self.round_settled())
    }

    /// Net chip result per seat in big blinds; sums to zero exactly.
    ///
    /// Each seat is debited its full contribution and winners split the
    /// pot evenly.
    ///
    /// # Errors
    ///
    /// Returns `NotTerminal` on a live hand, `InvalidState` if a showdown
    /// seat has no hole cards.
    pub fn payoffs(&self) -> Result<[f64; NUM_PLAYERS], SolverError> {
        if !self.is_terminal() {
            return Err(SolverError::NotTerminal);
        }

        let mut payoffs = [0.0; NUM_PLAYERS];
        for seat in SEATS {
            payoffs[seat.index()] = -f64::from(self.players[seat.index()].contributed) / 100.0;
        }

        let active: Vec<Position> = SEATS
            .iter()
            .copied()
            .filter(|&seat| !self.players[seat.index()].folded)
            .collect();

        let winners = if active.len() == 1 {
            active
        } else {
            let mut best = None;
            let mut winners = Vec::new();
            for &seat in &active {
                let hole = self.players[seat.index()].hole.ok_or_else(|| {
                    SolverError::InvalidState(format!("{seat} reached showdown without hole cards"))
                })?;
                let strength = self.evaluator.strength(hole, &self.board);
                match best {
                    None => {
                        best = Some(strength);
                        winners.push(seat);
                    }
                    Some(current) if strength > current => {
                        best = Some(strength);
                        winners.clear();
                        winners.push(seat);
                    }
                    Some(current) if strength == current => winners.push(seat),
                    Some(_) => {}
                }
            }
            winners
        };

        #[allow(clippy::cast_precision_loss)]
        let share = f64::from(self.pot) / 100.0 / winners.len() as f64;
        for seat in winners {
            payoffs[seat.index()] += share;
        }
        Ok(payoffs)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Round: {}", self.street)?;
        writeln!(f, "Pot: {:.2}", f64::from(self.pot) / 100.0)?;
        writeln!(f, "Actor: {}", self.actor)?;
        let board: Vec<String> = self.board.iter().map(|&c| card_label(c)).collect();
        writeln!(f, "Board: {}", board.join(" "))?;
        for seat in SEATS {
            let player = &self.players[seat.index()];
            let hole = player.hole.map_or_else(
                || "--".to_string(),
                |[a, b]| format!("{} {}", card_label(a), card_label(b)),
            );
            writeln!(
                f,
                "{}: stack={:.2} bet={:.2} folded={} cards=[{}]",
                seat,
                f64::from(player.stack) / 100.0,
                f64::from(player.current_bet) / 100.0,
                player.folded,
                hole
            )?;
        }
        write!(f, "History: {}", self.history)
    }
}
