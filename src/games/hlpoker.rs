//! Heads-up limit hold'em.
//!
//! Two seats ante one chip each and receive two hole cards. Four betting
//! rounds follow (preflop, flop, turn, river) with a fixed bet size: the small
//! bet on the first two rounds and the big bet on the last two. Seat 0 acts
//! first every round and at most `raise_cap` raises are allowed per round.
//!
//! A round closes once both seats have acted and their contributions match.
//! Closing the river goes to showdown, where the higher `hand_score` takes
//! the opponent's contribution; equal scores split (payoff 0).

use rand::seq::SliceRandom;
use rand::Rng;

use crate::policy::cache::CacheKey;
use crate::policy::cards::Card;
use crate::policy::error::AgentError;
use crate::policy::game::{Game, PokerAction, PokerGame, Round};
use crate::policy::strength::hand_score;

/// A dealt hand and its betting history so far.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HlPokerState {
    hole: [[Card; 2]; 2],
    board: [Card; 5],
    round: Round,
    spent: [u32; 2],
    raises: u8,
    actions_in_round: u8,
    to_act: u8,
    folded: Option<u8>,
    showdown: bool,
}

impl HlPokerState {
    /// Seat that folded, if the hand ended that way.
    pub fn folded(&self) -> Option<usize> {
        self.folded.map(|s| s as usize)
    }

    /// Raises made in the current round.
    pub fn raises_in_round(&self) -> u8 {
        self.raises
    }

    fn facing_bet(&self, seat: usize) -> bool {
        self.spent[1 - seat] > self.spent[seat]
    }
}

/// Table rules.
#[derive(Debug, Clone)]
pub struct HlPoker {
    /// Forced contribution per seat before the deal.
    pub ante: u32,
    /// Bet size on preflop and flop.
    pub small_bet: u32,
    /// Bet size on turn and river.
    pub big_bet: u32,
    /// Maximum raises per round.
    pub raise_cap: u8,
}

impl Default for HlPoker {
    fn default() -> Self {
        Self {
            ante: 1,
            small_bet: 1,
            big_bet: 2,
            raise_cap: 3,
        }
    }
}

impl HlPoker {
    /// Default limits: ante 1, bets 1/2, three raises per round.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shuffle a deck and deal a fresh hand.
    pub fn deal<R: Rng + ?Sized>(&self, rng: &mut R) -> HlPokerState {
        let mut deck = Card::deck();
        deck.shuffle(rng);
        let hole = [[deck[0], deck[1]], [deck[2], deck[3]]];
        let board = [deck[4], deck[5], deck[6], deck[7], deck[8]];
        self.start(hole, board)
    }

    /// Deal a hand with the given cards; every card must be distinct.
    pub fn deal_cards(&self, hole: [[Card; 2]; 2], board: [Card; 5]) -> Result<HlPokerState, AgentError> {
        CacheKey::from_cards(&hole.concat(), &board)?;
        Ok(self.start(hole, board))
    }

    fn start(&self, hole: [[Card; 2]; 2], board: [Card; 5]) -> HlPokerState {
        HlPokerState {
            hole,
            board,
            round: Round::Preflop,
            spent: [self.ante; 2],
            raises: 0,
            actions_in_round: 0,
            to_act: 0,
            folded: None,
            showdown: false,
        }
    }

    /// Fixed bet size for a round.
    pub fn bet_size(&self, round: Round) -> u32 {
        match round {
            Round::Preflop | Round::Flop => self.small_bet,
            Round::Turn | Round::River => self.big_bet,
        }
    }

    fn showdown_scores(&self, state: &HlPokerState) -> [f64; 2] {
        let score = |seat: usize| {
            let cards: Vec<Card> = state.hole[seat].iter().chain(&state.board).copied().collect();
            hand_score(&cards)
        };
        [score(0), score(1)]
    }
}

impl Game for HlPoker {
    type State = HlPokerState;
    type Action = PokerAction;

    fn num_players(&self) -> usize {
        2
    }

    fn current_player(&self, state: &Self::State) -> Option<usize> {
        (!self.is_terminal(state)).then_some(state.to_act as usize)
    }

    fn available_actions(&self, state: &Self::State) -> Vec<Self::Action> {
        if self.is_terminal(state) {
            return vec![];
        }
        let seat = state.to_act as usize;
        let mut actions = Vec::with_capacity(3);
        if state.facing_bet(seat) {
            actions.push(PokerAction::Fold);
        }
        actions.push(PokerAction::Call);
        if state.raises < self.raise_cap {
            actions.push(PokerAction::Raise);
        }
        actions
    }

    fn apply_action(&self, state: &Self::State, action: &Self::Action) -> Self::State {
        let seat = state.to_act as usize;
        let mut next = state.clone();

        match action {
            PokerAction::Fold => {
                next.folded = Some(state.to_act);
                return next;
            }
            PokerAction::Call => {
                next.spent[seat] = state.spent[1 - seat];
            }
            PokerAction::Raise => {
                next.spent[seat] = state.spent[1 - seat] + self.bet_size(state.round);
                next.raises += 1;
            }
        }
        next.actions_in_round += 1;

        let closed = next.actions_in_round >= 2 && next.spent[0] == next.spent[1];
        if !closed {
            next.to_act = 1 - state.to_act;
            return next;
        }
        match state.round.next() {
            Some(round) => {
                next.round = round;
                next.raises = 0;
                next.actions_in_round = 0;
                next.to_act = 0;
            }
            None => next.showdown = true,
        }
        next
    }

    fn is_terminal(&self, state: &Self::State) -> bool {
        state.folded.is_some() || state.showdown
    }

    fn get_payoff(&self, state: &Self::State, player: usize) -> f64 {
        let opponent = 1 - player;
        if let Some(folder) = state.folded() {
            return if folder == player {
                -(state.spent[player] as f64)
            } else {
                state.spent[opponent] as f64
            };
        }
        if !state.showdown {
            return 0.0;
        }
        let scores = self.showdown_scores(state);
        if scores[player] > scores[opponent] {
            state.spent[opponent] as f64
        } else if scores[player] < scores[opponent] {
            -(state.spent[player] as f64)
        } else {
            0.0
        }
    }
}

impl PokerGame for HlPoker {
    fn private_cards(&self, state: &Self::State, seat: usize) -> Vec<Card> {
        state.hole[seat].to_vec()
    }

    fn board_cards(&self, state: &Self::State) -> Vec<Card> {
        state.board[..state.round.board_len()].to_vec()
    }

    fn pot(&self, state: &Self::State) -> f64 {
        (state.spent[0] + state.spent[1]) as f64
    }

    fn spent(&self, state: &Self::State, seat: usize) -> f64 {
        state.spent[seat] as f64
    }

    fn current_round(&self, state: &Self::State) -> Round {
        state.round
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn hand(hole0: &str, hole1: &str, board: &str) -> HlPokerState {
        let h0 = Card::parse_many(hole0).unwrap();
        let h1 = Card::parse_many(hole1).unwrap();
        let b = Card::parse_many(board).unwrap();
        HlPoker::new()
            .deal_cards([[h0[0], h0[1]], [h1[0], h1[1]]], [b[0], b[1], b[2], b[3], b[4]])
            .unwrap()
    }

    fn play(game: &HlPoker, state: &HlPokerState, actions: &[PokerAction]) -> HlPokerState {
        actions
            .iter()
            .fold(state.clone(), |s, a| game.apply_action(&s, a))
    }

    #[test]
    fn test_opening_actions() {
        let game = HlPoker::new();
        let state = hand("AsAd", "2c7h", "Kc9d5sJh2d");
        assert_eq!(game.current_player(&state), Some(0));
        assert_eq!(game.available_actions(&state), vec![PokerAction::Call, PokerAction::Raise]);
        assert_eq!(game.pot(&state), 2.0);
        assert!(game.board_cards(&state).is_empty());
    }

    #[test]
    fn test_raise_then_fold() {
        let game = HlPoker::new();
        let state = hand("AsAd", "2c7h", "Kc9d5sJh2d");
        let raised = game.apply_action(&state, &PokerAction::Raise);
        assert_eq!(game.current_player(&raised), Some(1));
        assert_eq!(
            game.available_actions(&raised),
            vec![PokerAction::Fold, PokerAction::Call, PokerAction::Raise]
        );

        let folded = game.apply_action(&raised, &PokerAction::Fold);
        assert!(game.is_terminal(&folded));
        assert_eq!(folded.folded(), Some(1));
        assert_eq!(game.get_payoff(&folded, 0), 1.0);
        assert_eq!(game.get_payoff(&folded, 1), -1.0);
    }

    #[test]
    fn test_raise_cap() {
        let game = HlPoker::new();
        let state = hand("AsAd", "2c7h", "Kc9d5sJh2d");
        let capped = play(&game, &state, &[PokerAction::Raise; 3]);
        assert_eq!(capped.raises_in_round(), 3);
        assert_eq!(game.available_actions(&capped), vec![PokerAction::Fold, PokerAction::Call]);
        assert_eq!(game.spent(&capped, 0), 4.0);
        assert_eq!(game.spent(&capped, 1), 3.0);
    }

    #[test]
    fn test_check_check_advances_round() {
        let game = HlPoker::new();
        let state = hand("AsAd", "2c7h", "Kc9d5sJh2d");
        let flop = play(&game, &state, &[PokerAction::Call, PokerAction::Call]);
        assert_eq!(game.current_round(&flop), Round::Flop);
        assert_eq!(game.board_cards(&flop).len(), 3);
        assert_eq!(game.current_player(&flop), Some(0));

        let turn = play(&game, &flop, &[PokerAction::Raise, PokerAction::Call]);
        assert_eq!(game.current_round(&turn), Round::Turn);
        assert_eq!(game.spent(&turn, 0), 2.0);

        // big bet on the turn
        let bet = game.apply_action(&turn, &PokerAction::Raise);
        assert_eq!(game.spent(&bet, 0), 4.0);
    }

    #[test]
    fn test_showdown_payoffs() {
        let game = HlPoker::new();
        let checks = [PokerAction::Call; 8];

        // aces beat a rag hand on a dry board
        let state = hand("AsAd", "2c7h", "Kc9d5sJh2d");
        let end = play(&game, &state, &checks);
        assert!(game.is_terminal(&end));
        assert_eq!(game.get_payoff(&end, 0), 1.0);
        assert_eq!(game.get_payoff(&end, 1), -1.0);

        // equal scores split
        let state = hand("AsKd", "AcKs", "2c7d9hJsQh");
        let end = play(&game, &state, &checks);
        assert_eq!(game.get_payoff(&end, 0), 0.0);
        assert_eq!(game.get_payoff(&end, 1), 0.0);
    }

    #[test]
    fn test_duplicate_cards_rejected() {
        let a = Card::parse("As").unwrap();
        let k = Card::parse("Kd").unwrap();
        let result = HlPoker::new().deal_cards([[a, k], [a, k]], Card::deck()[..5].try_into().unwrap());
        assert!(matches!(result, Err(AgentError::DuplicateCard(_))));
    }

    #[test]
    fn test_random_play_terminates_zero_sum() {
        let game = HlPoker::new();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let mut state = game.deal(&mut rng);
            let mut steps = 0;
            while !game.is_terminal(&state) {
                let actions = game.available_actions(&state);
                let action = actions[rng.gen_range(0..actions.len())];
                state = game.apply_action(&state, &action);
                steps += 1;
                assert!(steps < 64);
            }
            assert_eq!(game.get_payoff(&state, 0), -game.get_payoff(&state, 1));
            assert!(game.available_actions(&state).is_empty());
        }
    }
}
