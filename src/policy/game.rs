//! Game trait definitions consumed by the decision policies.
//!
//! Policies never own rules. They talk to a game through the `Game` trait
//! (legal moves, transitions, terminal test, payoffs) and, for hidden
//! information games, through `PokerGame`'s read-only views.

use std::fmt::{self, Debug};
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::policy::cards::Card;

/// Trait for actions that can be taken in a game.
///
/// Actions must be cloneable, comparable, and hashable so they can key MCTS
/// children and rollout statistics.
pub trait Action: Clone + Eq + Hash + Debug + Send + Sync {}

impl<T: Clone + Eq + Hash + Debug + Send + Sync> Action for T {}

/// Trait for game states.
///
/// Two states describing the same position must compare and hash identically
/// regardless of the move order that produced them; the minimax
/// transposition cache relies on it.
pub trait GameState: Clone + Eq + Hash + Debug + Send + Sync {}

impl<T: Clone + Eq + Hash + Debug + Send + Sync> GameState for T {}

/// Result of a finished game from one player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The player won.
    Win,
    /// The player lost.
    Loss,
    /// Nobody won.
    Draw,
}

impl Outcome {
    /// Classify a numeric payoff by its sign.
    pub fn from_payoff(payoff: f64) -> Self {
        if payoff > 0.0 {
            Outcome::Win
        } else if payoff < 0.0 {
            Outcome::Loss
        } else {
            Outcome::Draw
        }
    }
}

/// The rules object for a finite, turn-based game.
///
/// # Type Parameters
/// - `State`: a full position, including information hidden from players
/// - `Action`: a move
///
/// # Example
/// ```ignore
/// struct MyGame;
///
/// impl Game for MyGame {
///     type State = MyState;
///     type Action = MyMove;
///
///     // ... implement required methods
/// }
/// ```
pub trait Game: Clone + Send + Sync {
    /// The type representing a complete game state.
    type State: GameState;

    /// The type representing an action a player can take.
    type Action: Action;

    /// Total number of seats.
    fn num_players(&self) -> usize;

    /// Seat to act, or `None` once the game is over.
    fn current_player(&self, state: &Self::State) -> Option<usize>;

    /// Legal actions for the player to act. Empty iff the state is terminal.
    fn available_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Successor state after `action`. The input state is left untouched.
    fn apply_action(&self, state: &Self::State, action: &Self::Action) -> Self::State;

    /// Check if the given state is terminal (game over).
    fn is_terminal(&self, state: &Self::State) -> bool;

    /// Numeric payoff for `player` at a terminal state.
    ///
    /// Adversarial games report +1/-1/0; poker reports chips won or lost.
    fn get_payoff(&self, state: &Self::State, player: usize) -> f64;

    /// Win/loss/draw for `player` at a terminal state.
    fn outcome(&self, state: &Self::State, player: usize) -> Outcome {
        Outcome::from_payoff(self.get_payoff(state, player))
    }

    /// Move-ordering key used by alpha-beta; lower values are searched first.
    fn action_priority(&self, _state: &Self::State, _action: &Self::Action) -> i32 {
        0
    }
}

/// Static evaluation of a non-terminal leaf for depth-limited search.
///
/// Returning `None` means "no opinion"; the search substitutes a neutral 0.
pub trait Evaluator<G: Game> {
    /// Score `state` from `perspective`'s point of view.
    fn evaluate(&self, game: &G, state: &G::State, perspective: usize) -> Option<f64>;
}

/// Evaluator that never has an opinion.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEvaluation;

impl<G: Game> Evaluator<G> for NoEvaluation {
    fn evaluate(&self, _game: &G, _state: &G::State, _perspective: usize) -> Option<f64> {
        None
    }
}

/// The three betting actions of a limit poker game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PokerAction {
    /// Give up the hand.
    Fold,
    /// Check or match the current bet.
    Call,
    /// Bet or raise by the fixed increment.
    Raise,
}

impl PokerAction {
    /// All actions in table order.
    pub const ALL: [PokerAction; 3] = [PokerAction::Fold, PokerAction::Call, PokerAction::Raise];

    /// Position in `ALL`.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            PokerAction::Fold => 0,
            PokerAction::Call => 1,
            PokerAction::Raise => 2,
        }
    }

    /// Whether the action puts more chips in than the current bet.
    pub fn is_aggressive(self) -> bool {
        self == PokerAction::Raise
    }
}

impl fmt::Display for PokerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PokerAction::Fold => write!(f, "Fold"),
            PokerAction::Call => write!(f, "Call"),
            PokerAction::Raise => write!(f, "Raise"),
        }
    }
}

/// Betting round of a hold'em style hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Round {
    /// Before any board card.
    Preflop,
    /// Three board cards.
    Flop,
    /// Four board cards.
    Turn,
    /// Five board cards.
    River,
}

impl Round {
    /// Board cards visible during this round.
    pub fn board_len(self) -> usize {
        match self {
            Round::Preflop => 0,
            Round::Flop => 3,
            Round::Turn => 4,
            Round::River => 5,
        }
    }

    /// The round that follows, if any.
    pub fn next(self) -> Option<Round> {
        match self {
            Round::Preflop => Some(Round::Flop),
            Round::Flop => Some(Round::Turn),
            Round::Turn => Some(Round::River),
            Round::River => None,
        }
    }
}

/// Visible-information views for imperfect-information poker games.
///
/// Every method is a pure read of what the given seat is allowed to see.
pub trait PokerGame: Game<Action = PokerAction> {
    /// Private (hole) cards of `seat`.
    fn private_cards(&self, state: &Self::State, seat: usize) -> Vec<Card>;

    /// Community cards dealt so far.
    fn board_cards(&self, state: &Self::State) -> Vec<Card>;

    /// Total chips in the pot.
    fn pot(&self, state: &Self::State) -> f64;

    /// Chips `seat` has put in during this hand.
    fn spent(&self, state: &Self::State, seat: usize) -> f64;

    /// Current betting round.
    fn current_round(&self, state: &Self::State) -> Round;
}
