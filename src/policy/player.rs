//! The uniform decision interface the match runner talks to.
//!
//! Each engine is wrapped in a type implementing `Player`. The runner asks for
//! an action with `choose_action` and reports what happens at the table
//! through `on_event`; those two calls are the only places a policy mutates
//! its persistent state.

use crate::policy::error::AgentError;
use crate::policy::game::{Game, Round};

/// Notifications the match runner sends to a player.
#[derive(Debug)]
pub enum GameEvent<'a, G: Game> {
    /// This player's own action was applied.
    OwnAction {
        /// The action taken.
        action: &'a G::Action,
        /// State after the action.
        state: &'a G::State,
    },
    /// Another seat acted.
    OpponentAction {
        /// Seat that acted.
        seat: usize,
        /// The action taken.
        action: &'a G::Action,
        /// State after the action.
        state: &'a G::State,
    },
    /// A new game (hand) is about to start.
    NewGame,
    /// A betting round started; public cards may have changed.
    NewRound(Round),
    /// A betting round finished.
    EndRound(Round),
    /// The game finished in `final_state`.
    EndGame {
        /// Terminal state.
        final_state: &'a G::State,
    },
    /// Numeric result posted for a seat.
    Result {
        /// Seat the result belongs to.
        seat: usize,
        /// Chips or points won (negative when lost).
        payoff: f64,
    },
}

/// A decision-making policy for game `G`.
pub trait Player<G: Game> {
    /// Display name.
    fn name(&self) -> &str;

    /// Seat this player occupies.
    fn seat(&self) -> usize;

    /// Assign the seat before a game starts.
    fn set_seat(&mut self, seat: usize);

    /// Choose one legal action for the player to act in `state`.
    ///
    /// Returns an error instead of a guess when no action can be produced.
    fn choose_action(&mut self, game: &G, state: &G::State) -> Result<G::Action, AgentError>;

    /// React to a table event. Most policies ignore most events.
    fn on_event(&mut self, _game: &G, _event: GameEvent<'_, G>) {}
}

/// Legal actions for `state`, or `NoLegalActions` when there are none.
pub(crate) fn legal_actions<G: Game>(game: &G, state: &G::State) -> Result<Vec<G::Action>, AgentError> {
    let actions = game.available_actions(state);
    if actions.is_empty() {
        return Err(AgentError::NoLegalActions);
    }
    Ok(actions)
}

/// Seat to act in `state`, or `NoLegalActions` once the game is over.
pub(crate) fn acting_seat<G: Game>(game: &G, state: &G::State) -> Result<usize, AgentError> {
    game.current_player(state).ok_or(AgentError::NoLegalActions)
}
