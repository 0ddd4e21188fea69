//! One-ply greedy player minimising a caller-supplied risk score.

use log::debug;

use crate::policy::error::AgentError;
use crate::policy::game::Game;
use crate::policy::player::{legal_actions, Player};

/// Picks the legal action with the lowest risk; the first one wins ties.
///
/// A NaN risk ranks after every number.
pub struct RiskMinimizingPlayer<F> {
    name: String,
    seat: usize,
    risk: F,
}

impl<F> RiskMinimizingPlayer<F> {
    /// Create a player around a risk function.
    pub fn new(name: impl Into<String>, risk: F) -> Self {
        Self {
            name: name.into(),
            seat: 0,
            risk,
        }
    }
}

impl<G, F> Player<G> for RiskMinimizingPlayer<F>
where
    G: Game,
    F: FnMut(&G, &G::State, &G::Action) -> f64,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn seat(&self) -> usize {
        self.seat
    }

    fn set_seat(&mut self, seat: usize) {
        self.seat = seat;
    }

    fn choose_action(&mut self, game: &G, state: &G::State) -> Result<G::Action, AgentError> {
        let actions = legal_actions(game, state)?;

        let mut best: Option<(G::Action, f64)> = None;
        for action in actions {
            let risk = (self.risk)(game, state, &action);
            let risk = if risk.is_nan() { f64::INFINITY } else { risk };
            if best.as_ref().map_or(true, |(_, r)| risk < *r) {
                best = Some((action, risk));
            }
        }

        let (action, risk) = best.ok_or(AgentError::NoLegalActions)?;
        debug!("{} picks {:?} with risk {}", self.name, action, risk);
        Ok(action)
    }
}
