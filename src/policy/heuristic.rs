//! Threshold player backed by the evaluation cache.
//!
//! Strength is looked up per (private + board) card set; a miss computes it
//! with the player's `StrengthFn` and stores it. The cache is emptied whenever
//! a new betting round starts, and game starts drive its adaptive sizing.

use log::debug;

use crate::policy::cache::{CacheKey, EvaluationCache};
use crate::policy::config::HeuristicConfig;
use crate::policy::error::AgentError;
use crate::policy::game::{PokerAction, PokerGame};
use crate::policy::player::{acting_seat, legal_actions, GameEvent, Player};
use crate::policy::strength::{NormalizedHandScore, StrengthFn};

/// Raise, call or fold by comparing hand strength against two thresholds.
pub struct HeuristicPlayer<S = NormalizedHandScore> {
    name: String,
    seat: usize,
    config: HeuristicConfig,
    strength: S,
    cache: EvaluationCache,
}

impl HeuristicPlayer<NormalizedHandScore> {
    /// Player using the normalized hand score.
    pub fn new(name: impl Into<String>, config: HeuristicConfig) -> Result<Self, AgentError> {
        Self::with_strength(name, config, NormalizedHandScore)
    }
}

impl<S: StrengthFn> HeuristicPlayer<S> {
    /// Player using a custom strength function.
    pub fn with_strength(
        name: impl Into<String>,
        config: HeuristicConfig,
        strength: S,
    ) -> Result<Self, AgentError> {
        config.validate()?;
        let cache = EvaluationCache::new(config.cache.clone())?;
        Ok(Self {
            name: name.into(),
            seat: 0,
            config,
            strength,
            cache,
        })
    }

    /// The strength cache.
    pub fn cache(&self) -> &EvaluationCache {
        &self.cache
    }

    /// Strength of the acting seat's cards, cached.
    pub fn strength_of<G: PokerGame>(&mut self, game: &G, state: &G::State) -> Result<f64, AgentError> {
        let seat = acting_seat(game, state)?;
        let private = game.private_cards(state, seat);
        let board = game.board_cards(state);
        let key = CacheKey::from_cards(&private, &board)?;

        let strength = &self.strength;
        Ok(self
            .cache
            .get_or_insert_with(key, || strength.strength(&private, &board)))
    }

    /// Threshold action before legality is considered.
    fn preferred(&self, strength: f64) -> PokerAction {
        if strength >= self.config.raise_threshold {
            PokerAction::Raise
        } else if strength >= self.config.call_threshold {
            PokerAction::Call
        } else {
            PokerAction::Fold
        }
    }
}

/// `preferred` if legal, else the strongest legal action below it, else the
/// first legal action.
fn constrain(preferred: PokerAction, legal: &[PokerAction]) -> PokerAction {
    PokerAction::ALL[..=preferred.index()]
        .iter()
        .rev()
        .find(|a| legal.contains(*a))
        .or_else(|| legal.first())
        .copied()
        .unwrap_or(preferred)
}

impl<G: PokerGame, S: StrengthFn> Player<G> for HeuristicPlayer<S> {
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
        let legal = legal_actions(game, state)?;
        let strength = self.strength_of(game, state)?;
        let preferred = self.preferred(strength);
        let action = constrain(preferred, &legal);
        debug!(
            "{} strength {:.3} prefers {} plays {}",
            self.name, strength, preferred, action
        );
        Ok(action)
    }

    fn on_event(&mut self, _game: &G, event: GameEvent<'_, G>) {
        match event {
            GameEvent::NewRound(_) => self.cache.clear(),
            GameEvent::NewGame => self.cache.record_game(),
            _ => {}
        }
    }
}
