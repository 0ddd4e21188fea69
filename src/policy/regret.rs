//! Regret matching over the fixed fold/call/raise action set.
//!
//! This is a single aggregate regret vector updated once per hand, not a
//! per-information-set CFR solver. The table still tracks cumulative strategy
//! weights so an average strategy can be read back.

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::policy::config::{CfrLiteMode, RegretConfig};
use crate::policy::error::AgentError;
use crate::policy::game::{PokerAction, PokerGame};
use crate::policy::player::{acting_seat, legal_actions, GameEvent, Player};
use crate::policy::strength::hand_score;

/// Number of actions in the table.
pub const NUM_ACTIONS: usize = 3;

const UNIFORM: f64 = 1.0 / NUM_ACTIONS as f64;

/// Cumulative regrets and strategy weights for fold, call and raise.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegretTable {
    regrets: [f64; NUM_ACTIONS],
    strategy_sum: [f64; NUM_ACTIONS],
    updates: u64,
}

impl RegretTable {
    /// Table with all regrets at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Table starting from the given regrets.
    pub fn from_regrets(regrets: [f64; NUM_ACTIONS]) -> Self {
        Self {
            regrets,
            ..Default::default()
        }
    }

    /// Current strategy by regret matching.
    ///
    /// Proportional to positive regrets; uniform when none is positive.
    pub fn strategy(&self) -> [f64; NUM_ACTIONS] {
        let positive = self.regrets.map(|r| r.max(0.0));
        let sum: f64 = positive.iter().sum();
        if sum > 0.0 {
            positive.map(|p| p / sum)
        } else {
            [UNIFORM; NUM_ACTIONS]
        }
    }

    /// Average of every strategy used in an update.
    pub fn average_strategy(&self) -> [f64; NUM_ACTIONS] {
        let total: f64 = self.strategy_sum.iter().sum();
        if total > 0.0 {
            self.strategy_sum.map(|s| s / total)
        } else {
            [UNIFORM; NUM_ACTIONS]
        }
    }

    /// Fold one hand's utility into the regrets.
    ///
    /// `regret[a] += utility * (strategy[a] - 1/3)` with the strategy taken
    /// before the update.
    pub fn update(&mut self, utility: f64) {
        let strategy = self.strategy();
        for (i, &p) in strategy.iter().enumerate() {
            self.regrets[i] += utility * (p - UNIFORM);
            self.strategy_sum[i] += p;
        }
        self.updates += 1;
    }

    /// Raw cumulative regrets.
    pub fn regrets(&self) -> &[f64; NUM_ACTIONS] {
        &self.regrets
    }

    /// Number of updates applied.
    pub fn updates(&self) -> u64 {
        self.updates
    }
}

/// Poker player sampling from hand-strength or regret-matched probabilities.
pub struct RegretMatchingPlayer {
    name: String,
    seat: usize,
    config: RegretConfig,
    table: RegretTable,
    rng: StdRng,
    /// Whether the opponent's most recent action was a raise.
    opponent_raised: bool,
}

impl RegretMatchingPlayer {
    /// Create a player with an empty regret table.
    pub fn new(name: impl Into<String>, config: RegretConfig) -> Result<Self, AgentError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            name: name.into(),
            seat: 0,
            config,
            table: RegretTable::new(),
            rng,
            opponent_raised: false,
        })
    }

    /// The regret table.
    pub fn table(&self) -> &RegretTable {
        &self.table
    }

    /// Mutable access to the regret table, e.g. to restore a saved one.
    pub fn table_mut(&mut self) -> &mut RegretTable {
        &mut self.table
    }

    /// Fold/call/raise probabilities for the acting seat, restricted to
    /// legal actions.
    pub fn action_distribution<G: PokerGame>(
        &self,
        game: &G,
        state: &G::State,
    ) -> Result<[f64; NUM_ACTIONS], AgentError> {
        let legal = legal_actions(game, state)?;
        let seat = acting_seat(game, state)?;

        let raw = match self.config.mode {
            CfrLiteMode::HandStrength => {
                let mut cards = game.private_cards(state, seat);
                cards.extend(game.board_cards(state));
                self.strength_probabilities(hand_score(&cards))
            }
            CfrLiteMode::RegretMatched => self.table.strategy(),
        };

        let mut probs = [0.0; NUM_ACTIONS];
        for action in &legal {
            probs[action.index()] = raw[action.index()];
        }
        let sum: f64 = probs.iter().sum();
        if sum > 0.0 {
            return Ok(probs.map(|p| p / sum));
        }

        warn!(
            "{}: no probability on legal actions {:?}, playing uniformly",
            self.name, legal
        );
        let share = 1.0 / legal.len() as f64;
        let mut uniform = [0.0; NUM_ACTIONS];
        for action in &legal {
            uniform[action.index()] = share;
        }
        Ok(uniform)
    }

    /// Linear raise/call ramps from a hand score, fold takes the rest.
    fn strength_probabilities(&self, score: f64) -> [f64; NUM_ACTIONS] {
        let mut raise = ((score - 0.3).max(0.0) / 0.5).min(0.5);
        let mut call = ((score - 0.2).max(0.0) / 0.5).min(0.4);
        if self.opponent_raised {
            raise *= self.config.aggression_raise_boost;
            call *= self.config.aggression_call_damping;
        }
        let fold = (1.0 - raise - call).max(0.0);
        [fold, call, raise]
    }

    /// Draw an index from `probs`; zero-probability entries are never drawn.
    fn sample(&mut self, probs: &[f64; NUM_ACTIONS]) -> usize {
        let r: f64 = self.rng.gen();
        let mut cumsum = 0.0;
        let mut last = 0;
        for (i, &p) in probs.iter().enumerate() {
            if p <= 0.0 {
                continue;
            }
            cumsum += p;
            last = i;
            if r < cumsum {
                return i;
            }
        }
        last
    }
}

impl<G: PokerGame> Player<G> for RegretMatchingPlayer {
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
        let probs = self.action_distribution(game, state)?;
        let action = PokerAction::ALL[self.sample(&probs)];
        if !game.available_actions(state).contains(&action) {
            return Err(AgentError::IllegalAction(action.to_string()));
        }
        debug!("{} plays {} from {:?}", self.name, action, probs);
        Ok(action)
    }

    fn on_event(&mut self, game: &G, event: GameEvent<'_, G>) {
        match event {
            GameEvent::NewGame => self.opponent_raised = false,
            GameEvent::OpponentAction { action, .. } => {
                self.opponent_raised = action.is_aggressive();
            }
            GameEvent::EndGame { final_state } => {
                let utility = game.get_payoff(final_state, self.seat);
                self.table.update(utility);
                debug!(
                    "{} regret update {} with utility {}: {:?}",
                    self.name,
                    self.table.updates(),
                    utility,
                    self.table.regrets()
                );
            }
            _ => {}
        }
    }
}
