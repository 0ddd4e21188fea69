//! Flat Monte Carlo rollouts fanned out over rayon workers.
//!
//! Each decision runs `workers` independent batches. A worker owns its RNG
//! and its tallies; batches are combined with a reduction and only the merged
//! result touches the player's long-lived counters.

use std::hash::Hash;

use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::policy::config::RolloutConfig;
use crate::policy::error::AgentError;
use crate::policy::game::Game;
use crate::policy::player::{acting_seat, legal_actions, Player};

/// Plays and wins per first action, from one or more workers.
#[derive(Debug, Clone)]
pub struct RolloutBatch<A> {
    plays: FxHashMap<A, u64>,
    wins: FxHashMap<A, u64>,
    playouts: u64,
}

impl<A> Default for RolloutBatch<A> {
    fn default() -> Self {
        Self {
            plays: FxHashMap::default(),
            wins: FxHashMap::default(),
            playouts: 0,
        }
    }
}

impl<A: Hash + Eq + Clone> RolloutBatch<A> {
    /// Record one playout that started with `action`.
    pub fn record(&mut self, action: &A, won: bool) {
        *self.plays.entry(action.clone()).or_insert(0) += 1;
        if won {
            *self.wins.entry(action.clone()).or_insert(0) += 1;
        }
        self.playouts += 1;
    }

    /// Combine two batches.
    pub fn merge(mut self, other: Self) -> Self {
        for (action, n) in other.plays {
            *self.plays.entry(action).or_insert(0) += n;
        }
        for (action, n) in other.wins {
            *self.wins.entry(action).or_insert(0) += n;
        }
        self.playouts += other.playouts;
        self
    }

    /// Playouts started with `action`.
    pub fn plays(&self, action: &A) -> u64 {
        self.plays.get(action).copied().unwrap_or(0)
    }

    /// Won playouts started with `action`.
    pub fn wins(&self, action: &A) -> u64 {
        self.wins.get(action).copied().unwrap_or(0)
    }

    /// Total playouts.
    pub fn playouts(&self) -> u64 {
        self.playouts
    }
}

/// Player choosing by UCB1 over accumulated rollout results.
///
/// Tallies are keyed by action alone and persist across decisions and games.
///
/// Playouts continue from the full game state. On an imperfect-information
/// game such as `HlPoker` that state holds the opponent's hole cards and the
/// undealt board, so this player sees more than the visible information the
/// other poker policies read.
pub struct RolloutPlayer<G: Game> {
    name: String,
    seat: usize,
    config: RolloutConfig,
    rng: StdRng,
    totals: RolloutBatch<G::Action>,
}

impl<G: Game> RolloutPlayer<G> {
    /// Create a rollout player.
    pub fn new(name: impl Into<String>, config: RolloutConfig) -> Result<Self, AgentError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            name: name.into(),
            seat: 0,
            config,
            rng,
            totals: RolloutBatch::default(),
        })
    }

    /// Accumulated tallies.
    pub fn totals(&self) -> &RolloutBatch<G::Action> {
        &self.totals
    }

    /// Run one decision's worth of batches in parallel and merge them.
    pub fn run_batches(&mut self, game: &G, state: &G::State) -> Result<RolloutBatch<G::Action>, AgentError> {
        let actions = legal_actions(game, state)?;
        let seat = acting_seat(game, state)?;
        let simulations = self.config.simulations_per_worker;
        let seeds: Vec<u64> = (0..self.config.workers).map(|_| self.rng.gen()).collect();

        let merged = seeds
            .into_par_iter()
            .map(|seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                let mut batch = RolloutBatch::default();
                for _ in 0..simulations {
                    if let Some(first) = actions.choose(&mut rng) {
                        let won = playout(game, state, first, seat, &mut rng);
                        batch.record(first, won);
                    }
                }
                batch
            })
            .reduce(RolloutBatch::default, RolloutBatch::merge);

        Ok(merged)
    }

    /// UCB1 value of `action` under the accumulated tallies.
    pub fn ucb_value(&self, action: &G::Action) -> f64 {
        let plays = self.totals.plays(action);
        if plays == 0 {
            return f64::INFINITY;
        }
        let plays = plays as f64;
        let exploit = self.totals.wins(action) as f64 / plays;
        let explore = ((self.totals.playouts() as f64).ln() / plays).sqrt();
        exploit + self.config.exploration * explore
    }
}

/// Apply `first`, then random legal actions to the end. True if `seat` profits.
fn playout<G: Game, R: Rng>(game: &G, state: &G::State, first: &G::Action, seat: usize, rng: &mut R) -> bool {
    let mut current = game.apply_action(state, first);
    loop {
        let actions = game.available_actions(&current);
        match actions.choose(rng) {
            Some(action) => current = game.apply_action(&current, action),
            None => break,
        }
    }
    game.get_payoff(&current, seat) > 0.0
}

impl<G: Game> Player<G> for RolloutPlayer<G> {
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
        let batch = self.run_batches(game, state)?;
        let totals = std::mem::take(&mut self.totals);
        self.totals = totals.merge(batch);

        let mut best: Option<(&G::Action, f64)> = None;
        for action in &actions {
            let value = self.ucb_value(action);
            if best.map_or(true, |(_, v)| value > v) {
                best = Some((action, value));
            }
        }
        let (action, value) = best.ok_or(AgentError::NoLegalActions)?;
        debug!(
            "{} picks {:?} (ucb {:.3}, {} playouts so far)",
            self.name,
            action,
            value,
            self.totals.playouts()
        );
        Ok(action.clone())
    }
}
