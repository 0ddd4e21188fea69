//! Depth-limited alpha-beta minimax with a per-decision transposition cache.
//!
//! The search is fail-soft: a returned score `v` with window `(alpha, beta)`
//! means the true value is `v` when `alpha < v < beta`, at most `v` when
//! `v <= alpha`, and at least `v` when `v >= beta`. Bounded transposition
//! entries record which of the three cases produced them, so a score found
//! under a cutoff is never reused as exact.

use log::{debug, trace};
use rustc_hash::FxHashMap;

use crate::policy::config::{MinimaxConfig, SearchStats, TranspositionMode};
use crate::policy::error::AgentError;
use crate::policy::game::{Evaluator, Game, NoEvaluation, Outcome};
use crate::policy::player::{acting_seat, legal_actions, Player};

/// Best action found at the root and its score.
#[derive(Debug, Clone)]
pub struct SearchResult<A> {
    /// Chosen action. Always `Some` for a successful top-level search.
    pub action: Option<A>,
    /// Minimax value from the root player's perspective.
    pub score: f64,
    /// Counters for this search.
    pub stats: SearchStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Exact,
    Lower,
    Upper,
}

#[derive(Debug, Clone, Copy)]
struct TranspositionEntry {
    score: f64,
    bound: Bound,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TranspositionKey<S> {
    state: S,
    depth: u32,
    maximizing: bool,
}

/// Alpha-beta search engine.
///
/// The transposition table is cleared at the start of each call to
/// [`MinimaxSearch::search`]; nothing carries over between decisions.
pub struct MinimaxSearch<G: Game, E = NoEvaluation> {
    config: MinimaxConfig,
    evaluator: E,
    table: FxHashMap<TranspositionKey<G::State>, TranspositionEntry>,
    stats: SearchStats,
    perspective: usize,
}

impl<G: Game> MinimaxSearch<G, NoEvaluation> {
    /// Engine scoring only terminal positions.
    pub fn new(config: MinimaxConfig) -> Result<Self, AgentError> {
        Self::with_evaluator(config, NoEvaluation)
    }
}

impl<G: Game, E: Evaluator<G>> MinimaxSearch<G, E> {
    /// Engine with a static evaluator for non-terminal leaves.
    pub fn with_evaluator(config: MinimaxConfig, evaluator: E) -> Result<Self, AgentError> {
        config.validate()?;
        Ok(Self {
            config,
            evaluator,
            table: FxHashMap::default(),
            stats: SearchStats::default(),
            perspective: 0,
        })
    }

    /// Search `state` to the configured depth for the player to act.
    pub fn search(
        &mut self,
        game: &G,
        state: &G::State,
    ) -> Result<SearchResult<G::Action>, AgentError> {
        legal_actions(game, state)?;
        self.perspective = acting_seat(game, state)?;
        self.table.clear();
        self.stats = SearchStats::default();

        let (action, score) = self.minimax(
            game,
            state,
            self.config.depth,
            true,
            f64::NEG_INFINITY,
            f64::INFINITY,
            true,
        );
        let action = action.ok_or(AgentError::NoLegalActions)?;

        debug!(
            "minimax depth {} chose {:?} (score {}, {} nodes, {} cache hits, {} cutoffs)",
            self.config.depth,
            action,
            score,
            self.stats.nodes,
            self.stats.cache_hits,
            self.stats.cutoffs
        );

        Ok(SearchResult {
            action: Some(action),
            score,
            stats: self.stats.clone(),
        })
    }

    /// Counters from the most recent search.
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &MinimaxConfig {
        &self.config
    }

    #[allow(clippy::too_many_arguments)]
    fn minimax(
        &mut self,
        game: &G,
        state: &G::State,
        depth: u32,
        maximizing: bool,
        mut alpha: f64,
        mut beta: f64,
        is_root: bool,
    ) -> (Option<G::Action>, f64) {
        self.stats.nodes += 1;

        if depth == 0 || game.is_terminal(state) {
            return (None, self.evaluate(game, state));
        }

        let key = if is_root { None } else { self.key(state, depth, maximizing) };
        if let Some(score) = key.as_ref().and_then(|k| self.probe(k, alpha, beta)) {
            self.stats.cache_hits += 1;
            return (None, score);
        }

        let mut actions = game.available_actions(state);
        if actions.is_empty() {
            return (None, self.evaluate(game, state));
        }
        actions.sort_by_key(|a| game.action_priority(state, a));

        let (window_alpha, window_beta) = (alpha, beta);
        let mut best_action = None;
        let mut best = if maximizing {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };

        for action in actions {
            let next = game.apply_action(state, &action);
            let (_, value) = self.minimax(game, &next, depth - 1, !maximizing, alpha, beta, false);

            if maximizing {
                if value > best {
                    best = value;
                    best_action = Some(action);
                }
                alpha = alpha.max(best);
            } else {
                if value < best {
                    best = value;
                    best_action = Some(action);
                }
                beta = beta.min(best);
            }

            if self.config.pruning && beta <= alpha {
                self.stats.cutoffs += 1;
                break;
            }
        }

        if let Some(key) = key {
            let bound = if best <= window_alpha {
                Bound::Upper
            } else if best >= window_beta {
                Bound::Lower
            } else {
                Bound::Exact
            };
            self.table.insert(key, TranspositionEntry { score: best, bound });
        }

        trace!("depth {} maximizing {} -> {}", depth, maximizing, best);
        (best_action, best)
    }

    fn key(
        &self,
        state: &G::State,
        depth: u32,
        maximizing: bool,
    ) -> Option<TranspositionKey<G::State>> {
        match self.config.transposition {
            TranspositionMode::Disabled => None,
            TranspositionMode::StateOnly => Some(TranspositionKey {
                state: state.clone(),
                depth: 0,
                maximizing: false,
            }),
            TranspositionMode::Bounded => Some(TranspositionKey {
                state: state.clone(),
                depth,
                maximizing,
            }),
        }
    }

    /// Stored score usable for the window `(alpha, beta)`, if any.
    fn probe(&self, key: &TranspositionKey<G::State>, alpha: f64, beta: f64) -> Option<f64> {
        let entry = self.table.get(key)?;
        if self.config.transposition == TranspositionMode::StateOnly {
            return Some(entry.score);
        }
        match entry.bound {
            Bound::Exact => Some(entry.score),
            Bound::Lower if entry.score >= beta => Some(entry.score),
            Bound::Upper if entry.score <= alpha => Some(entry.score),
            _ => None,
        }
    }

    /// Static score from the root player's perspective; undefined is 0.
    fn evaluate(&self, game: &G, state: &G::State) -> f64 {
        if game.is_terminal(state) {
            return match game.outcome(state, self.perspective) {
                Outcome::Win => self.config.win_score,
                Outcome::Loss => -self.config.win_score,
                Outcome::Draw => 0.0,
            };
        }
        self.evaluator
            .evaluate(game, state, self.perspective)
            .filter(|v| !v.is_nan())
            .unwrap_or(0.0)
    }
}

/// Player wrapping [`MinimaxSearch`].
pub struct MinimaxPlayer<G: Game, E = NoEvaluation> {
    name: String,
    seat: usize,
    search: MinimaxSearch<G, E>,
    last: Option<SearchStats>,
}

impl<G: Game> MinimaxPlayer<G, NoEvaluation> {
    /// Create a player scoring only terminal positions.
    pub fn new(name: impl Into<String>, config: MinimaxConfig) -> Result<Self, AgentError> {
        Ok(Self::from_search(name, MinimaxSearch::new(config)?))
    }
}

impl<G: Game, E: Evaluator<G>> MinimaxPlayer<G, E> {
    /// Create a player around an existing engine.
    pub fn from_search(name: impl Into<String>, search: MinimaxSearch<G, E>) -> Self {
        Self {
            name: name.into(),
            seat: 0,
            search,
            last: None,
        }
    }

    /// Counters from the last decision.
    pub fn last_stats(&self) -> Option<&SearchStats> {
        self.last.as_ref()
    }
}

impl<G: Game, E: Evaluator<G>> Player<G> for MinimaxPlayer<G, E> {
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
        let result = self.search.search(game, state)?;
        self.last = Some(result.stats);
        result.action.ok_or(AgentError::NoLegalActions)
    }
}
