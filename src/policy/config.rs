//! Configuration options for the decision policies.
//!
//! Every engine takes a small serde-friendly config with sensible defaults,
//! builder methods and a `validate()` pass. `AgentsConfig` groups them so a
//! whole roster can be loaded from one JSON document.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::policy::error::ConfigError;

/// How the minimax engine memoizes positions within one decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TranspositionMode {
    /// No memoization.
    Disabled,
    /// Key by state alone and reuse the stored score as-is.
    ///
    /// Values found at a shallower depth, for the other side to move, or
    /// under an alpha-beta cutoff are reused as exact scores. Kept for
    /// comparison with older play logs; lossy.
    StateOnly,
    /// Key by (state, remaining depth, side to move) and remember whether the
    /// stored score is exact or only a bound.
    Bounded,
}

/// Tree policy used by MCTS to descend from the root.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SelectionPolicy {
    /// Pick any existing child uniformly at random.
    UniformRandom,
    /// UCB1: `reward/visits + c * sqrt(ln(parent_visits) / visits)`.
    Ucb1 {
        /// Exploration constant `c`.
        exploration: f64,
    },
}

/// Which entries the evaluation cache drops when it runs out of room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvictionPolicy {
    /// Drop the entries holding the smallest stored score.
    SmallestValue,
    /// Drop the entries with the fewest hits.
    LeastFrequentlyUsed,
}

/// How the regret-matching player picks an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CfrLiteMode {
    /// Linear raise/call probabilities from the hand score.
    HandStrength,
    /// Sample from the regret table's current strategy.
    RegretMatched,
}

/// Configuration for alpha-beta minimax.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinimaxConfig {
    /// Plies searched from the root.
    pub depth: u32,

    /// Apply alpha-beta cutoffs. Disabling this (and the transposition
    /// cache) gives plain minimax.
    pub pruning: bool,

    /// Memoization mode.
    pub transposition: TranspositionMode,

    /// Score of a won terminal position; a loss scores its negation.
    pub win_score: f64,
}

impl Default for MinimaxConfig {
    fn default() -> Self {
        Self {
            depth: 2,
            pruning: true,
            transposition: TranspositionMode::Bounded,
            win_score: 100.0,
        }
    }
}

impl MinimaxConfig {
    /// Plain minimax: no pruning, no memoization.
    pub fn plain(depth: u32) -> Self {
        Self {
            depth,
            pruning: false,
            transposition: TranspositionMode::Disabled,
            ..Default::default()
        }
    }

    /// Builder method: set search depth.
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    /// Builder method: set whether to prune.
    pub fn with_pruning(mut self, enable: bool) -> Self {
        self.pruning = enable;
        self
    }

    /// Builder method: set the transposition mode.
    pub fn with_transposition(mut self, mode: TranspositionMode) -> Self {
        self.transposition = mode;
        self
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.depth == 0 {
            return Err(ConfigError::NotPositive("depth"));
        }
        if !(self.win_score > 0.0) {
            return Err(ConfigError::NotPositive("win_score"));
        }
        Ok(())
    }
}

/// Configuration for Monte Carlo Tree Search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MctsConfig {
    /// Iterations per decision.
    pub iterations: u32,

    /// Tree policy.
    pub selection: SelectionPolicy,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            iterations: 10,
            selection: SelectionPolicy::UniformRandom,
            seed: None,
        }
    }
}

impl MctsConfig {
    /// Builder method: set the iteration budget.
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Builder method: set the tree policy.
    pub fn with_selection(mut self, selection: SelectionPolicy) -> Self {
        self.selection = selection;
        self
    }

    /// Builder method: set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate the configuration and return any errors.
    ///
    /// A zero iteration budget is accepted here; the search itself reports it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let SelectionPolicy::Ucb1 { exploration } = self.selection {
            if !(exploration >= 0.0) {
                return Err(ConfigError::NotPositive("exploration"));
            }
        }
        Ok(())
    }
}

/// Configuration for the parallel Monte Carlo rollout player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolloutConfig {
    /// Number of independent worker batches per decision.
    pub workers: usize,

    /// Random playouts run by each worker.
    pub simulations_per_worker: usize,

    /// UCB1 exploration constant for the final action choice.
    pub exploration: f64,

    /// Random seed for reproducibility. Per-worker seeds are drawn from it.
    pub seed: Option<u64>,
}

impl Default for RolloutConfig {
    fn default() -> Self {
        Self {
            workers: 10,
            simulations_per_worker: 20,
            exploration: 1.0,
            seed: None,
        }
    }
}

impl RolloutConfig {
    /// Builder method: set worker count.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Builder method: set playouts per worker.
    pub fn with_simulations_per_worker(mut self, simulations: usize) -> Self {
        self.simulations_per_worker = simulations;
        self
    }

    /// Builder method: set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::NotPositive("workers"));
        }
        if self.simulations_per_worker == 0 {
            return Err(ConfigError::NotPositive("simulations_per_worker"));
        }
        if !(self.exploration >= 0.0) {
            return Err(ConfigError::NotPositive("exploration"));
        }
        Ok(())
    }
}

/// Periodic re-tuning of the cache capacity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptiveSizing {
    /// Games per retention window.
    pub retention_games: u64,

    /// Capacity = growth * average new entries per game.
    pub growth: f64,

    /// Lower bound for the re-tuned capacity.
    pub min_capacity: usize,
}

impl Default for AdaptiveSizing {
    fn default() -> Self {
        Self {
            retention_games: 1000,
            growth: 1.5,
            min_capacity: 1,
        }
    }
}

/// Configuration for the bounded evaluation cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entries.
    pub capacity: usize,

    /// Victim selection when full.
    pub eviction: EvictionPolicy,

    /// Optional capacity re-tuning.
    pub adaptive: Option<AdaptiveSizing>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            eviction: EvictionPolicy::LeastFrequentlyUsed,
            adaptive: None,
        }
    }
}

impl CacheConfig {
    /// Builder method: set capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Builder method: set eviction policy.
    pub fn with_eviction(mut self, eviction: EvictionPolicy) -> Self {
        self.eviction = eviction;
        self
    }

    /// Builder method: enable adaptive sizing.
    pub fn with_adaptive(mut self, adaptive: AdaptiveSizing) -> Self {
        self.adaptive = Some(adaptive);
        self
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::NotPositive("capacity"));
        }
        if let Some(adaptive) = &self.adaptive {
            if adaptive.retention_games == 0 {
                return Err(ConfigError::NotPositive("retention_games"));
            }
            if !(adaptive.growth > 0.0) {
                return Err(ConfigError::NotPositive("growth"));
            }
            if adaptive.min_capacity == 0 {
                return Err(ConfigError::NotPositive("min_capacity"));
            }
        }
        Ok(())
    }
}

/// Configuration for the cached threshold player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeuristicConfig {
    /// Raise when strength is at least this.
    pub raise_threshold: f64,

    /// Call when strength is at least this (and below the raise threshold).
    pub call_threshold: f64,

    /// Strength cache settings.
    pub cache: CacheConfig,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            raise_threshold: 0.7,
            call_threshold: 0.2,
            cache: CacheConfig::default(),
        }
    }
}

impl HeuristicConfig {
    /// Tighter calling range with a least-frequently-used cache.
    pub fn advanced() -> Self {
        Self {
            call_threshold: 0.5,
            ..Default::default()
        }
    }

    /// Smallest-value eviction with capacity re-tuned every window.
    pub fn dynamic() -> Self {
        Self {
            cache: CacheConfig::default()
                .with_eviction(EvictionPolicy::SmallestValue)
                .with_adaptive(AdaptiveSizing::default()),
            ..Default::default()
        }
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.raise_threshold) {
            return Err(ConfigError::OutOfUnitRange("raise_threshold", self.raise_threshold));
        }
        if !(0.0..=1.0).contains(&self.call_threshold) {
            return Err(ConfigError::OutOfUnitRange("call_threshold", self.call_threshold));
        }
        if self.call_threshold > self.raise_threshold {
            return Err(ConfigError::ThresholdOrder {
                call: self.call_threshold,
                raise: self.raise_threshold,
            });
        }
        self.cache.validate()
    }
}

/// Configuration for the regret-matching (CFR-lite) player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegretConfig {
    /// Decision procedure.
    pub mode: CfrLiteMode,

    /// Raise probability multiplier after an opponent raise.
    pub aggression_raise_boost: f64,

    /// Call probability multiplier after an opponent raise.
    pub aggression_call_damping: f64,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for RegretConfig {
    fn default() -> Self {
        Self {
            mode: CfrLiteMode::HandStrength,
            aggression_raise_boost: 1.2,
            aggression_call_damping: 0.8,
            seed: None,
        }
    }
}

impl RegretConfig {
    /// Builder method: set the decision procedure.
    pub fn with_mode(mut self, mode: CfrLiteMode) -> Self {
        self.mode = mode;
        self
    }

    /// Builder method: set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.aggression_raise_boost > 0.0) {
            return Err(ConfigError::NotPositive("aggression_raise_boost"));
        }
        if !(self.aggression_call_damping > 0.0) {
            return Err(ConfigError::NotPositive("aggression_call_damping"));
        }
        Ok(())
    }
}

/// Settings for every policy, loadable from a single JSON document.
///
/// Missing sections fall back to their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentsConfig {
    /// Alpha-beta minimax.
    pub minimax: MinimaxConfig,
    /// Monte Carlo Tree Search.
    pub mcts: MctsConfig,
    /// Parallel rollout player.
    pub rollout: RolloutConfig,
    /// Cached threshold player.
    pub heuristic: HeuristicConfig,
    /// Regret-matching player.
    pub regret: RegretConfig,
}

impl AgentsConfig {
    /// Load configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_json_str(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.minimax.validate()?;
        self.mcts.validate()?;
        self.rollout.validate()?;
        self.heuristic.validate()?;
        self.regret.validate()
    }
}

/// Counters collected by one minimax search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Calls into the recursive search, root included.
    pub nodes: u64,
    /// Positions answered from the transposition cache.
    pub cache_hits: u64,
    /// Sibling loops cut short by `beta <= alpha`.
    pub cutoffs: u64,
}

/// Counters collected by one MCTS decision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MctsStats {
    /// Completed iterations.
    pub iterations: u32,
    /// Nodes in the arena when the search finished.
    pub nodes: usize,
    /// Visit count of the root.
    pub root_visits: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        AgentsConfig::default().validate().unwrap();
        HeuristicConfig::advanced().validate().unwrap();
        HeuristicConfig::dynamic().validate().unwrap();
    }

    #[test]
    fn test_minimax_plain_preset() {
        let config = MinimaxConfig::plain(4);
        assert_eq!(config.depth, 4);
        assert!(!config.pruning);
        assert_eq!(config.transposition, TranspositionMode::Disabled);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert_eq!(
            CacheConfig::default().with_capacity(0).validate(),
            Err(ConfigError::NotPositive("capacity"))
        );
        assert!(RolloutConfig::default().with_workers(0).validate().is_err());

        let inverted = HeuristicConfig {
            raise_threshold: 0.3,
            call_threshold: 0.6,
            ..Default::default()
        };
        assert!(matches!(
            inverted.validate(),
            Err(ConfigError::ThresholdOrder { .. })
        ));

        let negative_ucb =
            MctsConfig::default().with_selection(SelectionPolicy::Ucb1 { exploration: -1.0 });
        assert!(negative_ucb.validate().is_err());
    }

    #[test]
    fn test_json_roundtrip_with_partial_document() {
        let json = r#"{
            "minimax": { "depth": 4, "pruning": true, "transposition": "StateOnly", "win_score": 100.0 },
            "mcts": { "iterations": 64, "selection": { "Ucb1": { "exploration": 1.4 } }, "seed": 7 }
        }"#;
        let config = AgentsConfig::from_json_str(json).unwrap();
        assert_eq!(config.minimax.depth, 4);
        assert_eq!(config.minimax.transposition, TranspositionMode::StateOnly);
        assert_eq!(config.mcts.iterations, 64);
        assert_eq!(config.mcts.seed, Some(7));
        assert_eq!(config.rollout.workers, 10);
    }

    #[test]
    fn test_json_errors() {
        assert!(matches!(
            AgentsConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            AgentsConfig::from_json_file("/definitely/not/here.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
