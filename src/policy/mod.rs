//! Decision policies for turn-based games.
//!
//! Every policy implements [`Player`], which the match runner drives with two
//! calls: `choose_action` when the policy's seat must act and `on_event` for
//! everything else that happens at the table.
//!
//! # Engines
//!
//! - **Minimax**: depth-limited alpha-beta with a per-decision transposition
//!   cache ([`MinimaxPlayer`]).
//! - **MCTS**: arena-backed Monte Carlo Tree Search with uniform or UCB1
//!   selection ([`MctsPlayer`]).
//! - **Regret matching**: a single fold/call/raise regret vector updated once
//!   per hand ([`RegretMatchingPlayer`]).
//! - **Heuristic**: hand-strength thresholds over a bounded
//!   [`EvaluationCache`] ([`HeuristicPlayer`]).
//! - **Rollouts**: flat Monte Carlo fanned out over rayon workers
//!   ([`RolloutPlayer`]).
//! - **Greedy**: lowest caller-defined risk ([`RiskMinimizingPlayer`]).
//!
//! # Example
//!
//! ```
//! use rust_game_agents::games::connect4::Connect4;
//! use rust_game_agents::policy::{MinimaxConfig, MinimaxPlayer, Player};
//!
//! let game = Connect4::new();
//! let state = game.from_moves(&[1, 1, 2, 2, 3, 5]).unwrap();
//! let mut player = MinimaxPlayer::new("minimax", MinimaxConfig::default()).unwrap();
//! let action = player.choose_action(&game, &state).unwrap();
//! assert_eq!(action.col(), 4);
//! ```
//!
//! # Regret matching
//!
//! ```text
//! strategy(a) = max(0, regret(a)) / sum(max(0, regret(a')))
//! regret(a)  += utility * (strategy(a) - 1/3)
//! ```

pub mod cache;
pub mod cards;
pub mod config;
pub mod error;
pub mod game;
pub mod greedy;
pub mod heuristic;
pub mod mcts;
pub mod minimax;
pub mod player;
pub mod regret;
pub mod rollout;
pub mod strength;

// Re-export main types for convenient access
pub use cache::{CacheKey, EvaluationCache};
pub use cards::Card;
pub use config::{
    AgentsConfig, CacheConfig, CfrLiteMode, EvictionPolicy, HeuristicConfig, MctsConfig,
    MctsStats, MinimaxConfig, RegretConfig, RolloutConfig, SearchStats, SelectionPolicy,
    TranspositionMode,
};
pub use error::{AgentError, ConfigError};
pub use game::{Action, Evaluator, Game, GameState, NoEvaluation, Outcome, PokerAction, PokerGame, Round};
pub use greedy::RiskMinimizingPlayer;
pub use heuristic::HeuristicPlayer;
pub use mcts::{MctsPlayer, MctsSearch};
pub use minimax::{MinimaxPlayer, MinimaxSearch, SearchResult};
pub use player::{GameEvent, Player};
pub use regret::{RegretMatchingPlayer, RegretTable};
pub use rollout::{RolloutBatch, RolloutPlayer};
pub use strength::{hand_score, NormalizedHandScore, StrengthFn};
