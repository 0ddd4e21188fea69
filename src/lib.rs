//! # Rust Game Agents
//!
//! Decision policies for turn-based games behind one `Player` interface.
//!
//! ## Features
//!
//! - **Alpha-Beta Minimax**: depth-limited, with a bounded transposition cache
//! - **MCTS**: arena tree, uniform or UCB1 selection
//! - **Regret Matching**: CFR-lite fold/call/raise policy for limit poker
//! - **Evaluation Cache**: capacity-bounded, LFU or smallest-value eviction
//! - **Parallel Rollouts**: rayon workers merged by reduction
//!
//! ## Quick Start
//!
//! ```ignore
//! use rust_game_agents::policy::{MctsConfig, MctsPlayer, Player};
//!
//! // 1. Implement the Game trait for your game
//! // 2. Create a player
//! let mut player = MctsPlayer::new("mcts", MctsConfig::default().with_iterations(200))?;
//!
//! // 3. Ask for a move
//! let action = player.choose_action(&my_game, &state)?;
//! ```
//!
//! ## Modules
//!
//! - [`policy`]: Game traits, players, engines and configuration
//! - [`games`]: Reference games (Connect Four, limit hold'em, game trees)
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Match runner (external)                     │
//! │      choose_action(game, state)      on_event(game, event)      │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               │ Player trait
//!                               ▼
//!    ┌─────────┬─────────┬──────┴──────┬───────────┬─────────┐
//!    │ Minimax │  MCTS   │   Regret    │ Heuristic │ Rollout │
//!    │ + TT    │ (arena) │  matching   │ + cache   │ (rayon) │
//!    └─────────┴─────────┴─────────────┴───────────┴─────────┘
//!                               │
//!                               │ Game / PokerGame traits
//!                               ▼
//!          ┌──────────────┬───────────────┬──────────────┐
//!          │ Connect Four │ Limit hold'em │  Game trees  │
//!          └──────────────┴───────────────┴──────────────┘
//! ```

#![warn(missing_docs)]

/// Policies, engines and the traits they are written against.
pub mod policy;

/// Reference game implementations.
///
/// Used by the tests and benchmarks, and as examples of the `Game` trait.
pub mod games;

// Re-export commonly used types at crate root for convenience
pub use policy::{AgentError, Game, GameEvent, Player, PokerAction, PokerGame};
