//! Error types for decision policies and their configuration.

use thiserror::Error;

use crate::policy::cards::Card;

/// Errors surfaced by a decision call.
///
/// A failed decision never yields a fabricated action; the caller gets one of
/// these instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AgentError {
    /// The state offered to the policy has no legal actions.
    #[error("no legal actions available at decision time")]
    NoLegalActions,

    /// MCTS finished without a single root child (zero iteration budget).
    #[error("search budget exhausted before the root was expanded")]
    EmptySearchTree,

    /// Card id outside 0..52.
    #[error("card id {0} is out of range 0..52")]
    InvalidCard(u8),

    /// The same card appears twice in one combination.
    #[error("card {0} appears more than once")]
    DuplicateCard(Card),

    /// A cache key was requested for an empty card combination.
    #[error("cannot build a cache key from an empty card set")]
    EmptyCardSet,

    /// A strategy produced an action that is not legal in the given state.
    #[error("policy produced an action that is not legal: {0}")]
    IllegalAction(String),

    /// Configuration rejected by validation.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors that can occur when validating or loading configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A probability-like value is outside [0, 1].
    #[error("{0} {1} is out of range [0, 1]")]
    OutOfUnitRange(&'static str, f64),

    /// A value that must be strictly positive is not.
    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),

    /// Call threshold above raise threshold.
    #[error("call threshold {call} exceeds raise threshold {raise}")]
    ThresholdOrder {
        /// Configured call threshold.
        call: f64,
        /// Configured raise threshold.
        raise: f64,
    },

    /// Configuration file could not be read.
    #[error("failed to read config: {0}")]
    Io(String),

    /// Configuration JSON could not be parsed.
    #[error("failed to parse config: {0}")]
    Parse(String),
}
