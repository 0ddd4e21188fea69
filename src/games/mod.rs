//! Reference games for the policies.
//!
//! These serve as:
//!
//! 1. **Validation**: small positions with known answers check the search
//!    engines (a forced Connect Four win, hand-built game trees).
//!
//! 2. **Examples**: show how to implement `Game` and `PokerGame`.
//!
//! 3. **Benchmarks**: standard positions for performance testing.
//!
//! ## Available Games
//!
//! - [`connect4`]: 7x6 Connect Four with central-column move ordering
//! - [`hlpoker`]: heads-up limit hold'em with fold/call/raise betting
//! - [`tree`]: explicit game trees and random DAGs for property tests

pub mod connect4;
pub mod hlpoker;
pub mod tree;
