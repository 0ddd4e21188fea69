//! Cheap hand-strength signals for the poker policies.
//!
//! These are auxiliary heuristics, not a hand ranking: a flat bonus for a
//! flush, a flat bonus for any three consecutive ranks (the wheel counts),
//! and the sum of face values.

use crate::policy::cards::{Card, RANK_2, RANK_5, RANK_A};

/// Bonus when some suit appears at least five times.
pub const FLUSH_BONUS: f64 = 50.0;

/// Bonus for a three-rank run or the A-2-3-4-5 wheel.
pub const RUN_BONUS: f64 = 30.0;

/// Score a combination of private and board cards.
///
/// ```
/// use rust_game_agents::policy::cards::Card;
/// use rust_game_agents::policy::strength::hand_score;
///
/// let cards = Card::parse_many("2c3d4h").unwrap();
/// assert_eq!(hand_score(&cards), 30.0 + 2.0 + 3.0 + 4.0);
/// ```
pub fn hand_score(cards: &[Card]) -> f64 {
    let mut score = 0.0;
    if has_flush(cards) {
        score += FLUSH_BONUS;
    }
    if has_run(cards) {
        score += RUN_BONUS;
    }
    score + cards.iter().map(|c| c.rank_value() as f64).sum::<f64>()
}

/// Any suit with five or more cards.
pub fn has_flush(cards: &[Card]) -> bool {
    let mut suits = [0u8; 4];
    for card in cards {
        suits[card.suit() as usize] += 1;
    }
    suits.iter().any(|&n| n >= 5)
}

/// Three consecutive distinct ranks, or every rank of the wheel.
pub fn has_run(cards: &[Card]) -> bool {
    let mask = rank_mask(cards);

    if (0..=10).any(|low| (mask >> low) & 0b111 == 0b111) {
        return true;
    }

    let wheel = (RANK_2..=RANK_5).fold(1u16 << RANK_A, |m, r| m | (1 << r));
    mask & wheel == wheel
}

fn rank_mask(cards: &[Card]) -> u16 {
    cards.iter().fold(0u16, |m, c| m | (1 << c.rank()))
}

/// Maps private and board cards to a strength in [0, 1].
pub trait StrengthFn {
    /// Strength of `private` combined with `board`.
    fn strength(&self, private: &[Card], board: &[Card]) -> f64;
}

impl<F> StrengthFn for F
where
    F: Fn(&[Card], &[Card]) -> f64,
{
    fn strength(&self, private: &[Card], board: &[Card]) -> f64 {
        self(private, board)
    }
}

/// `hand_score` divided by its ceiling for the same number of cards.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizedHandScore;

impl StrengthFn for NormalizedHandScore {
    fn strength(&self, private: &[Card], board: &[Card]) -> f64 {
        let cards: Vec<Card> = private.iter().chain(board).copied().collect();
        if cards.is_empty() {
            return 0.0;
        }
        let ceiling = FLUSH_BONUS + RUN_BONUS + 14.0 * cards.len() as f64;
        (hand_score(&cards) / ceiling).clamp(0.0, 1.0)
    }
}
