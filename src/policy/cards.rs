//! Playing cards as seen by the poker policies.
//!
//! Only what the policies read is modelled here: a card's rank and suit and a
//! stable id used to build order-independent cache keys. Dealing and hand
//! resolution belong to the game engine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::policy::error::AgentError;

/// Number of distinct cards in a standard deck.
pub const DECK_SIZE: u8 = 52;

/// Rank index of the deuce (ranks run 0-12: 2-A).
pub const RANK_2: u8 = 0;
/// Rank index of the five.
pub const RANK_5: u8 = 3;
/// Rank index of the ace.
pub const RANK_A: u8 = 12;

const RANK_CHARS: [char; 13] = ['2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K', 'A'];
const SUIT_CHARS: [char; 4] = ['c', 'd', 'h', 's'];

/// A single playing card.
///
/// Serialized as its bare id; deserialization rejects ids outside the deck.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Card {
    /// Card index 0-51: rank * 4 + suit
    id: u8,
}

impl Card {
    /// Create a card from rank (0-12) and suit (0-3).
    #[inline]
    pub fn new(rank: u8, suit: u8) -> Self {
        debug_assert!(rank < 13, "rank must be 0-12");
        debug_assert!(suit < 4, "suit must be 0-3");
        Self { id: rank * 4 + suit }
    }

    /// Create a card from its id, rejecting ids outside the deck.
    pub fn from_id(id: u8) -> Result<Self, AgentError> {
        if id >= DECK_SIZE {
            return Err(AgentError::InvalidCard(id));
        }
        Ok(Self { id })
    }

    /// Card with an arbitrary id, for exercising the validation paths.
    #[cfg(test)]
    pub(crate) fn unchecked(id: u8) -> Self {
        Self { id }
    }

    /// Parse a card from a string like "As", "Kh", "2c".
    pub fn parse(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        let (r, u) = (chars.next()?, chars.next()?);
        if chars.next().is_some() {
            return None;
        }
        let rank = RANK_CHARS.iter().position(|&c| c == r.to_ascii_uppercase())?;
        let suit = SUIT_CHARS.iter().position(|&c| c == u.to_ascii_lowercase())?;
        Some(Self::new(rank as u8, suit as u8))
    }

    /// Parse a run of cards like "AsKh7d" (whitespace ignored).
    pub fn parse_many(s: &str) -> Option<Vec<Self>> {
        let compact: Vec<char> = s.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.len() % 2 != 0 {
            return None;
        }
        compact
            .chunks(2)
            .map(|pair| Self::parse(&pair.iter().collect::<String>()))
            .collect()
    }

    /// The card's id (0-51).
    #[inline]
    pub fn id(&self) -> u8 {
        self.id
    }

    /// The card's rank (0-12: 2-A).
    #[inline]
    pub fn rank(&self) -> u8 {
        self.id / 4
    }

    /// The card's suit (0-3).
    #[inline]
    pub fn suit(&self) -> u8 {
        self.id % 4
    }

    /// Face value used by the scoring heuristics: 2-14, ace high.
    #[inline]
    pub fn rank_value(&self) -> u32 {
        self.rank() as u32 + 2
    }

    /// Every card of a standard deck in id order.
    pub fn deck() -> Vec<Self> {
        (0..DECK_SIZE).map(|id| Self { id }).collect()
    }
}

impl TryFrom<u8> for Card {
    type Error = AgentError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::from_id(id)
    }
}

impl From<Card> for u8 {
    fn from(card: Card) -> Self {
        card.id
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            RANK_CHARS[self.rank() as usize],
            SUIT_CHARS[self.suit() as usize]
        )
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_creation() {
        let card = Card::new(RANK_A, 3);
        assert_eq!(card.rank(), RANK_A);
        assert_eq!(card.suit(), 3);
        assert_eq!(card.id(), 51);
        assert_eq!(card.rank_value(), 14);
        assert_eq!(format!("{}", card), "As");
    }

    #[test]
    fn test_card_parsing() {
        let card = Card::parse("Kh").unwrap();
        assert_eq!(card.rank(), 11);
        assert_eq!(card.suit(), 2);
        assert!(Card::parse("Xx").is_none());
        assert!(Card::parse("Khh").is_none());

        let cards = Card::parse_many("As Kd 2c").unwrap();
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[2].rank_value(), 2);
        assert!(Card::parse_many("AsK").is_none());
    }

    #[test]
    fn test_from_id_rejects_out_of_range() {
        assert!(Card::from_id(51).is_ok());
        assert_eq!(Card::from_id(52), Err(AgentError::InvalidCard(52)));
    }

    #[test]
    fn test_serde_checks_id() {
        let card = Card::parse("As").unwrap();
        let json = serde_json::to_string(&card).unwrap();
        assert_eq!(json, "51");
        assert_eq!(serde_json::from_str::<Card>(&json).unwrap(), card);

        assert!(serde_json::from_str::<Card>("52").is_err());
        assert!(serde_json::from_str::<Card>("64").is_err());
    }

    #[test]
    fn test_deck_is_complete() {
        let deck = Card::deck();
        assert_eq!(deck.len(), 52);
        assert_eq!(deck[0], Card::new(RANK_2, 0));
    }
}
