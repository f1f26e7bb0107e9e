//! Claims: the poker-hand patterns players assert exist among everyone's cards.

use crate::cards::{Rank, Suit};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The ten claimable hand categories, weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum HandCategory {
    HighCard = 1,
    Pair = 2,
    TwoPair = 3,
    ThreeOfAKind = 4,
    Straight = 5,
    Flush = 6,
    FullHouse = 7,
    FourOfAKind = 8,
    StraightFlush = 9,
    RoyalFlush = 10,
}

impl HandCategory {
    pub const ALL: [HandCategory; 10] = [
        HandCategory::HighCard,
        HandCategory::Pair,
        HandCategory::TwoPair,
        HandCategory::ThreeOfAKind,
        HandCategory::Straight,
        HandCategory::Flush,
        HandCategory::FullHouse,
        HandCategory::FourOfAKind,
        HandCategory::StraightFlush,
        HandCategory::RoyalFlush,
    ];

    /// Claim strength: 1 for High Card up to 10 for Royal Flush.
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    pub const fn name(self) -> &'static str {
        match self {
            HandCategory::HighCard => "High Card",
            HandCategory::Pair => "Pair",
            HandCategory::TwoPair => "Two Pair",
            HandCategory::ThreeOfAKind => "Three of a Kind",
            HandCategory::Straight => "Straight",
            HandCategory::Flush => "Flush",
            HandCategory::FullHouse => "Full House",
            HandCategory::FourOfAKind => "Four of a Kind",
            HandCategory::StraightFlush => "Straight Flush",
            HandCategory::RoyalFlush => "Royal Flush",
        }
    }

    /// Two Pair and Full House name a second rank.
    pub const fn needs_second_rank(self) -> bool {
        matches!(self, HandCategory::TwoPair | HandCategory::FullHouse)
    }

    pub const fn needs_suit(self) -> bool {
        matches!(self, HandCategory::Flush | HandCategory::StraightFlush | HandCategory::RoyalFlush)
    }

    /// Straights are named by their top card, which must be at least a Five.
    pub const fn is_straight(self) -> bool {
        matches!(self, HandCategory::Straight | HandCategory::StraightFlush)
    }

    pub fn next_wrapping(self) -> HandCategory {
        HandCategory::ALL[self.ordinal() as usize % HandCategory::ALL.len()]
    }

    pub fn prev_wrapping(self) -> HandCategory {
        let len = HandCategory::ALL.len();
        HandCategory::ALL[(self.ordinal() as usize + len - 2) % len]
    }
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Malformed claims. Rejected before they reach the table.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ClaimError {
    #[error("{0} needs a second rank")]
    MissingSecondRank(HandCategory),
    #[error("{0} needs a suit")]
    MissingSuit(HandCategory),
    #[error("{0} needs two different ranks")]
    DuplicateRank(HandCategory),
    #[error("{category} needs a top card of 5 or higher, got {rank}")]
    StraightTooLow { category: HandCategory, rank: Rank },
}

/// A claimed hand pattern. Value type: never edited once made.
///
/// Only the fields the category uses are kept; construct through [`Claim::new`]
/// or the per-category helpers so the shape is always valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Claim {
    category: HandCategory,
    rank: Rank,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    second: Option<Rank>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    suit: Option<Suit>,
}

impl Claim {
    /// Validate and normalize a claim.
    ///
    /// Fields a category does not use are dropped; Two Pair keeps the higher
    /// rank as primary; Royal Flush always tops at Ace.
    pub fn new(
        category: HandCategory,
        rank: Rank,
        second: Option<Rank>,
        suit: Option<Suit>,
    ) -> Result<Self, ClaimError> {
        let second = if category.needs_second_rank() {
            let s = second.ok_or(ClaimError::MissingSecondRank(category))?;
            if s == rank {
                return Err(ClaimError::DuplicateRank(category));
            }
            Some(s)
        } else {
            None
        };
        let suit = if category.needs_suit() {
            Some(suit.ok_or(ClaimError::MissingSuit(category))?)
        } else {
            None
        };
        if category.is_straight() && rank < Rank::Five {
            return Err(ClaimError::StraightTooLow { category, rank });
        }
        let (rank, second) = match (category, second) {
            (HandCategory::TwoPair, Some(s)) if s > rank => (s, Some(rank)),
            (HandCategory::RoyalFlush, _) => (Rank::Ace, None),
            _ => (rank, second),
        };
        Ok(Self { category, rank, second, suit })
    }

    /// Re-run [`Claim::new`] on a claim that arrived from outside (e.g. deserialized).
    pub fn validated(self) -> Result<Self, ClaimError> {
        Self::new(self.category, self.rank, self.second, self.suit)
    }

    pub fn high_card(rank: Rank) -> Self {
        Self { category: HandCategory::HighCard, rank, second: None, suit: None }
    }

    pub fn pair(rank: Rank) -> Self {
        Self { category: HandCategory::Pair, rank, second: None, suit: None }
    }

    pub fn three_of_a_kind(rank: Rank) -> Self {
        Self { category: HandCategory::ThreeOfAKind, rank, second: None, suit: None }
    }

    pub fn four_of_a_kind(rank: Rank) -> Self {
        Self { category: HandCategory::FourOfAKind, rank, second: None, suit: None }
    }

    pub fn two_pair(a: Rank, b: Rank) -> Result<Self, ClaimError> {
        Self::new(HandCategory::TwoPair, a, Some(b), None)
    }

    pub fn full_house(trips: Rank, pair: Rank) -> Result<Self, ClaimError> {
        Self::new(HandCategory::FullHouse, trips, Some(pair), None)
    }

    pub fn straight(high: Rank) -> Result<Self, ClaimError> {
        Self::new(HandCategory::Straight, high, None, None)
    }

    pub fn flush(suit: Suit, top: Rank) -> Self {
        Self { category: HandCategory::Flush, rank: top, second: None, suit: Some(suit) }
    }

    pub fn straight_flush(suit: Suit, high: Rank) -> Result<Self, ClaimError> {
        Self::new(HandCategory::StraightFlush, high, None, Some(suit))
    }

    pub fn royal_flush(suit: Suit) -> Self {
        Self { category: HandCategory::RoyalFlush, rank: Rank::Ace, second: None, suit: Some(suit) }
    }

    pub const fn category(&self) -> HandCategory {
        self.category
    }

    /// Primary rank: the counted rank, the trips of a full house, the higher
    /// pair, or the top card of a straight or flush.
    pub const fn rank(&self) -> Rank {
        self.rank
    }

    pub const fn second_rank(&self) -> Option<Rank> {
        self.second
    }

    pub const fn suit(&self) -> Option<Suit> {
        self.suit
    }

    pub const fn strength(&self) -> u8 {
        self.category.ordinal()
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suit = self.suit.map(|s| s.symbol()).unwrap_or('?');
        match (self.category, self.second) {
            (HandCategory::HighCard, _) => write!(f, "High Card {}", self.rank),
            (HandCategory::Pair, _) => write!(f, "Pair of {}s", self.rank),
            (HandCategory::ThreeOfAKind, _) => write!(f, "Three {}s", self.rank),
            (HandCategory::FourOfAKind, _) => write!(f, "Four {}s", self.rank),
            (HandCategory::TwoPair, Some(low)) => {
                write!(f, "Two Pair, {}s and {}s", self.rank, low)
            }
            (HandCategory::FullHouse, Some(pair)) => {
                write!(f, "Full House, {}s over {}s", self.rank, pair)
            }
            (HandCategory::Straight, _) => write!(f, "Straight to {}", self.rank),
            (HandCategory::Flush, _) => write!(f, "Flush {} {} high", suit, self.rank),
            (HandCategory::StraightFlush, _) => {
                write!(f, "Straight Flush {} to {}", suit, self.rank)
            }
            (HandCategory::RoyalFlush, _) => write!(f, "Royal Flush {}", suit),
            (c, None) => write!(f, "{} {}", c, self.rank),
        }
    }
}

/// A claim as it was made at the table: who said it and where they sit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimEntry {
    pub claim: Claim,
    pub seat: usize,
    pub player: String,
}
