use crate::cards::{Card, Rank, Suit};

/// Rank and suit tallies over an arbitrary set of cards.
///
/// `ranks` is indexed by rank value (2-14); `suit_ranks` holds, per suit, a bit
/// for every rank value present in that suit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CardCounts {
    ranks: [u8; 15],
    suit_ranks: [u16; 4],
}

impl CardCounts {
    pub fn from_cards(cards: &[Card]) -> Self {
        let mut counts = Self::default();
        for c in cards {
            counts.add(*c);
        }
        counts
    }

    pub fn add(&mut self, card: Card) {
        self.ranks[card.rank().value() as usize] += 1;
        self.suit_ranks[card.suit().index()] |= 1 << card.rank().value();
    }

    /// How many cards of `rank` are present, any suit.
    pub fn rank_count(&self, rank: Rank) -> u8 {
        self.ranks[rank.value() as usize]
    }

    /// Whether `rank` is present in `suit`.
    pub fn has(&self, suit: Suit, rank: Rank) -> bool {
        self.suit_ranks[suit.index()] & (1 << rank.value()) != 0
    }

    pub fn suit_count(&self, suit: Suit) -> u32 {
        self.suit_ranks[suit.index()].count_ones()
    }

    /// Cards of `suit` ranked strictly below `rank`.
    pub fn suit_count_below(&self, suit: Suit, rank: Rank) -> u32 {
        let below = (1u16 << rank.value()) - 1;
        (self.suit_ranks[suit.index()] & below).count_ones()
    }

    /// Five consecutive rank values ending at `high`, each present in any suit.
    pub fn has_run_to(&self, high: Rank) -> bool {
        run_values(high).is_some_and(|mut vals| vals.all(|v| self.ranks[v as usize] > 0))
    }

    /// Five consecutive rank values ending at `high`, all in `suit`.
    pub fn has_suited_run_to(&self, suit: Suit, high: Rank) -> bool {
        let mask = self.suit_ranks[suit.index()];
        run_values(high).is_some_and(|mut vals| vals.all(|v| mask & (1 << v) != 0))
    }
}

/// Rank values of the run topped by `high`; `None` below a Five (no wheel).
fn run_values(high: Rank) -> Option<std::ops::RangeInclusive<u8>> {
    let top = high.value();
    (top >= 5).then(|| top - 4..=top)
}
