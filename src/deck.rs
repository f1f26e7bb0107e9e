use crate::cards::{Card, Rank, Suit};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Number of distinct card identities in a deck.
pub const DECK_SIZE: usize = 52;

/// Broken invariants on cards in play. These point at a logic defect, never at a
/// user mistake, and are not recovered from silently.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IntegrityError {
    #[error("card {0} appears more than once")]
    DuplicateCard(Card),
    #[error("deck holds {len} cards, expected {expected}")]
    DeckSize { len: usize, expected: usize },
    #[error("deck exhausted: needed {needed} cards, {available} left")]
    DeckExhausted { needed: usize, available: usize },
    #[error("seat {seat} holds {held} cards but has penalty count {expected}")]
    HandSize { seat: usize, held: usize, expected: usize },
    #[error("eliminated seat {seat} still holds cards")]
    EliminatedHolding { seat: usize },
    #[error("{in_play} cards in play but active hands hold {in_hands}")]
    CardsInPlay { in_play: usize, in_hands: usize },
    #[error("hands and deck hold {accounted} cards, expected {expected}")]
    Unaccounted { accounted: usize, expected: usize },
    #[error("seat {seat} has penalty count {penalty_count} but eliminated is {eliminated}")]
    PenaltyState { seat: usize, penalty_count: u8, eliminated: bool },
}

/// Fail on the first card identity seen twice.
pub fn verify_unique<'a, I>(cards: I) -> Result<(), IntegrityError>
where
    I: IntoIterator<Item = &'a Card>,
{
    let mut seen = [false; DECK_SIZE];
    for card in cards {
        let slot = &mut seen[card.index()];
        if *slot {
            return Err(IntegrityError::DuplicateCard(*card));
        }
        *slot = true;
    }
    Ok(())
}

/// A 52-card deck, or what is left of one after dealing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Deck {
    cards: Vec<Card>,
}

/// All 52 cards in table order (♠ ♥ ♦ ♣, Two..Ace), verified unique.
///
/// ```
/// use bullshit_poker::deck::build_ordered_deck;
///
/// let deck = build_ordered_deck().unwrap();
/// assert_eq!(deck.len(), 52);
/// ```
pub fn build_ordered_deck() -> Result<Deck, IntegrityError> {
    let mut cards = Vec::with_capacity(DECK_SIZE);
    for s in Suit::ALL {
        for r in Rank::ALL {
            cards.push(Card::new(r, s));
        }
    }
    let deck = Deck { cards };
    deck.verify()?;
    Ok(deck)
}

impl Deck {
    /// Wrap an explicit card list (e.g. a restored remainder); checks uniqueness.
    pub fn from_cards(cards: Vec<Card>) -> Result<Self, IntegrityError> {
        verify_unique(&cards)?;
        Ok(Self { cards })
    }

    /// A full deck shuffled with the provided RNG.
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Result<Self, IntegrityError> {
        let mut deck = build_ordered_deck()?;
        deck.shuffle_with(rng);
        Ok(deck)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// A full deck must hold exactly 52 distinct identities.
    pub fn verify(&self) -> Result<(), IntegrityError> {
        if self.cards.len() != DECK_SIZE {
            return Err(IntegrityError::DeckSize { len: self.cards.len(), expected: DECK_SIZE });
        }
        verify_unique(&self.cards)
    }

    /// Shuffle using a seeded RNG for reproducibility.
    pub fn shuffle_seeded(&mut self, seed: u64) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.cards.shuffle(&mut rng);
    }

    /// Uniform Fisher–Yates shuffle with the provided RNG.
    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// Draw one card from the top of the deck.
    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// Draw exactly `n` cards from the top, or fail without consuming any.
    pub fn draw_n(&mut self, n: usize) -> Result<Vec<Card>, IntegrityError> {
        if n > self.cards.len() {
            return Err(IntegrityError::DeckExhausted { needed: n, available: self.cards.len() });
        }
        let at = self.cards.len() - n;
        let mut drawn = self.cards.split_off(at);
        drawn.reverse();
        Ok(drawn)
    }

    /// Deal one hand per seat in table order; `sizes[i]` is the card count for
    /// seat `i` (0 for eliminated seats). All-or-nothing: on shortage nothing is
    /// dealt. The remainder stays in the deck.
    pub fn deal_penalty_hands(
        &mut self,
        sizes: &[usize],
    ) -> Result<Vec<Vec<Card>>, IntegrityError> {
        let needed: usize = sizes.iter().sum();
        if needed > self.cards.len() {
            return Err(IntegrityError::DeckExhausted { needed, available: self.cards.len() });
        }
        let mut hands = Vec::with_capacity(sizes.len());
        for &n in sizes {
            hands.push(self.draw_n(n)?);
        }
        Ok(hands)
    }
}
