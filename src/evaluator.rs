//! Claim truth and claim ordering.
//!
//! Both functions are pure: identical inputs always give identical answers.

pub(crate) mod card_counts;

pub use card_counts::CardCounts;

use crate::cards::{Card, Rank};
use crate::claim::{Claim, HandCategory};

/// Is `claim` a legal follow-up to `previous`?
///
/// Higher categories always escalate. Within a category the primary rank must
/// rise, except Flush, where a *lower* top card is the stricter claim, and
/// Royal Flush, which can never be topped.
///
/// ```
/// use bullshit_poker::cards::{Rank, Suit};
/// use bullshit_poker::claim::Claim;
/// use bullshit_poker::evaluator::is_escalation;
///
/// let q = Claim::flush(Suit::Spades, Rank::Queen);
/// let nine = Claim::flush(Suit::Spades, Rank::Nine);
/// assert!(is_escalation(&nine, Some(&q)));
/// assert!(!is_escalation(&q, Some(&nine)));
/// ```
pub fn is_escalation(claim: &Claim, previous: Option<&Claim>) -> bool {
    let Some(prev) = previous else {
        return true;
    };
    if claim.category() != prev.category() {
        return claim.strength() > prev.strength();
    }
    match claim.category() {
        HandCategory::Flush => claim.rank() < prev.rank(),
        HandCategory::RoyalFlush => false,
        _ => claim.rank() > prev.rank(),
    }
}

/// Does `claim` hold among `cards`?
///
/// Flush uses the table's relaxed rule: the claimed top card must be present
/// in the suit with at least four lower cards of that suit; higher cards of the
/// suit do not matter.
pub fn evaluate_claim(claim: &Claim, cards: &[Card]) -> bool {
    evaluate_counts(claim, &CardCounts::from_cards(cards))
}

/// [`evaluate_claim`] against a precomputed tally.
pub fn evaluate_counts(claim: &Claim, counts: &CardCounts) -> bool {
    let rank = claim.rank();
    let at_least = |r: Rank, n: u8| counts.rank_count(r) >= n;
    match claim.category() {
        HandCategory::HighCard => at_least(rank, 1),
        HandCategory::Pair => at_least(rank, 2),
        HandCategory::ThreeOfAKind => at_least(rank, 3),
        HandCategory::FourOfAKind => at_least(rank, 4),
        HandCategory::TwoPair => {
            at_least(rank, 2) && claim.second_rank().is_some_and(|r| at_least(r, 2))
        }
        HandCategory::FullHouse => {
            at_least(rank, 3) && claim.second_rank().is_some_and(|r| at_least(r, 2))
        }
        HandCategory::Straight => counts.has_run_to(rank),
        HandCategory::Flush => claim.suit().is_some_and(|s| {
            counts.suit_count(s) >= 5
                && counts.has(s, rank)
                && counts.suit_count_below(s, rank) >= 4
        }),
        HandCategory::StraightFlush => {
            claim.suit().is_some_and(|s| counts.has_suited_run_to(s, rank))
        }
        HandCategory::RoyalFlush => {
            claim.suit().is_some_and(|s| counts.has_suited_run_to(s, Rank::Ace))
        }
    }
}

/// Comma-separated card list, e.g. `"5♠, 5♥, 9♦"`.
pub fn describe_cards(cards: &[Card]) -> String {
    cards.iter().map(Card::to_string).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{parse_cards, Suit};

    fn cards(s: &str) -> Vec<Card> {
        parse_cards(s).unwrap()
    }

    #[test]
    fn counted_categories() {
        let cs = cards("5s 5h 5d 9c 9h 2c");
        assert!(evaluate_claim(&Claim::high_card(Rank::Two), &cs));
        assert!(!evaluate_claim(&Claim::high_card(Rank::Ace), &cs));
        assert!(evaluate_claim(&Claim::pair(Rank::Nine), &cs));
        assert!(evaluate_claim(&Claim::three_of_a_kind(Rank::Five), &cs));
        assert!(!evaluate_claim(&Claim::four_of_a_kind(Rank::Five), &cs));
        assert!(evaluate_claim(&Claim::full_house(Rank::Five, Rank::Nine).unwrap(), &cs));
        assert!(!evaluate_claim(&Claim::full_house(Rank::Nine, Rank::Five).unwrap(), &cs));
        assert!(evaluate_claim(&Claim::two_pair(Rank::Five, Rank::Nine).unwrap(), &cs));
    }

    #[test]
    fn pair_plus_pair_is_not_a_full_house() {
        let cs = cards("5♠ 5♥ 9♦ 9♣ 2♣");
        assert!(!evaluate_claim(&Claim::full_house(Rank::Five, Rank::Nine).unwrap(), &cs));
        assert!(evaluate_claim(&Claim::two_pair(Rank::Nine, Rank::Five).unwrap(), &cs));
    }

    #[test]
    fn straight_any_suits() {
        let cs = cards("6s 7h 8d 9c 10s");
        assert!(evaluate_claim(&Claim::straight(Rank::Ten).unwrap(), &cs));
        assert!(!evaluate_claim(&Claim::straight(Rank::Jack).unwrap(), &cs));
    }

    #[test]
    fn relaxed_flush_rule() {
        // Q with four lower spades; the K above does not spoil it
        let cs = cards("Ks Qs 10s 8s 5s 2s");
        assert!(evaluate_claim(&Claim::flush(Suit::Spades, Rank::Queen), &cs));
        assert!(evaluate_claim(&Claim::flush(Suit::Spades, Rank::King), &cs));
        // 8 has only two lower spades
        assert!(!evaluate_claim(&Claim::flush(Suit::Spades, Rank::Eight), &cs));
        // top card must itself be present
        assert!(!evaluate_claim(&Claim::flush(Suit::Spades, Rank::Jack), &cs));
        assert!(!evaluate_claim(&Claim::flush(Suit::Hearts, Rank::Queen), &cs));
    }

    #[test]
    fn straight_and_royal_flush() {
        let cs = cards("10h Jh Qh Kh Ah 9h");
        assert!(evaluate_claim(&Claim::royal_flush(Suit::Hearts), &cs));
        assert!(evaluate_claim(&Claim::straight_flush(Suit::Hearts, Rank::King).unwrap(), &cs));
        assert!(!evaluate_claim(&Claim::royal_flush(Suit::Spades), &cs));
    }

    #[test]
    fn escalation_rules() {
        let p5 = Claim::pair(Rank::Five);
        let p6 = Claim::pair(Rank::Six);
        let p4 = Claim::pair(Rank::Four);
        assert!(is_escalation(&p6, Some(&p5)));
        assert!(!is_escalation(&p4, Some(&p5)));
        assert!(!is_escalation(&p5, Some(&p5)));
        assert!(is_escalation(&Claim::high_card(Rank::Two), None));
        assert!(is_escalation(&Claim::two_pair(Rank::Two, Rank::Three).unwrap(), Some(&p6)));
        assert!(!is_escalation(&Claim::high_card(Rank::Ace), Some(&p5)));

        let s9 = Claim::straight(Rank::Nine).unwrap();
        let s8 = Claim::straight(Rank::Eight).unwrap();
        assert!(is_escalation(&s9, Some(&s8)));
        assert!(!is_escalation(&s8, Some(&s9)));

        let rf = Claim::royal_flush(Suit::Clubs);
        assert!(!is_escalation(&Claim::royal_flush(Suit::Spades), Some(&rf)));
    }

    #[test]
    fn secondary_rank_is_not_compared() {
        let a = Claim::full_house(Rank::Nine, Rank::Two).unwrap();
        let b = Claim::full_house(Rank::Nine, Rank::King).unwrap();
        assert!(!is_escalation(&b, Some(&a)));
    }

    #[test]
    fn describes_cards() {
        assert_eq!(describe_cards(&cards("5s 10h")), "5♠, 10♥");
        assert_eq!(describe_cards(&[]), "");
    }
}
