//! The finite catalog of every distinct legal claim, built once.

use crate::cards::{Rank, Suit};
use crate::claim::Claim;
use crate::evaluator::is_escalation;
use std::sync::OnceLock;

/// Size of the catalog: 4×13 counted + 78 two pair + 156 full house + 10
/// straights + 52 flushes + 40 straight flushes + 4 royals.
pub const CATALOG_SIZE: usize = 392;

static CATALOG: OnceLock<Vec<Claim>> = OnceLock::new();

/// Every legal claim, grouped by category in strength order.
pub fn all_claims() -> &'static [Claim] {
    CATALOG.get_or_init(build_catalog)
}

/// Catalog entries that legally follow `previous`.
pub fn escalations_of(previous: Option<&Claim>) -> impl Iterator<Item = &'static Claim> + '_ {
    all_claims().iter().filter(move |c| is_escalation(c, previous))
}

fn build_catalog() -> Vec<Claim> {
    let mut claims = Vec::with_capacity(CATALOG_SIZE);

    claims.extend(Rank::ALL.iter().map(|&r| Claim::high_card(r)));
    claims.extend(Rank::ALL.iter().map(|&r| Claim::pair(r)));

    for (i, &high) in Rank::ALL.iter().enumerate() {
        for &low in &Rank::ALL[..i] {
            claims.extend(Claim::two_pair(high, low));
        }
    }

    claims.extend(Rank::ALL.iter().map(|&r| Claim::three_of_a_kind(r)));
    claims.extend(Rank::ALL.iter().filter_map(|&r| Claim::straight(r).ok()));

    for s in Suit::ALL {
        claims.extend(Rank::ALL.iter().map(|&r| Claim::flush(s, r)));
    }

    for &trips in &Rank::ALL {
        for &pair in &Rank::ALL {
            claims.extend(Claim::full_house(trips, pair));
        }
    }

    claims.extend(Rank::ALL.iter().map(|&r| Claim::four_of_a_kind(r)));

    for s in Suit::ALL {
        claims.extend(Rank::ALL.iter().filter_map(|&r| Claim::straight_flush(s, r).ok()));
    }

    claims.extend(Suit::ALL.iter().map(|&s| Claim::royal_flush(s)));

    claims
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::HandCategory;
    use std::collections::HashSet;

    fn count(cat: HandCategory) -> usize {
        all_claims().iter().filter(|c| c.category() == cat).count()
    }

    #[test]
    fn catalog_has_expected_sizes() {
        assert_eq!(all_claims().len(), CATALOG_SIZE);
        assert_eq!(count(HandCategory::HighCard), 13);
        assert_eq!(count(HandCategory::Pair), 13);
        assert_eq!(count(HandCategory::TwoPair), 78);
        assert_eq!(count(HandCategory::ThreeOfAKind), 13);
        assert_eq!(count(HandCategory::Straight), 10);
        assert_eq!(count(HandCategory::Flush), 52);
        assert_eq!(count(HandCategory::FullHouse), 156);
        assert_eq!(count(HandCategory::FourOfAKind), 13);
        assert_eq!(count(HandCategory::StraightFlush), 40);
        assert_eq!(count(HandCategory::RoyalFlush), 4);
    }

    #[test]
    fn catalog_entries_are_distinct_and_valid() {
        let set: HashSet<&Claim> = all_claims().iter().collect();
        assert_eq!(set.len(), CATALOG_SIZE);
        for c in all_claims() {
            assert_eq!(c.validated().as_ref(), Ok(c));
        }
    }

    #[test]
    fn two_pair_primary_is_higher() {
        for c in all_claims().iter().filter(|c| c.category() == HandCategory::TwoPair) {
            assert!(c.second_rank().is_some_and(|low| low < c.rank()));
        }
    }

    #[test]
    fn escalations_shrink_as_claims_rise() {
        assert_eq!(escalations_of(None).count(), CATALOG_SIZE);
        let after_pair = escalations_of(Some(&Claim::pair(Rank::Ace))).count();
        assert_eq!(after_pair, CATALOG_SIZE - 26);
        assert_eq!(escalations_of(Some(&Claim::royal_flush(Suit::Spades))).count(), 0);
    }
}
