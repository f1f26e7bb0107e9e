use bullshit_poker::cards::{parse_cards, Card, Rank, Suit};
use bullshit_poker::catalog::{all_claims, CATALOG_SIZE};
use bullshit_poker::claim::{Claim, HandCategory};
use bullshit_poker::evaluator::{evaluate_claim, is_escalation};
use proptest::prelude::*;

fn full_deck() -> Vec<Card> {
    Rank::ALL.iter().flat_map(|&r| Suit::ALL.iter().map(move |&s| Card::new(r, s))).collect()
}

fn any_cards(max: usize) -> impl Strategy<Value = Vec<Card>> {
    proptest::sample::subsequence(full_deck(), 0..=max)
}

fn any_claim() -> impl Strategy<Value = Claim> {
    (0..CATALOG_SIZE).prop_map(|i| all_claims()[i])
}

fn count_rank(cards: &[Card], rank: Rank) -> usize {
    cards.iter().filter(|c| c.rank() == rank).count()
}

fn run_present(cards: &[Card], high: Rank, suit: Option<Suit>) -> bool {
    (0..5).all(|d| {
        Rank::from_value(high.value() - d).is_some_and(|r| {
            cards.iter().any(|c| c.rank() == r && suit.map_or(true, |s| c.suit() == s))
        })
    })
}

/// Straightforward restatement of each category's rule over a card list.
fn holds_naively(claim: &Claim, cards: &[Card]) -> bool {
    let rank = claim.rank();
    match claim.category() {
        HandCategory::HighCard => count_rank(cards, rank) >= 1,
        HandCategory::Pair => count_rank(cards, rank) >= 2,
        HandCategory::ThreeOfAKind => count_rank(cards, rank) >= 3,
        HandCategory::FourOfAKind => count_rank(cards, rank) >= 4,
        HandCategory::TwoPair => {
            let second = claim.second_rank().unwrap();
            count_rank(cards, rank) >= 2 && count_rank(cards, second) >= 2
        }
        HandCategory::FullHouse => {
            let second = claim.second_rank().unwrap();
            count_rank(cards, rank) >= 3 && count_rank(cards, second) >= 2
        }
        HandCategory::Straight => run_present(cards, rank, None),
        HandCategory::Flush => {
            let suit = claim.suit().unwrap();
            let lower = cards.iter().filter(|c| c.suit() == suit && c.rank() < rank).count();
            cards.contains(&Card::new(rank, suit)) && lower >= 4
        }
        HandCategory::StraightFlush => run_present(cards, rank, claim.suit()),
        HandCategory::RoyalFlush => run_present(cards, Rank::Ace, claim.suit()),
    }
}

fn cards(s: &str) -> Vec<Card> {
    parse_cards(s).unwrap()
}

#[test]
fn no_wheel_straight() {
    let wheel = cards("As 2h 3d 4c 5s");
    assert!(Claim::straight(Rank::Four).is_err());
    // a five-high straight is claimable but the ace never plays low
    let five_high = Claim::straight(Rank::Five).unwrap();
    assert!(!evaluate_claim(&five_high, &full_deck()));
    assert!(all_claims().iter().filter(|c| c.category() == HandCategory::Straight).all(|c| {
        !evaluate_claim(c, &wheel)
    }));
    assert!(evaluate_claim(&Claim::straight(Rank::Six).unwrap(), &cards("2h 3d 4c 5s 6d")));
}

#[test]
fn flush_needs_four_lower_cards_of_the_suit() {
    let hearts = cards("3h 5h 7h 9h");
    assert!(!evaluate_claim(&Claim::flush(Suit::Hearts, Rank::Jack), &hearts));
    let mut with_top = hearts.clone();
    with_top.push(Card::new(Rank::Jack, Suit::Hearts));
    assert!(evaluate_claim(&Claim::flush(Suit::Hearts, Rank::Jack), &with_top));
    // lower cards of another suit do not count
    assert!(!evaluate_claim(&Claim::flush(Suit::Hearts, Rank::Jack), &cards("Jh 3h 5h 7h 9s")));
}

#[test]
fn empty_table_holds_nothing() {
    assert!(all_claims().iter().all(|c| !evaluate_claim(c, &[])));
}

#[test]
fn whole_deck_holds_everything_but_five_high_runs() {
    let deck = full_deck();
    for c in all_claims() {
        let five_high_run = c.rank() == Rank::Five
            && matches!(c.category(), HandCategory::Straight | HandCategory::StraightFlush);
        assert_eq!(evaluate_claim(c, &deck), !five_high_run, "{c}");
    }
}

#[test]
fn lower_flush_top_beats_higher() {
    let nine = Claim::flush(Suit::Clubs, Rank::Nine);
    let ace = Claim::flush(Suit::Clubs, Rank::Ace);
    assert!(is_escalation(&nine, Some(&ace)));
    assert!(!is_escalation(&ace, Some(&nine)));
    // suit is not compared
    assert!(!is_escalation(&Claim::flush(Suit::Spades, Rank::Ace), Some(&ace)));
    assert!(is_escalation(&Claim::full_house(Rank::Two, Rank::Three).unwrap(), Some(&nine)));
}

#[test]
fn royal_flush_cannot_be_topped() {
    let royal = Claim::royal_flush(Suit::Hearts);
    assert!(all_claims().iter().all(|c| !is_escalation(c, Some(&royal))));
}

proptest! {
    #[test]
    fn evaluator_agrees_with_naive_rules(claim in any_claim(), cards in any_cards(30)) {
        prop_assert_eq!(evaluate_claim(&claim, &cards), holds_naively(&claim, &cards));
    }

    #[test]
    fn more_cards_never_falsify_a_claim(
        claim in any_claim(),
        base in any_cards(15),
        extra in any_cards(15),
    ) {
        let mut more = base.clone();
        more.extend(extra.into_iter().filter(|c| !base.contains(c)));
        if evaluate_claim(&claim, &base) {
            prop_assert!(evaluate_claim(&claim, &more));
        }
    }

    #[test]
    fn card_order_does_not_matter(claim in any_claim(), cards in any_cards(20)) {
        let mut reversed = cards.clone();
        reversed.reverse();
        prop_assert_eq!(evaluate_claim(&claim, &cards), evaluate_claim(&claim, &reversed));
    }

    #[test]
    fn escalation_is_a_strict_order(a in any_claim(), b in any_claim(), c in any_claim()) {
        prop_assert!(is_escalation(&a, None));
        prop_assert!(!is_escalation(&a, Some(&a)));
        if is_escalation(&a, Some(&b)) {
            prop_assert!(!is_escalation(&b, Some(&a)));
        }
        if is_escalation(&a, Some(&b)) && is_escalation(&b, Some(&c)) {
            prop_assert!(is_escalation(&a, Some(&c)));
        }
    }

    #[test]
    fn stronger_category_always_escalates(a in any_claim(), b in any_claim()) {
        prop_assume!(a.category() != b.category());
        prop_assert_eq!(is_escalation(&a, Some(&b)), a.category() > b.category());
    }
}
