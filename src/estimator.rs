//! Monte Carlo estimate of how likely a claim is to be true, given one player's
//! own cards and how many cards are in play in total.

use crate::cards::Card;
use crate::claim::Claim;
use crate::deck::build_ordered_deck;
use crate::evaluator::{evaluate_claim, evaluate_counts, CardCounts};
use rand::seq::SliceRandom;
use rand::Rng;

/// Trials per estimate unless configured otherwise.
pub const DEFAULT_SAMPLES: usize = 120;

/// Fraction of `samples` random completions of `known` in which `claim` holds.
///
/// The hidden cards are drawn uniformly without replacement from the 52-card
/// universe minus `known`. With nothing hidden the answer is exact (0 or 1);
/// if more cards are hidden than the universe can supply, the claim is treated
/// as impossible. Pure apart from the RNG, so safe to run in parallel.
pub fn estimate_truth<R: Rng + ?Sized>(
    claim: &Claim,
    known: &[Card],
    total_in_play: usize,
    samples: usize,
    rng: &mut R,
) -> f64 {
    if total_in_play <= known.len() {
        return if evaluate_claim(claim, known) { 1.0 } else { 0.0 };
    }
    let unknown = total_in_play - known.len();
    let mut pool = unseen_cards(known);
    if unknown > pool.len() || samples == 0 {
        return 0.0;
    }

    let base = CardCounts::from_cards(known);
    let mut hits = 0usize;
    for _ in 0..samples {
        let (drawn, _) = pool.partial_shuffle(rng, unknown);
        let mut counts = base;
        for c in drawn.iter() {
            counts.add(*c);
        }
        if evaluate_counts(claim, &counts) {
            hits += 1;
        }
    }
    hits as f64 / samples as f64
}

/// The 52-card universe minus `known`.
fn unseen_cards(known: &[Card]) -> Vec<Card> {
    let mut held = [false; 52];
    for c in known {
        held[c.index()] = true;
    }
    build_ordered_deck()
        .map(|d| d.cards().iter().copied().filter(|c| !held[c.index()]).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{parse_cards, Rank, Suit};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(11)
    }

    #[test]
    fn nothing_hidden_is_exact() {
        let known = parse_cards("5s 5h").unwrap();
        assert_eq!(estimate_truth(&Claim::pair(Rank::Five), &known, 2, 120, &mut rng()), 1.0);
        assert_eq!(estimate_truth(&Claim::pair(Rank::Six), &known, 2, 120, &mut rng()), 0.0);
    }

    #[test]
    fn held_claim_is_certain_with_hidden_cards() {
        let known = parse_cards("Ks").unwrap();
        let p = estimate_truth(&Claim::high_card(Rank::King), &known, 8, 120, &mut rng());
        assert_eq!(p, 1.0);
    }

    #[test]
    fn impossible_claim_is_zero() {
        let known = parse_cards("2s").unwrap();
        let p = estimate_truth(&Claim::royal_flush(Suit::Hearts), &known, 3, 120, &mut rng());
        assert_eq!(p, 0.0);
    }

    #[test]
    fn too_many_hidden_is_zero() {
        let known = parse_cards("2s").unwrap();
        assert_eq!(estimate_truth(&Claim::high_card(Rank::Two), &known, 60, 50, &mut rng()), 0.0);
    }

    #[test]
    fn estimate_is_a_probability_and_tracks_likelihood() {
        let known = parse_cards("9d").unwrap();
        let mut r = rng();
        let single = estimate_truth(&Claim::high_card(Rank::Ace), &known, 20, 400, &mut r);
        let quads = estimate_truth(&Claim::four_of_a_kind(Rank::Ace), &known, 20, 400, &mut r);
        assert!((0.0..=1.0).contains(&single));
        assert!(single > quads);
        assert!(single > 0.5, "19 unseen cards nearly always include an ace: {single}");
    }

    #[test]
    fn unseen_excludes_known() {
        let known = parse_cards("As Kd").unwrap();
        let pool = unseen_cards(&known);
        assert_eq!(pool.len(), 50);
        assert!(!pool.contains(&known[0]));
    }
}
