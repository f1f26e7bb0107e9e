use crate::catalog::escalations_of;
use crate::claim::{Claim, HandCategory};
use crate::engine::Intent;
use crate::estimator::{estimate_truth, DEFAULT_SAMPLES};
use crate::snapshot::GameView;
use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::debug;

use super::{AgentKind, PlayerAgent};

/// Difficulty tiers: how carefully a bot samples and how much it wobbles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Every constant of the decision heuristic. `Default` is the Medium table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotWeights {
    /// Challenge outright when the standing claim is less likely than this...
    pub challenge_below: f64,
    /// ...minus this much per unit of risk.
    pub challenge_risk_discount: f64,
    pub truth_weight: f64,
    pub category_weight: f64,
    /// Flush penalty per step below Ace (`15 - rank`).
    pub flush_rank_weight: f64,
    pub straight_rank_weight: f64,
    pub rank_weight: f64,
    /// Upper bound of the uniform score jitter.
    pub noise: f64,
    pub hopeless_below: f64,
    /// Tried before the doubtful roll, never together with it: a hopeless best
    /// claim is challenged at exactly this rate.
    pub hopeless_challenge_chance: f64,
    pub doubtful_below: f64,
    pub doubtful_risk_bonus: f64,
    pub doubtful_challenge_chance: f64,
}

impl Default for BotWeights {
    fn default() -> Self {
        Self {
            challenge_below: 0.28,
            challenge_risk_discount: 0.08,
            truth_weight: 100.0,
            category_weight: 3.0,
            flush_rank_weight: 0.3,
            straight_rank_weight: 0.25,
            rank_weight: 0.2,
            noise: 2.0,
            hopeless_below: 0.18,
            hopeless_challenge_chance: 0.6,
            doubtful_below: 0.45,
            doubtful_risk_bonus: 0.08,
            doubtful_challenge_chance: 0.3,
        }
    }
}

impl BotWeights {
    /// Score handicap for claiming `claim`: higher claims cost more.
    fn rank_penalty(&self, claim: &Claim) -> f64 {
        let v = f64::from(claim.rank().value());
        match claim.category() {
            HandCategory::Flush => self.flush_rank_weight * (15.0 - v),
            HandCategory::Straight | HandCategory::StraightFlush => self.straight_rank_weight * v,
            _ => self.rank_weight * v,
        }
    }
}

/// Configuration for a bot's play style and randomness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct BotProfile {
    pub difficulty: Difficulty,
    pub weights: BotWeights,
    /// Monte Carlo trials per probability estimate.
    pub samples: usize,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    pub rng_seed: Option<u64>,
}

impl BotProfile {
    /// Create a profile with tuned defaults for a difficulty tier.
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        let base = BotWeights::default();
        let (weights, samples) = match difficulty {
            Difficulty::Easy => (
                BotWeights {
                    noise: 12.0,
                    challenge_below: 0.2,
                    doubtful_challenge_chance: 0.15,
                    ..base
                },
                40,
            ),
            Difficulty::Medium => (base, DEFAULT_SAMPLES),
            Difficulty::Hard => (
                BotWeights {
                    noise: 0.5,
                    challenge_below: 0.32,
                    hopeless_challenge_chance: 0.75,
                    ..base
                },
                300,
            ),
        };
        Self { difficulty, weights, samples, min_delay_ms: 900, max_delay_ms: 2000, rng_seed: None }
    }

    /// Set a deterministic RNG seed for reproducible decisions.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Thinking delay range in milliseconds; `0, 0` acts at once.
    pub fn with_delay(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.min_delay_ms = min_ms;
        self.max_delay_ms = max_ms;
        self
    }
}

impl Default for BotProfile {
    fn default() -> Self {
        Self::for_difficulty(Difficulty::Medium)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BotDecision {
    pub intent: Intent,
    /// Estimated truth of the claim that drove the decision.
    pub probability: f64,
    pub reason: &'static str,
}

impl BotDecision {
    fn challenge(probability: f64, reason: &'static str) -> Self {
        Self { intent: Intent::Challenge, probability, reason }
    }
}

/// Pick a move for the viewer of `view`.
///
/// Challenges a standing claim that looks false, otherwise scores every legal
/// escalation by estimated truth against how cheaply it raises the stakes, and
/// may still fall back to a challenge when even the best claim looks weak.
/// Returns `None` only when there is nothing to do.
pub fn choose_action<R: Rng + ?Sized>(
    view: &GameView,
    profile: &BotProfile,
    rng: &mut R,
) -> Option<BotDecision> {
    let me = view.me()?;
    let w = &profile.weights;
    let hand = view.own_hand();
    let total = view.cards_in_play;
    let risk = ((f64::from(me.penalty_count) - 1.0) / 4.0).clamp(0.0, 1.0);
    let standing = view.current_claim.as_ref().map(|e| e.claim);
    let can_challenge = view.legal.challenge;

    if let (Some(claim), true) = (standing, can_challenge) {
        let p = estimate_truth(&claim, hand, total, profile.samples, rng);
        if p < w.challenge_below - risk * w.challenge_risk_discount {
            return Some(BotDecision::challenge(p, "standing claim looks false"));
        }
    }

    if view.legal.claim.is_none() {
        return can_challenge.then(|| BotDecision::challenge(0.0, "no claim available"));
    }

    let mut best: Option<(Claim, f64, f64)> = None;
    for candidate in escalations_of(standing.as_ref()) {
        let p = estimate_truth(candidate, hand, total, profile.samples, rng);
        let score = w.truth_weight * p
            - w.category_weight * f64::from(candidate.strength())
            - w.rank_penalty(candidate)
            + rng.random_range(0.0..=w.noise.max(0.0));
        match best {
            Some((_, _, top)) if score <= top => {}
            _ => best = Some((*candidate, p, score)),
        }
    }

    let Some((claim, p, _)) = best else {
        return can_challenge
            .then(|| BotDecision::challenge(0.0, "nothing beats the standing claim"));
    };

    if standing.is_some() && can_challenge {
        if p < w.hopeless_below {
            if rng.random_bool(w.hopeless_challenge_chance.clamp(0.0, 1.0)) {
                return Some(BotDecision::challenge(p, "best claim is hopeless"));
            }
        } else if p < w.doubtful_below + risk * w.doubtful_risk_bonus
            && rng.random_bool(w.doubtful_challenge_chance.clamp(0.0, 1.0))
        {
            return Some(BotDecision::challenge(p, "best claim is doubtful"));
        }
    }

    Some(BotDecision { intent: Intent::Claim(claim), probability: p, reason: "best scoring claim" })
}

/// A bot that plays `choose_action` on its own turn.
pub struct BotAgent {
    profile: BotProfile,
    rng: StdRng,
}

impl BotAgent {
    pub fn new(profile: BotProfile) -> Self {
        let rng = match profile.rng_seed {
            Some(v) => StdRng::seed_from_u64(v),
            None => {
                let mut seed = [0u8; 32];
                rand::rng().fill_bytes(&mut seed);
                StdRng::from_seed(seed)
            }
        };
        Self { profile, rng }
    }

    pub fn profile(&self) -> &BotProfile {
        &self.profile
    }
}

impl PlayerAgent for BotAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Bot
    }

    fn decide(&mut self, view: &GameView) -> Option<Intent> {
        if !view.is_my_turn() {
            return None;
        }
        let decision = choose_action(view, &self.profile, &mut self.rng)?;
        debug!(
            seat = ?view.viewer,
            intent = ?decision.intent,
            probability = decision.probability,
            reason = decision.reason,
            "bot decided"
        );
        Some(decision.intent)
    }

    fn thinking_delay(&mut self) -> Duration {
        let min = self.profile.min_delay_ms;
        let max = self.profile.max_delay_ms.max(min);
        let ms = if max == min { min } else { self.rng.random_range(min..=max) };
        Duration::from_millis(ms)
    }
}
