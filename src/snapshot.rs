//! What leaves the authoritative [`Game`]: the full persistable snapshot and
//! the per-viewer view with other players' hands withheld.

use crate::cards::Card;
use crate::catalog::{all_claims, escalations_of};
use crate::claim::ClaimEntry;
use crate::config::{ConfigError, TableConfig};
use crate::deck::{build_ordered_deck, verify_unique, Deck, IntegrityError};
use crate::game::{Game, Phase, Player, RoundResult};
use crate::lobby::PlayerId;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum SnapshotError {
    #[error("snapshot json: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Integrity(#[from] IntegrityError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("inconsistent snapshot: {0}")]
    Invalid(String),
}

/// Full authoritative state, minus the RNG. The deadline is kept relative so a
/// snapshot can be restored on another clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub version: u64,
    pub config: TableConfig,
    pub host: Option<PlayerId>,
    pub players: Vec<Player>,
    pub round: u32,
    pub opener: usize,
    pub turn: usize,
    pub current_claim: Option<ClaimEntry>,
    pub history: Vec<ClaimEntry>,
    pub deck: Deck,
    pub turn_remaining_ms: Option<u64>,
    pub winner: Option<usize>,
    pub last_result: Option<RoundResult>,
}

impl GameSnapshot {
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(input: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Replace every hand, seat by seat, and rebuild the deck from the cards
    /// left over. Penalty counts follow the new hand sizes; eliminated seats
    /// must be given no cards. Used for scripted deals; [`Game::restore`]
    /// still checks the result.
    pub fn with_hands(mut self, hands: &[Vec<Card>]) -> Result<Self, SnapshotError> {
        if hands.len() != self.players.len() {
            return Err(SnapshotError::Invalid(format!(
                "{} hands for {} players",
                hands.len(),
                self.players.len()
            )));
        }
        for (p, hand) in self.players.iter_mut().zip(hands) {
            if p.eliminated {
                if !hand.is_empty() {
                    return Err(SnapshotError::Invalid(format!("cards for eliminated {}", p.name)));
                }
                continue;
            }
            p.penalty_count = u8::try_from(hand.len())
                .map_err(|_| SnapshotError::Invalid(format!("hand of {} cards", hand.len())))?;
            p.hand = hand.clone();
        }
        let held: Vec<Card> = hands.iter().flatten().copied().collect();
        verify_unique(&held)?;
        let full = build_ordered_deck()?;
        let rest = full.cards().iter().copied().filter(|c| !held.contains(c)).collect();
        self.deck = Deck::from_cards(rest)?;
        Ok(self)
    }
}

/// How the viewer may claim right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimMode {
    /// First claim of the round; anything goes.
    Open,
    /// Must beat the outstanding claim.
    Escalate,
    /// Back at the opener: any claim, judged immediately.
    Close,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalActions {
    pub claim: Option<ClaimMode>,
    pub challenge: bool,
    /// Catalog entries the viewer could claim.
    pub escalations: usize,
}

impl LegalActions {
    pub fn any(&self) -> bool {
        self.claim.is_some() || self.challenge
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub seat: usize,
    pub id: PlayerId,
    pub name: String,
    pub is_bot: bool,
    pub is_host: bool,
    pub card_count: usize,
    pub penalty_count: u8,
    pub eliminated: bool,
    /// Only populated for the viewer.
    pub hand: Option<Vec<Card>>,
}

/// One player's picture of the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    pub viewer: Option<usize>,
    pub version: u64,
    pub round: u32,
    pub phase: Phase,
    pub opener: usize,
    pub turn: usize,
    pub penalty_limit: u8,
    pub players: Vec<PlayerView>,
    pub current_claim: Option<ClaimEntry>,
    pub history: Vec<ClaimEntry>,
    pub cards_in_play: usize,
    pub turn_remaining_ms: Option<u64>,
    pub winner: Option<usize>,
    pub last_result: Option<RoundResult>,
    pub legal: LegalActions,
}

impl GameView {
    pub fn me(&self) -> Option<&PlayerView> {
        self.viewer.and_then(|s| self.players.get(s))
    }

    pub fn own_hand(&self) -> &[Card] {
        self.me().and_then(|p| p.hand.as_deref()).unwrap_or(&[])
    }

    pub fn is_my_turn(&self) -> bool {
        self.phase != Phase::GameOver && self.viewer == Some(self.turn)
    }

    pub fn turn_remaining(&self) -> Option<Duration> {
        self.turn_remaining_ms.map(Duration::from_millis)
    }
}

impl Game {
    pub fn snapshot(&self, now: Instant) -> GameSnapshot {
        GameSnapshot {
            version: self.version,
            config: self.config,
            host: self.host.clone(),
            players: self.players.clone(),
            round: self.round,
            opener: self.opener,
            turn: self.turn,
            current_claim: self.current_claim.clone(),
            history: self.history.clone(),
            deck: self.deck.clone(),
            turn_remaining_ms: self.remaining_ms(now),
            winner: self.winner,
            last_result: self.last_result.clone(),
        }
    }

    /// Rebuild a game from a snapshot, re-checking every card invariant.
    /// Without a seed, future shuffles are seeded from the thread RNG.
    pub fn restore(
        snapshot: GameSnapshot,
        seed: Option<u64>,
        now: Instant,
    ) -> Result<Self, SnapshotError> {
        snapshot.config.validate()?;
        let n = snapshot.players.len();
        if n < 2 {
            return Err(SnapshotError::Invalid(format!("{n} players")));
        }
        for (what, seat) in [("opener", snapshot.opener), ("turn", snapshot.turn)] {
            if seat >= n {
                return Err(SnapshotError::Invalid(format!("{what} seat {seat} out of range")));
            }
        }
        if let Some(entry) = &snapshot.current_claim {
            if entry.seat >= n {
                return Err(SnapshotError::Invalid(format!("claim by unknown seat {}", entry.seat)));
            }
        }
        if snapshot.winner.is_some_and(|w| w >= n) {
            return Err(SnapshotError::Invalid("winner out of range".into()));
        }
        let active: Vec<usize> = snapshot
            .players
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.eliminated)
            .map(|(seat, _)| seat)
            .collect();
        match snapshot.winner {
            Some(w) if active != [w] => {
                return Err(SnapshotError::Invalid(format!(
                    "winner {w} is not the last player standing"
                )));
            }
            None if active.len() < 2 => {
                return Err(SnapshotError::Invalid(format!(
                    "{} active players and no winner",
                    active.len()
                )));
            }
            _ => {}
        }
        if snapshot.winner.is_none() {
            let author = snapshot.current_claim.as_ref().map(|e| e.seat);
            let seats = [
                ("opener", Some(snapshot.opener)),
                ("turn", Some(snapshot.turn)),
                ("claim", author),
            ];
            for (what, seat) in seats {
                if let Some(seat) = seat.filter(|s| snapshot.players[*s].eliminated) {
                    return Err(SnapshotError::Invalid(format!("{what} seat {seat} is eliminated")));
                }
            }
        }

        let seed = seed.unwrap_or_else(|| rand::rng().random());
        let cards_in_play =
            snapshot.players.iter().filter(|p| !p.eliminated).map(|p| p.hand.len()).sum();
        let turn_deadline = match snapshot.winner {
            Some(_) => None,
            None => Some(
                now + snapshot
                    .turn_remaining_ms
                    .map(Duration::from_millis)
                    .unwrap_or_else(|| snapshot.config.turn_time_limit()),
            ),
        };
        let game = Game {
            config: snapshot.config,
            host: snapshot.host,
            players: snapshot.players,
            round: snapshot.round,
            opener: snapshot.opener,
            turn: snapshot.turn,
            current_claim: snapshot.current_claim,
            history: snapshot.history,
            deck: snapshot.deck,
            cards_in_play,
            turn_deadline,
            winner: snapshot.winner,
            last_result: snapshot.last_result,
            version: snapshot.version,
            rng: ChaCha8Rng::seed_from_u64(seed),
        };
        game.check_integrity()?;
        Ok(game)
    }

    /// What `seat` may do right now. Empty for spectators, eliminated players
    /// and finished games.
    pub fn legal_actions(&self, seat: usize) -> LegalActions {
        let active = self.players.get(seat).is_some_and(|p| !p.eliminated);
        if self.is_over() || !active {
            return LegalActions::default();
        }
        let current = self.current_claim.as_ref();
        let challenge = current.is_some_and(|e| e.seat != seat);
        let (claim, escalations) = if seat != self.turn {
            (None, 0)
        } else {
            match current {
                None => (Some(ClaimMode::Open), all_claims().len()),
                Some(_) if seat == self.opener => (Some(ClaimMode::Close), all_claims().len()),
                Some(e) => {
                    let n = escalations_of(Some(&e.claim)).count();
                    ((n > 0).then_some(ClaimMode::Escalate), n)
                }
            }
        };
        LegalActions { claim, challenge, escalations }
    }

    /// The table as `viewer` may see it; `None` views as a spectator.
    pub fn view_for(&self, viewer: Option<usize>, now: Instant) -> GameView {
        let players = self
            .players
            .iter()
            .enumerate()
            .map(|(seat, p)| PlayerView {
                seat,
                id: p.id.clone(),
                name: p.name.clone(),
                is_bot: p.is_bot,
                is_host: self.host.as_ref() == Some(&p.id),
                card_count: p.hand.len(),
                penalty_count: p.penalty_count,
                eliminated: p.eliminated,
                hand: (viewer == Some(seat)).then(|| p.hand.clone()),
            })
            .collect();
        GameView {
            viewer,
            version: self.version,
            round: self.round,
            phase: self.phase(),
            opener: self.opener,
            turn: self.turn,
            penalty_limit: self.config.penalty_limit,
            players,
            current_claim: self.current_claim.clone(),
            history: self.history.clone(),
            cards_in_play: self.cards_in_play,
            turn_remaining_ms: self.remaining_ms(now),
            winner: self.winner,
            last_result: self.last_result.clone(),
            legal: viewer.map(|s| self.legal_actions(s)).unwrap_or_default(),
        }
    }

    fn remaining_ms(&self, now: Instant) -> Option<u64> {
        self.turn_remaining(now).map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }
}
