use crate::cards::{Card, Rank};
use crate::claim::{Claim, ClaimEntry, ClaimError};
use crate::config::TableConfig;
use crate::deck::{verify_unique, Deck, IntegrityError, DECK_SIZE};
use crate::evaluator::{describe_cards, evaluate_claim, is_escalation};
use crate::lobby::{LobbyError, PlayerId, Roster};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Phase {
    AwaitingOpeningClaim,
    ClaimOutstanding,
    GameOver,
}

/// Rejected actions. State is never touched when one of these is returned.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ActionError {
    #[error("the game is over")]
    GameOver,
    #[error("no player in seat {0}")]
    UnknownSeat(usize),
    #[error("player is eliminated")]
    Eliminated,
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("there is no claim to challenge")]
    NoClaim,
    #[error("you cannot challenge your own claim")]
    OwnClaim,
    #[error("{claim} does not beat {previous}")]
    NotEscalation { claim: Claim, previous: Claim },
    #[error("invalid claim: {0}")]
    InvalidClaim(#[from] ClaimError),
    #[error("turn deadline has not passed")]
    DeadlineNotReached,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GameError {
    #[error(transparent)]
    Rejected(#[from] ActionError),
    #[error("integrity failure: {0}")]
    Integrity(#[from] IntegrityError),
    #[error("stale state: expected version {expected}, now at {actual}")]
    Stale { expected: u64, actual: u64 },
    #[error("cannot start game: {0}")]
    Setup(#[from] LobbyError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Player {
    pub(crate) id: PlayerId,
    pub(crate) name: String,
    pub(crate) is_bot: bool,
    pub(crate) hand: Vec<Card>,
    pub(crate) penalty_count: u8,
    pub(crate) eliminated: bool,
}

impl Player {
    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_bot(&self) -> bool {
        self.is_bot
    }

    pub fn hand(&self) -> &[Card] {
        &self.hand
    }

    /// Cards this player is dealt each round.
    pub fn penalty_count(&self) -> u8 {
        self.penalty_count
    }

    pub fn is_eliminated(&self) -> bool {
        self.eliminated
    }
}

/// How a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    /// `caller` disputed the claim made by `author`.
    Challenge { caller: usize, author: usize },
    /// The turn came back to the opener, who closed the round with a claim.
    ClosingClaim { speaker: usize },
    Timeout { player: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealedHand {
    pub seat: usize,
    pub name: String,
    pub cards: Vec<Card>,
}

/// Everything the table learns when a round is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub round: u32,
    pub resolution: Resolution,
    /// The judged claim; for a timeout, whatever claim was outstanding.
    pub claim: Option<Claim>,
    /// Absent for timeouts.
    pub claim_true: Option<bool>,
    pub primary_count: Option<u8>,
    pub secondary_count: Option<u8>,
    pub cards: Vec<Card>,
    pub cards_desc: String,
    pub hands: Vec<RevealedHand>,
    pub penalized: Option<usize>,
    pub penalized_name: Option<String>,
    pub eliminated: bool,
    pub winner: Option<usize>,
}

impl RoundResult {
    pub fn is_timeout(&self) -> bool {
        matches!(self.resolution, Resolution::Timeout { .. })
    }
}

/// Authoritative state of one game. All mutation goes through the action
/// methods, each of which either applies fully or leaves the state untouched.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Game {
    pub(crate) config: TableConfig,
    pub(crate) host: Option<PlayerId>,
    pub(crate) players: Vec<Player>,
    pub(crate) round: u32,
    pub(crate) opener: usize,
    pub(crate) turn: usize,
    pub(crate) current_claim: Option<ClaimEntry>,
    pub(crate) history: Vec<ClaimEntry>,
    /// Undealt remainder of this round's deck.
    pub(crate) deck: Deck,
    pub(crate) cards_in_play: usize,
    pub(crate) turn_deadline: Option<Instant>,
    pub(crate) winner: Option<usize>,
    pub(crate) last_result: Option<RoundResult>,
    pub(crate) version: u64,
    pub(crate) rng: ChaCha8Rng,
}

impl Game {
    /// Seat the roster in order and deal the first round. Seat 0 opens.
    pub fn start(roster: &Roster, now: Instant) -> Result<Self, GameError> {
        let seed: u64 = rand::rng().random();
        Self::start_seeded(roster, seed, now)
    }

    /// [`Game::start`] with a fixed shuffle seed.
    pub fn start_seeded(roster: &Roster, seed: u64, now: Instant) -> Result<Self, GameError> {
        roster.ensure_startable()?;
        let config = *roster.config();
        let players = roster
            .seats()
            .iter()
            .map(|s| Player {
                id: s.id.clone(),
                name: s.name.clone(),
                is_bot: s.is_bot,
                hand: Vec::new(),
                penalty_count: config.starting_cards,
                eliminated: false,
            })
            .collect();
        let mut game = Self {
            config,
            host: roster.host().cloned(),
            players,
            round: 1,
            opener: 0,
            turn: 0,
            current_claim: None,
            history: Vec::new(),
            deck: Deck::default(),
            cards_in_play: 0,
            turn_deadline: None,
            winner: None,
            last_result: None,
            version: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        };
        let mut players = game.players.clone();
        game.deck = game.deal_into(&mut players)?;
        game.cards_in_play = players.iter().map(|p| p.hand.len()).sum();
        game.players = players;
        game.turn_deadline = Some(now + game.config.turn_time_limit());
        game.check_integrity()?;
        info!(players = game.players.len(), seed, "game started");
        Ok(game)
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn host(&self) -> Option<&PlayerId> {
        self.host.as_ref()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, seat: usize) -> Option<&Player> {
        self.players.get(seat)
    }

    pub fn seat_of(&self, id: &PlayerId) -> Option<usize> {
        self.players.iter().position(|p| &p.id == id)
    }

    /// 1-based round number.
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn opener(&self) -> usize {
        self.opener
    }

    /// Seat whose turn it is.
    pub fn current(&self) -> usize {
        self.turn
    }

    pub fn current_claim(&self) -> Option<&ClaimEntry> {
        self.current_claim.as_ref()
    }

    /// Claims made this round, oldest first.
    pub fn history(&self) -> &[ClaimEntry] {
        &self.history
    }

    pub fn cards_in_play(&self) -> usize {
        self.cards_in_play
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.turn_deadline
    }

    pub fn turn_remaining(&self, now: Instant) -> Option<Duration> {
        self.turn_deadline.map(|d| d.saturating_duration_since(now))
    }

    pub fn winner(&self) -> Option<usize> {
        self.winner
    }

    pub fn last_result(&self) -> Option<&RoundResult> {
        self.last_result.as_ref()
    }

    /// Bumped by every applied action.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    pub fn phase(&self) -> Phase {
        if self.is_over() {
            Phase::GameOver
        } else if self.current_claim.is_some() {
            Phase::ClaimOutstanding
        } else {
            Phase::AwaitingOpeningClaim
        }
    }

    pub fn active_count(&self) -> usize {
        self.players.iter().filter(|p| !p.eliminated).count()
    }

    /// Every card held by a non-eliminated player, in seat order.
    pub fn all_cards_in_play(&self) -> Vec<Card> {
        self.players.iter().filter(|p| !p.eliminated).flat_map(|p| p.hand.iter().copied()).collect()
    }

    /// Reject with [`GameError::Stale`] unless the state is still at `expected`.
    pub fn check_version(&self, expected: Option<u64>) -> Result<(), GameError> {
        match expected {
            Some(expected) if expected != self.version => {
                Err(GameError::Stale { expected, actual: self.version })
            }
            _ => Ok(()),
        }
    }

    /// Claim as the turn holder.
    ///
    /// When the opener gets the turn back with a claim outstanding, their claim
    /// closes the round instead of escalating: it is judged at once against
    /// every card in play, and the opener is penalized if it is false.
    pub fn submit_claim(
        &mut self,
        seat: usize,
        claim: Claim,
        now: Instant,
    ) -> Result<Option<RoundResult>, GameError> {
        self.ensure_running()?;
        self.ensure_active(seat)?;
        if seat != self.turn {
            return Err(ActionError::NotYourTurn.into());
        }
        let claim = claim.validated().map_err(ActionError::from)?;

        if seat == self.opener && self.current_claim.is_some() {
            let truth = evaluate_claim(&claim, &self.all_cards_in_play());
            let penalized = (!truth).then_some(seat);
            let result = self.resolve(
                Resolution::ClosingClaim { speaker: seat },
                Some(claim),
                Some(truth),
                penalized,
                now,
            )?;
            return Ok(Some(result));
        }

        if let Some(previous) = self.current_claim.as_ref().map(|e| e.claim) {
            if !is_escalation(&claim, Some(&previous)) {
                return Err(ActionError::NotEscalation { claim, previous }.into());
            }
        }
        let entry = ClaimEntry { claim, seat, player: self.players[seat].name.clone() };
        self.history.push(entry.clone());
        self.current_claim = Some(entry);
        self.turn = self.next_active_after(seat);
        self.turn_deadline = Some(now + self.config.turn_time_limit());
        self.version += 1;
        debug!(seat, %claim, version = self.version, "claim accepted");
        Ok(None)
    }

    /// Dispute the outstanding claim. Any active player but its author may call.
    pub fn challenge(&mut self, seat: usize, now: Instant) -> Result<RoundResult, GameError> {
        self.ensure_running()?;
        self.ensure_active(seat)?;
        let entry = self.current_claim.as_ref().ok_or(ActionError::NoClaim)?;
        if entry.seat == seat {
            return Err(ActionError::OwnClaim.into());
        }
        let (claim, author) = (entry.claim, entry.seat);
        let truth = evaluate_claim(&claim, &self.all_cards_in_play());
        let penalized = if truth { seat } else { author };
        self.resolve(
            Resolution::Challenge { caller: seat, author },
            Some(claim),
            Some(truth),
            Some(penalized),
            now,
        )
    }

    /// Penalize the turn holder once their deadline has passed.
    pub fn timeout_resolve(&mut self, now: Instant) -> Result<RoundResult, GameError> {
        self.ensure_running()?;
        match self.turn_deadline {
            Some(deadline) if now >= deadline => {}
            _ => return Err(ActionError::DeadlineNotReached.into()),
        }
        let player = self.turn;
        let claim = self.current_claim.as_ref().map(|e| e.claim);
        info!(seat = player, round = self.round, "turn timed out");
        self.resolve(Resolution::Timeout { player }, claim, None, Some(player), now)
    }

    /// Check the card invariants: no duplicates across hands and deck, hand
    /// sizes match penalty counts, eliminated players hold nothing, and while
    /// the game runs every card is either held or in the deck.
    pub fn check_integrity(&self) -> Result<(), IntegrityError> {
        verify_unique(self.players.iter().flat_map(|p| p.hand.iter()).chain(self.deck.cards()))?;
        let mut in_hands = 0;
        for (seat, p) in self.players.iter().enumerate() {
            let over_limit = p.penalty_count > self.config.penalty_limit;
            if p.penalty_count == 0 || p.eliminated != over_limit {
                return Err(IntegrityError::PenaltyState {
                    seat,
                    penalty_count: p.penalty_count,
                    eliminated: p.eliminated,
                });
            }
            if p.eliminated {
                if !p.hand.is_empty() {
                    return Err(IntegrityError::EliminatedHolding { seat });
                }
                continue;
            }
            if p.hand.len() != p.penalty_count as usize {
                return Err(IntegrityError::HandSize {
                    seat,
                    held: p.hand.len(),
                    expected: p.penalty_count as usize,
                });
            }
            in_hands += p.hand.len();
        }
        if in_hands != self.cards_in_play {
            return Err(IntegrityError::CardsInPlay { in_play: self.cards_in_play, in_hands });
        }
        // the winner keeps their hand once the deck is put away
        let accounted = in_hands + self.deck.len();
        if !self.is_over() && accounted != DECK_SIZE {
            return Err(IntegrityError::Unaccounted { accounted, expected: DECK_SIZE });
        }
        Ok(())
    }

    fn ensure_running(&self) -> Result<(), ActionError> {
        if self.is_over() {
            return Err(ActionError::GameOver);
        }
        Ok(())
    }

    fn ensure_active(&self, seat: usize) -> Result<(), ActionError> {
        match self.players.get(seat) {
            None => Err(ActionError::UnknownSeat(seat)),
            Some(p) if p.eliminated => Err(ActionError::Eliminated),
            Some(_) => Ok(()),
        }
    }

    fn next_active_after(&self, seat: usize) -> usize {
        next_active(&self.players, seat).unwrap_or(seat)
    }

    /// Shuffle a fresh deck and deal every active player their penalty count,
    /// in seat order. Returns the undealt remainder.
    fn deal_into(&mut self, players: &mut [Player]) -> Result<Deck, IntegrityError> {
        let mut deck = Deck::shuffled(&mut self.rng)?;
        let sizes: Vec<usize> = players
            .iter()
            .map(|p| if p.eliminated { 0 } else { p.penalty_count as usize })
            .collect();
        let hands = deck.deal_penalty_hands(&sizes)?;
        for (p, hand) in players.iter_mut().zip(hands) {
            p.hand = hand;
        }
        Ok(deck)
    }

    /// End the round: penalize, eliminate, then either finish the game or
    /// redeal. Everything is computed before anything is committed.
    fn resolve(
        &mut self,
        resolution: Resolution,
        claim: Option<Claim>,
        claim_true: Option<bool>,
        penalized: Option<usize>,
        now: Instant,
    ) -> Result<RoundResult, GameError> {
        let cards = self.all_cards_in_play();
        let count = |r: Rank| cards.iter().filter(|c| c.rank() == r).count() as u8;
        let primary_count = claim.map(|c| count(c.rank()));
        let secondary_count = claim.and_then(|c| c.second_rank()).map(count);
        let hands = self
            .players
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.eliminated)
            .map(|(seat, p)| RevealedHand { seat, name: p.name.clone(), cards: p.hand.clone() })
            .collect();

        let mut players = self.players.clone();
        let mut eliminated = false;
        if let Some(seat) = penalized {
            let p = &mut players[seat];
            p.penalty_count = p.penalty_count.saturating_add(1);
            if p.penalty_count > self.config.penalty_limit {
                p.eliminated = true;
                p.hand.clear();
                eliminated = true;
            }
        }

        let mut active = players.iter().enumerate().filter(|(_, p)| !p.eliminated).map(|(i, _)| i);
        let winner = match (active.next(), active.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        };

        let (deck, opener) = match winner {
            Some(_) => (Deck::default(), self.opener),
            None => {
                let opener = next_active(&players, self.opener).unwrap_or(self.opener);
                let deck = match self.deal_into(&mut players) {
                    Ok(deck) => deck,
                    Err(e) => {
                        error!(round = self.round, error = %e, "redeal failed");
                        return Err(e.into());
                    }
                };
                (deck, opener)
            }
        };

        let result = RoundResult {
            round: self.round,
            resolution,
            claim,
            claim_true,
            primary_count,
            secondary_count,
            cards_desc: describe_cards(&cards),
            cards,
            hands,
            penalized,
            penalized_name: penalized.map(|s| players[s].name.clone()),
            eliminated,
            winner,
        };

        self.cards_in_play = players.iter().filter(|p| !p.eliminated).map(|p| p.hand.len()).sum();
        self.players = players;
        self.deck = deck;
        self.current_claim = None;
        self.history.clear();
        self.winner = winner;
        if winner.is_some() {
            self.turn_deadline = None;
        } else {
            self.round += 1;
            self.opener = opener;
            self.turn = opener;
            self.turn_deadline = Some(now + self.config.turn_time_limit());
        }
        self.last_result = Some(result.clone());
        self.version += 1;

        info!(
            round = result.round,
            truth = ?result.claim_true,
            penalized = ?result.penalized_name,
            eliminated,
            winner = ?winner,
            "round resolved"
        );
        if let Err(e) = self.check_integrity() {
            error!(error = %e, "card integrity broken after resolution");
            return Err(e.into());
        }
        Ok(result)
    }
}

/// First non-eliminated seat after `seat`, wrapping around the table.
pub(crate) fn next_active(players: &[Player], seat: usize) -> Option<usize> {
    let n = players.len();
    (1..=n).map(|step| (seat + step) % n).find(|&i| !players[i].eliminated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_cards;
    use crate::deck::build_ordered_deck;

    fn roster(n: usize) -> Roster {
        let mut r = Roster::default();
        for i in 0..n {
            r.join(&format!("P{i}")).unwrap();
        }
        r
    }

    fn mk_game(n: usize) -> (Game, Instant) {
        let now = Instant::now();
        (Game::start_seeded(&roster(n), 7, now).unwrap(), now)
    }

    /// Replace every hand and rebuild the deck around them.
    fn rig(g: &mut Game, hands: &[&str]) {
        let mut held = Vec::new();
        for (p, h) in g.players.iter_mut().zip(hands) {
            p.hand = parse_cards(h).unwrap();
            if !p.eliminated {
                p.penalty_count = p.hand.len() as u8;
            }
            held.extend(p.hand.iter().copied());
        }
        let rest = build_ordered_deck()
            .unwrap()
            .cards()
            .iter()
            .copied()
            .filter(|c| !held.contains(c))
            .collect();
        g.deck = Deck::from_cards(rest).unwrap();
        g.cards_in_play = held.len();
        g.check_integrity().unwrap();
    }

    #[test]
    fn start_deals_one_card_each_and_seat_zero_opens() {
        let (g, now) = mk_game(4);
        assert!(g.players.iter().all(|p| p.hand.len() == 1));
        assert_eq!(g.cards_in_play(), 4);
        assert_eq!(g.deck.len(), 48);
        assert_eq!(g.current(), 0);
        assert_eq!(g.opener(), 0);
        assert_eq!(g.phase(), Phase::AwaitingOpeningClaim);
        assert_eq!(g.turn_remaining(now), Some(Duration::from_secs(120)));
    }

    #[test]
    fn start_needs_two_players() {
        let r = roster(1);
        assert!(matches!(
            Game::start(&r, Instant::now()),
            Err(GameError::Setup(LobbyError::NotEnoughPlayers(1)))
        ));
    }

    #[test]
    fn claims_escalate_and_rotate() {
        let (mut g, now) = mk_game(3);
        assert_eq!(g.submit_claim(0, Claim::pair(Rank::Five), now), Ok(None));
        assert_eq!(g.current(), 1);
        assert_eq!(g.phase(), Phase::ClaimOutstanding);
        let err = g.submit_claim(1, Claim::pair(Rank::Four), now).unwrap_err();
        assert!(matches!(err, GameError::Rejected(ActionError::NotEscalation { .. })));
        assert_eq!(g.version(), 1, "rejections leave the version alone");
        g.submit_claim(1, Claim::pair(Rank::Six), now).unwrap();
        assert_eq!(g.history().len(), 2);
        assert_eq!(
            g.submit_claim(0, Claim::pair(Rank::Seven), now),
            Err(GameError::Rejected(ActionError::NotYourTurn))
        );
    }

    #[test]
    fn malformed_claims_are_rejected() {
        let (mut g, now) = mk_game(2);
        let bad: Claim =
            serde_json::from_str(r#"{"category":"FullHouse","rank":"Five","second":"Five"}"#)
                .unwrap();
        assert_eq!(
            g.submit_claim(0, bad, now),
            Err(GameError::Rejected(ActionError::InvalidClaim(ClaimError::DuplicateRank(
                crate::claim::HandCategory::FullHouse
            ))))
        );
        assert_eq!(g.version(), 0);
    }

    #[test]
    fn challenge_false_claim_penalizes_author() {
        let (mut g, now) = mk_game(3);
        rig(&mut g, &["5s", "9h", "2c"]);
        g.submit_claim(0, Claim::pair(Rank::Five), now).unwrap();
        let r = g.challenge(2, now).unwrap();
        assert_eq!(r.claim_true, Some(false));
        assert_eq!(r.penalized, Some(0));
        assert_eq!(r.primary_count, Some(1));
        assert_eq!(r.cards_desc, "5♠, 9♥, 2♣");
        assert_eq!(g.players[0].penalty_count(), 2);
        assert_eq!(g.players[0].hand().len(), 2);
        assert_eq!(g.cards_in_play(), 4);
        assert_eq!(g.opener(), 1);
        assert_eq!(g.current(), 1);
        assert_eq!(g.round(), 2);
        assert!(g.current_claim().is_none());
        assert!(g.history().is_empty());
    }

    #[test]
    fn challenge_true_claim_penalizes_caller() {
        let (mut g, now) = mk_game(3);
        rig(&mut g, &["5s", "5h", "2c"]);
        g.submit_claim(0, Claim::pair(Rank::Five), now).unwrap();
        let r = g.challenge(2, now).unwrap();
        assert_eq!(r.claim_true, Some(true));
        assert_eq!(r.penalized, Some(2));
        assert_eq!(r.resolution, Resolution::Challenge { caller: 2, author: 0 });
    }

    #[test]
    fn cannot_challenge_own_or_missing_claim() {
        let (mut g, now) = mk_game(3);
        assert_eq!(g.challenge(1, now), Err(GameError::Rejected(ActionError::NoClaim)));
        g.submit_claim(0, Claim::high_card(Rank::Two), now).unwrap();
        assert_eq!(g.challenge(0, now), Err(GameError::Rejected(ActionError::OwnClaim)));
    }

    #[test]
    fn closing_claim_is_judged_not_escalated() {
        let (mut g, now) = mk_game(2);
        rig(&mut g, &["Ks", "2h"]);
        g.submit_claim(0, Claim::pair(Rank::Ace), now).unwrap();
        g.submit_claim(1, Claim::three_of_a_kind(Rank::Two), now).unwrap();
        // lower than the outstanding claim, but true: nobody is penalized
        let r = g.submit_claim(0, Claim::high_card(Rank::King), now).unwrap().unwrap();
        assert_eq!(r.resolution, Resolution::ClosingClaim { speaker: 0 });
        assert_eq!(r.claim_true, Some(true));
        assert_eq!(r.penalized, None);
        assert!(g.players.iter().all(|p| p.penalty_count() == 1));
        assert_eq!(g.opener(), 1);
    }

    #[test]
    fn false_closing_claim_penalizes_speaker() {
        let (mut g, now) = mk_game(2);
        rig(&mut g, &["Ks", "2h"]);
        g.submit_claim(0, Claim::high_card(Rank::Three), now).unwrap();
        g.submit_claim(1, Claim::high_card(Rank::Four), now).unwrap();
        let r = g.submit_claim(0, Claim::pair(Rank::Ace), now).unwrap().unwrap();
        assert_eq!(r.penalized, Some(0));
        assert_eq!(r.penalized_name.as_deref(), Some("P0"));
    }

    #[test]
    fn timeout_needs_an_elapsed_deadline() {
        let (mut g, now) = mk_game(3);
        assert_eq!(
            g.timeout_resolve(now),
            Err(GameError::Rejected(ActionError::DeadlineNotReached))
        );
        let later = now + Duration::from_secs(120);
        let r = g.timeout_resolve(later).unwrap();
        assert!(r.is_timeout());
        assert_eq!(r.claim, None);
        assert_eq!(r.claim_true, None);
        assert_eq!(r.penalized, Some(0));
        assert_eq!(g.turn_remaining(later), Some(Duration::from_secs(120)));
    }

    #[test]
    fn elimination_ends_a_heads_up_game() {
        let (mut g, now) = mk_game(2);
        rig(&mut g, &["2s", "3s 4s 5s 6s 7s"]);
        g.submit_claim(0, Claim::straight(Rank::Seven).unwrap(), now).unwrap();
        let r = g.challenge(1, now).unwrap();
        assert_eq!(r.claim_true, Some(true));
        assert_eq!(r.penalized, Some(1));
        assert!(r.eliminated);
        assert_eq!(r.winner, Some(0));
        assert_eq!(r.hands.len(), 2);
        assert_eq!(g.phase(), Phase::GameOver);
        assert_eq!(g.winner(), Some(0));
        assert_eq!(g.deadline(), None);
        assert!(g.players[1].is_eliminated());
        assert!(g.players[1].hand().is_empty());
        assert_eq!(
            g.submit_claim(0, Claim::pair(Rank::Two), now),
            Err(GameError::Rejected(ActionError::GameOver))
        );
        assert_eq!(
            g.timeout_resolve(now + Duration::from_secs(999)),
            Err(GameError::Rejected(ActionError::GameOver))
        );
        g.check_integrity().unwrap();
    }

    #[test]
    fn elimination_with_players_left_redeals() {
        let (mut g, now) = mk_game(3);
        rig(&mut g, &["2s", "3s 4s 5s 6s 7s", "9d"]);
        g.submit_claim(0, Claim::high_card(Rank::Nine), now).unwrap();
        let r = g.challenge(1, now).unwrap();
        assert!(r.eliminated);
        assert_eq!(r.winner, None);
        assert!(!g.is_over());
        // seat 1 is out, so the opener moves on to seat 2
        assert_eq!(g.opener(), 2);
        assert_eq!(g.cards_in_play(), 2);
        g.check_integrity().unwrap();
    }

    #[test]
    fn eliminated_seats_are_skipped() {
        let (mut g, now) = mk_game(3);
        g.players[1].eliminated = true;
        g.players[1].penalty_count = 6;
        rig(&mut g, &["2s", "", "3h"]);
        g.submit_claim(0, Claim::high_card(Rank::Two), now).unwrap();
        assert_eq!(g.current(), 2);
        assert_eq!(g.challenge(1, now), Err(GameError::Rejected(ActionError::Eliminated)));
        assert_eq!(g.challenge(5, now), Err(GameError::Rejected(ActionError::UnknownSeat(5))));
    }

    #[test]
    fn stale_versions_are_reported() {
        let (mut g, now) = mk_game(2);
        g.submit_claim(0, Claim::high_card(Rank::Two), now).unwrap();
        assert_eq!(g.check_version(Some(1)), Ok(()));
        assert_eq!(g.check_version(None), Ok(()));
        assert_eq!(g.check_version(Some(0)), Err(GameError::Stale { expected: 0, actual: 1 }));
    }
}
