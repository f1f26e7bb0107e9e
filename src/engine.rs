// Game engine API boundary. Front-ends, bots and the room actor drive a game
// through this trait without reaching into `Game` internals. It is implemented
// for the core `Game` type.

use crate::claim::Claim;
use crate::game::{Game, GameError, RoundResult};
use crate::snapshot::{GameView, LegalActions};
use std::time::Instant;
use tracing::debug;

/// Something a seated player wants to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Intent {
    Claim(Claim),
    Challenge,
}

/// Outcome of an applied intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// The claim now stands and the turn moved on.
    Claimed,
    Resolved(RoundResult),
}

impl Applied {
    pub fn result(&self) -> Option<&RoundResult> {
        match self {
            Applied::Claimed => None,
            Applied::Resolved(r) => Some(r),
        }
    }
}

pub trait GameEngine {
    // Actions
    fn apply(
        &mut self,
        seat: usize,
        intent: Intent,
        expected_version: Option<u64>,
        now: Instant,
    ) -> Result<Applied, GameError>;
    fn timeout(&mut self, now: Instant) -> Result<RoundResult, GameError>;

    // Queries
    fn view(&self, viewer: Option<usize>, now: Instant) -> GameView;
    fn legal_actions(&self, seat: usize) -> LegalActions;
    fn deadline(&self) -> Option<Instant>;
    fn version(&self) -> u64;
    fn is_over(&self) -> bool;
    fn current(&self) -> usize;
    fn num_players(&self) -> usize;
}

impl GameEngine for Game {
    fn apply(
        &mut self,
        seat: usize,
        intent: Intent,
        expected_version: Option<u64>,
        now: Instant,
    ) -> Result<Applied, GameError> {
        self.check_version(expected_version)?;
        let applied = match intent {
            Intent::Claim(claim) => match self.submit_claim(seat, claim, now)? {
                Some(result) => Applied::Resolved(result),
                None => Applied::Claimed,
            },
            Intent::Challenge => Applied::Resolved(self.challenge(seat, now)?),
        };
        debug!(seat, ?intent, version = self.version(), "intent applied");
        Ok(applied)
    }

    fn timeout(&mut self, now: Instant) -> Result<RoundResult, GameError> {
        self.timeout_resolve(now)
    }

    fn view(&self, viewer: Option<usize>, now: Instant) -> GameView {
        self.view_for(viewer, now)
    }
    fn legal_actions(&self, seat: usize) -> LegalActions {
        Game::legal_actions(self, seat)
    }
    fn deadline(&self) -> Option<Instant> {
        Game::deadline(self)
    }
    fn version(&self) -> u64 {
        Game::version(self)
    }
    fn is_over(&self) -> bool {
        Game::is_over(self)
    }
    fn current(&self) -> usize {
        Game::current(self)
    }
    fn num_players(&self) -> usize {
        self.players().len()
    }
}
