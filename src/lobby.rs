//! Room membership before a game starts: who sits where, who hosts, and which
//! seats are bots.

use crate::config::{ConfigError, TableConfig};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Names handed to bots in join order.
pub const BOT_NAMES: [&str; 10] =
    ["Dealer", "Raven", "Ace", "Bluff", "Switch", "Nova", "Cipher", "Joker", "Spade", "Lucky"];

/// Stable identity of a participant, independent of seat.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    fn random<R: Rng + ?Sized>(prefix: &str, rng: &mut R) -> Self {
        const CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
        let tail: String =
            (0..8).map(|_| char::from(CHARS[rng.random_range(0..CHARS.len())])).collect();
        Self(format!("{prefix}-{tail}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LobbyError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("name {0:?} is already taken")]
    NameTaken(String),
    #[error("player {0} is already seated")]
    AlreadySeated(PlayerId),
    #[error("room is full ({0} seats)")]
    RoomFull(usize),
    #[error("only the host can do that")]
    NotHost,
    #[error("no player {0}")]
    UnknownPlayer(PlayerId),
    #[error("{0} is not a bot")]
    NotABot(PlayerId),
    #[error("a game needs at least two players, have {0}")]
    NotEnoughPlayers(usize),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub id: PlayerId,
    pub name: String,
    pub is_bot: bool,
}

/// The roster a game is started from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    seats: Vec<Seat>,
    host: Option<PlayerId>,
    config: TableConfig,
}

impl Default for Roster {
    fn default() -> Self {
        Self::new(TableConfig::default())
    }
}

impl Roster {
    pub fn new(config: TableConfig) -> Self {
        Self { seats: Vec::new(), host: None, config }
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn host(&self) -> Option<&PlayerId> {
        self.host.as_ref()
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    /// Seat a human. The first human to join becomes host.
    pub fn join(&mut self, name: &str) -> Result<PlayerId, LobbyError> {
        let id = PlayerId::random("p", &mut rand::rng());
        self.join_as(id, name)
    }

    /// [`Roster::join`] with a caller-chosen id.
    pub fn join_as(&mut self, id: PlayerId, name: &str) -> Result<PlayerId, LobbyError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LobbyError::EmptyName);
        }
        self.ensure_room()?;
        if self.seats.iter().any(|s| s.id == id) {
            return Err(LobbyError::AlreadySeated(id));
        }
        if self.name_taken(name) {
            return Err(LobbyError::NameTaken(name.to_string()));
        }
        self.seats.push(Seat { id: id.clone(), name: name.to_string(), is_bot: false });
        if self.host.is_none() {
            self.host = Some(id.clone());
        }
        Ok(id)
    }

    /// Seat a bot under the first unused name from [`BOT_NAMES`].
    pub fn add_bot(&mut self) -> Result<PlayerId, LobbyError> {
        self.ensure_room()?;
        let name = BOT_NAMES
            .iter()
            .find(|n| !self.name_taken(n))
            .map(|n| n.to_string())
            .unwrap_or_else(|| {
                let mut i = self.seats.len() + 1;
                while self.name_taken(&format!("Bot {i}")) {
                    i += 1;
                }
                format!("Bot {i}")
            });
        let id = PlayerId::random("bot", &mut rand::rng());
        self.seats.push(Seat { id: id.clone(), name, is_bot: true });
        Ok(id)
    }

    pub fn remove_bot(&mut self, id: &PlayerId) -> Result<(), LobbyError> {
        let idx = self
            .seats
            .iter()
            .position(|s| &s.id == id)
            .ok_or_else(|| LobbyError::UnknownPlayer(id.clone()))?;
        if !self.seats[idx].is_bot {
            return Err(LobbyError::NotABot(id.clone()));
        }
        self.seats.remove(idx);
        Ok(())
    }

    /// Host-only: change the turn time limit.
    pub fn set_turn_time(&mut self, by: &PlayerId, secs: u16) -> Result<(), LobbyError> {
        if self.host.as_ref() != Some(by) {
            return Err(LobbyError::NotHost);
        }
        self.config = self.config.with_turn_time(secs)?;
        Ok(())
    }

    /// Ready to start a game from.
    pub fn ensure_startable(&self) -> Result<(), LobbyError> {
        self.config.validate()?;
        if self.seats.len() < 2 {
            return Err(LobbyError::NotEnoughPlayers(self.seats.len()));
        }
        Ok(())
    }

    fn ensure_room(&self) -> Result<(), LobbyError> {
        if self.seats.len() >= self.config.max_players {
            return Err(LobbyError::RoomFull(self.config.max_players));
        }
        Ok(())
    }

    fn name_taken(&self, name: &str) -> bool {
        self.seats.iter().any(|s| s.name.eq_ignore_ascii_case(name))
    }
}
