use crate::deck::DECK_SIZE;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("turn time must be between {min} and {max} seconds, got {got}")]
    TurnTime { min: u16, max: u16, got: u16 },
    #[error("a table needs room for at least two players")]
    TooFewSeats,
    #[error("penalty limit must be at least the starting card count")]
    PenaltyLimit,
    #[error("{players} players with up to {cards} cards each do not fit in one deck")]
    DeckTooSmall { players: usize, cards: u8 },
    #[error("invalid table config: {0}")]
    Parse(String),
}

/// Table rules a room is created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Seconds the turn holder has before they are penalized.
    pub turn_time_limit_secs: u16,
    pub max_players: usize,
    /// A player holding more than this many cards is eliminated.
    pub penalty_limit: u8,
    /// Cards each player is dealt in the first round.
    pub starting_cards: u8,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            turn_time_limit_secs: Self::DEFAULT_TURN_SECS,
            max_players: 10,
            penalty_limit: 5,
            starting_cards: 1,
        }
    }
}

impl TableConfig {
    pub const MIN_TURN_SECS: u16 = 30;
    pub const MAX_TURN_SECS: u16 = 240;
    pub const DEFAULT_TURN_SECS: u16 = 120;

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = self.turn_time_limit_secs;
        if !(Self::MIN_TURN_SECS..=Self::MAX_TURN_SECS).contains(&t) {
            return Err(ConfigError::TurnTime {
                min: Self::MIN_TURN_SECS,
                max: Self::MAX_TURN_SECS,
                got: t,
            });
        }
        if self.max_players < 2 {
            return Err(ConfigError::TooFewSeats);
        }
        if self.starting_cards == 0 || self.penalty_limit < self.starting_cards {
            return Err(ConfigError::PenaltyLimit);
        }
        // every seat holding the limit must still fit in one deck
        if self.max_players * self.penalty_limit as usize > DECK_SIZE {
            return Err(ConfigError::DeckTooSmall {
                players: self.max_players,
                cards: self.penalty_limit,
            });
        }
        Ok(())
    }

    pub fn with_turn_time(mut self, secs: u16) -> Result<Self, ConfigError> {
        self.turn_time_limit_secs = secs;
        self.validate()?;
        Ok(self)
    }

    pub fn turn_time_limit(&self) -> Duration {
        Duration::from_secs(u64::from(self.turn_time_limit_secs))
    }

    /// Parse and validate a JSON config; missing fields take their defaults.
    pub fn from_json(input: &str) -> Result<Self, ConfigError> {
        let cfg: TableConfig =
            serde_json::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let cfg = TableConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.turn_time_limit(), Duration::from_secs(120));
    }

    #[test]
    fn turn_time_bounds() {
        assert!(TableConfig::default().with_turn_time(30).is_ok());
        assert!(TableConfig::default().with_turn_time(240).is_ok());
        assert_eq!(
            TableConfig::default().with_turn_time(29),
            Err(ConfigError::TurnTime { min: 30, max: 240, got: 29 })
        );
        assert!(TableConfig::default().with_turn_time(241).is_err());
    }

    #[test]
    fn oversized_tables_are_rejected() {
        let cfg = TableConfig { max_players: 11, ..TableConfig::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::DeckTooSmall { players: 11, cards: 5 }));
    }

    #[test]
    fn json_fills_defaults() {
        let cfg = TableConfig::from_json(r#"{ "turn_time_limit_secs": 60 }"#).unwrap();
        assert_eq!(cfg.turn_time_limit_secs, 60);
        assert_eq!(cfg.max_players, 10);
        assert!(matches!(TableConfig::from_json("{ nope"), Err(ConfigError::Parse(_))));
    }
}
