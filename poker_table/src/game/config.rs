//! Table configuration models.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    constants::{MAX_PLAYERS, MAX_SEATS_PER_DECK, MIN_PLAYERS},
    entities::{Chips, Street},
};

/// Betting structure of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    /// Cards are dealt and shown down with no betting rounds at all.
    NoBetting,
    /// Fixed-limit betting: every bet and raise is exactly one limit size.
    Limit,
}

impl std::fmt::Display for GameType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameType::NoBetting => write!(f, "no betting"),
            GameType::Limit => write!(f, "limit"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("max seats must be between 2 and 23, got {0}")]
    SeatCount(usize),
    #[error("ante can't be negative, got {0}")]
    NegativeAnte(Chips),
    #[error("at most two blinds, got {0}")]
    TooManyBlinds(usize),
    #[error("blinds must be positive and ordered small to big, got {0:?}")]
    BlindOrder(Vec<Chips>),
    #[error("a no-betting table can't take {0}")]
    BettingOnNoBettingTable(&'static str),
    #[error("limit sizes must be positive, got {0:?}")]
    LimitSize([Chips; 2]),
    #[error("bad configuration json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Table configuration. Fixed for the table's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Number of seats at the table (default: 10)
    pub max_seats: usize,

    pub game_type: GameType,

    /// Taken from every seated player before each deal; zero skips it.
    pub ante: Chips,

    /// Forced bets posted by the first live seats after the button at the
    /// start of pre-flop betting, small to big.
    pub blinds: Vec<Chips>,

    /// Bet sizes: `[pre-flop and flop, turn and river]`.
    pub limits: [Chips; 2],
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            max_seats: MAX_PLAYERS,
            game_type: GameType::NoBetting,
            ante: 0,
            blinds: Vec::new(),
            limits: [0, 0],
        }
    }
}

impl Configuration {
    #[must_use]
    pub fn no_betting(ante: Chips) -> Self {
        Self {
            ante,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn limit(limits: [Chips; 2]) -> Self {
        Self {
            game_type: GameType::Limit,
            limits,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_ante(mut self, ante: Chips) -> Self {
        self.ante = ante;
        self
    }

    #[must_use]
    pub fn with_blinds(mut self, blinds: Vec<Chips>) -> Self {
        self.blinds = blinds;
        self
    }

    #[must_use]
    pub fn with_max_seats(mut self, max_seats: usize) -> Self {
        self.max_seats = max_seats;
        self
    }

    /// Parse and validate a configuration. Missing fields take their
    /// defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_PLAYERS..=MAX_SEATS_PER_DECK).contains(&self.max_seats) {
            return Err(ConfigError::SeatCount(self.max_seats));
        }

        if self.ante < 0 {
            return Err(ConfigError::NegativeAnte(self.ante));
        }

        if self.blinds.len() > 2 {
            return Err(ConfigError::TooManyBlinds(self.blinds.len()));
        }

        let ordered = self.blinds.windows(2).all(|pair| pair[0] <= pair[1]);
        if !ordered || self.blinds.iter().any(|&blind| blind <= 0) {
            return Err(ConfigError::BlindOrder(self.blinds.clone()));
        }

        match self.game_type {
            GameType::NoBetting if !self.blinds.is_empty() => {
                Err(ConfigError::BettingOnNoBettingTable("blinds"))
            }
            GameType::NoBetting if self.limits != [0, 0] => {
                Err(ConfigError::BettingOnNoBettingTable("limits"))
            }
            GameType::Limit if self.limits.iter().any(|&size| size <= 0) => {
                Err(ConfigError::LimitSize(self.limits))
            }
            _ => Ok(()),
        }
    }

    /// Bet and raise size on `street`.
    #[must_use]
    pub fn limit_size(&self, street: Street) -> Chips {
        self.limits[street.limit_idx()]
    }

    #[must_use]
    pub fn has_betting(&self) -> bool {
        self.game_type != GameType::NoBetting
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = Configuration::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_seats, 10);
        assert!(!config.has_betting());
    }

    #[test]
    fn test_limit_sizes_by_street() {
        let config = Configuration::limit([100, 200]);
        assert!(config.validate().is_ok());
        assert_eq!(config.limit_size(Street::PreFlop), 100);
        assert_eq!(config.limit_size(Street::Flop), 100);
        assert_eq!(config.limit_size(Street::Turn), 200);
        assert_eq!(config.limit_size(Street::River), 200);
    }

    #[test]
    fn test_seat_count_bounds() {
        assert!(matches!(
            Configuration::default().with_max_seats(1).validate(),
            Err(ConfigError::SeatCount(1))
        ));
        assert!(matches!(
            Configuration::default().with_max_seats(24).validate(),
            Err(ConfigError::SeatCount(24))
        ));
        let config = Configuration::default().with_max_seats(23);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blinds_must_be_ordered() {
        let config = Configuration::limit([100, 200]).with_blinds(vec![100, 50]);
        assert!(matches!(config.validate(), Err(ConfigError::BlindOrder(_))));

        let config = Configuration::limit([100, 200]).with_blinds(vec![0, 50]);
        assert!(matches!(config.validate(), Err(ConfigError::BlindOrder(_))));

        let config = Configuration::limit([100, 200]).with_blinds(vec![25, 50, 100]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TooManyBlinds(3))
        ));

        let config = Configuration::limit([100, 200]).with_blinds(vec![50, 100]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_no_betting_rejects_betting_settings() {
        let config = Configuration::no_betting(0).with_blinds(vec![5, 10]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BettingOnNoBettingTable("blinds"))
        ));
    }

    #[test]
    fn test_limit_rejects_zero_sizes() {
        assert!(matches!(
            Configuration::limit([100, 0]).validate(),
            Err(ConfigError::LimitSize([100, 0]))
        ));
    }

    #[test]
    fn test_negative_ante() {
        assert!(matches!(
            Configuration::no_betting(-1).validate(),
            Err(ConfigError::NegativeAnte(-1))
        ));
    }

    #[test]
    fn test_from_json() {
        let config = Configuration::from_json(
            r#"{"game_type": "limit", "limits": [100, 200], "blinds": [50, 100], "ante": 10}"#,
        )
        .unwrap();
        assert_eq!(config.game_type, GameType::Limit);
        assert_eq!(config.max_seats, 10);
        assert_eq!(config.blinds, vec![50, 100]);
        assert_eq!(config.ante, 10);
    }

    #[test]
    fn test_from_json_validates() {
        assert!(matches!(
            Configuration::from_json(r#"{"max_seats": 40}"#),
            Err(ConfigError::SeatCount(40))
        ));
        assert!(matches!(
            Configuration::from_json("{not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
