//! Bowlers, teams, leagues and series.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::game::Game;
use crate::error::{Error, Result};

/// Name of the league every bowler gets for casual games.
pub const OPEN_LEAGUE_NAME: &str = "Open";

/// Most games a series can hold.
pub const MAX_GAMES_PER_SERIES: u8 = 20;

/// Default game highlight threshold.
pub const DEFAULT_GAME_HIGHLIGHT: u32 = 300;

/// Default series highlight threshold.
pub const DEFAULT_SERIES_HIGHLIGHT: u32 = 800;

/// A person whose scores are tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bowler {
    /// Unique identifier (assigned by storage layer).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Display name.
    pub name: String,
}

impl Bowler {
    /// Create a bowler that hasn't been saved yet.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }
}

/// A named group of bowlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Unique identifier (assigned by storage layer).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Display name.
    pub name: String,
    /// Member bowler ids, in bowling order.
    pub members: Vec<i64>,
}

impl Team {
    /// Create a team that hasn't been saved yet.
    #[must_use]
    pub fn new(name: impl Into<String>, members: Vec<i64>) -> Self {
        Self {
            id: None,
            name: name.into(),
            members,
        }
    }
}

/// A competition context for a bowler's series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
    /// Unique identifier (assigned by storage layer).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Owner of the league.
    pub bowler_id: i64,
    /// Display name.
    pub name: String,
    /// One-off tournament with a single series.
    pub is_event: bool,
    /// Games bowled in each series.
    pub games_per_series: u8,
    /// Games at or above this score are highlighted.
    pub game_highlight: u32,
    /// Series at or above this total are highlighted.
    pub series_highlight: u32,
    /// Pinfall bowled before the league was tracked.
    pub additional_pinfall: u32,
    /// Games bowled before the league was tracked.
    pub additional_games: u32,
}

impl League {
    /// Create a regular league with default highlights.
    #[must_use]
    pub fn new(bowler_id: i64, name: impl Into<String>, games_per_series: u8) -> Self {
        Self {
            id: None,
            bowler_id,
            name: name.into(),
            is_event: false,
            games_per_series,
            game_highlight: DEFAULT_GAME_HIGHLIGHT,
            series_highlight: DEFAULT_SERIES_HIGHLIGHT,
            additional_pinfall: 0,
            additional_games: 0,
        }
    }

    /// The bowler's casual league.
    #[must_use]
    pub fn open(bowler_id: i64) -> Self {
        Self::new(bowler_id, OPEN_LEAGUE_NAME, 1)
    }

    /// Whether this is the casual league.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.name == OPEN_LEAGUE_NAME
    }

    /// Check the league's settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank, the number of games is out of
    /// range, or additional pinfall can't come from the additional games.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::invalid_input("league name cannot be empty"));
        }
        if self.games_per_series == 0 || self.games_per_series > MAX_GAMES_PER_SERIES {
            return Err(Error::invalid_input(format!(
                "games per series must be between 1 and {MAX_GAMES_PER_SERIES}"
            )));
        }
        if self.additional_pinfall > 0 && self.additional_games == 0 {
            return Err(Error::invalid_input(
                "additional pinfall requires additional games",
            ));
        }
        if self.additional_pinfall > self.additional_games * super::game::MAX_SCORE {
            return Err(Error::invalid_input(
                "additional pinfall is more than the additional games allow",
            ));
        }
        Ok(())
    }
}

/// Games bowled in one outing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    /// Unique identifier (assigned by storage layer).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// League the series was bowled in.
    pub league_id: i64,
    /// When the series was bowled.
    pub date: NaiveDateTime,
    /// Games in slot order.
    pub games: Vec<Game>,
}

impl Series {
    /// Scores of each game in slot order.
    #[must_use]
    pub fn scores(&self) -> Vec<u32> {
        self.games.iter().map(Game::score).collect()
    }

    /// Series total.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.games.iter().map(Game::score).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_league() {
        let league = League::open(3);
        assert!(league.is_open());
        assert_eq!(league.bowler_id, 3);
        assert!(league.validate().is_ok());
    }

    #[test]
    fn test_league_validation() {
        let mut league = League::new(1, "Tuesday Night", 3);
        assert!(league.validate().is_ok());

        league.games_per_series = 0;
        assert!(league.validate().is_err());
        league.games_per_series = 21;
        assert!(league.validate().is_err());
        league.games_per_series = 20;
        assert!(league.validate().is_ok());

        league.name = "  ".to_string();
        assert!(league.validate().is_err());
    }

    #[test]
    fn test_additional_pinfall_validation() {
        let mut league = League::new(1, "Summer", 3);
        league.additional_pinfall = 500;
        assert!(league.validate().is_err());

        league.additional_games = 2;
        assert!(league.validate().is_ok());

        league.additional_pinfall = 901;
        assert!(league.validate().is_err());
    }

    #[test]
    fn test_series_total() {
        let mut first = Game::new(1, 1);
        first.set_manual_score(200).unwrap();
        let mut second = Game::new(1, 2);
        second.set_manual_score(250).unwrap();

        let series = Series {
            id: Some(1),
            league_id: 1,
            date: chrono::NaiveDate::from_ymd_opt(2019, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            games: vec![first, second],
        };
        assert_eq!(series.scores(), vec![200, 250]);
        assert_eq!(series.total(), 450);
    }
}
