//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Args, Subcommand, ValueEnum};

use crate::dates::{series_date_to_date, set_to_midnight};
use crate::model::{Deck, MatchPlayResult};
use crate::statistics::StatisticsUnit;

/// Bowler commands.
#[derive(Debug, Subcommand)]
pub enum BowlerCommand {
    /// Add a bowler (an open league is created with them)
    Add {
        /// Bowler name
        name: String,
    },

    /// List all bowlers
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Rename a bowler
    Rename {
        /// Bowler ID
        id: i64,
        /// New name
        name: String,
    },

    /// Delete a bowler and everything they bowled
    Delete {
        /// Bowler ID
        id: i64,
    },
}

/// Team commands.
#[derive(Debug, Subcommand)]
pub enum TeamCommand {
    /// Add a team
    Add {
        /// Team name
        name: String,
        /// Member bowler IDs, comma separated, in lineup order
        #[arg(short, long, value_delimiter = ',', num_args = 1..)]
        members: Vec<i64>,
    },

    /// List all teams
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Replace a team's members
    Members {
        /// Team ID
        id: i64,
        /// Member bowler IDs, comma separated, in lineup order
        #[arg(value_delimiter = ',', num_args = 1..)]
        members: Vec<i64>,
    },

    /// Delete a team (its bowlers are kept)
    Delete {
        /// Team ID
        id: i64,
    },
}

/// League commands.
#[derive(Debug, Subcommand)]
pub enum LeagueCommand {
    /// Add a league or event for a bowler
    Add(LeagueAddCommand),

    /// List a bowler's leagues and events
    List {
        /// Bowler ID
        bowler: i64,
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Change a league's settings
    Update(LeagueUpdateCommand),

    /// Delete a league and its series
    Delete {
        /// League ID
        id: i64,
    },
}

/// League add arguments.
#[derive(Debug, Args)]
pub struct LeagueAddCommand {
    /// Owning bowler ID
    pub bowler: i64,

    /// League name
    pub name: String,

    /// Games in each series
    #[arg(short, long, default_value = "1")]
    pub games: u8,

    /// Create a one-off event instead of a league
    #[arg(short, long)]
    pub event: bool,

    /// Settings to create the league with
    #[command(flatten)]
    pub settings: LeagueSettings,
}

/// League update arguments.
#[derive(Debug, Args)]
pub struct LeagueUpdateCommand {
    /// League ID
    pub id: i64,

    /// New name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Games in each series
    #[arg(short, long)]
    pub games: Option<u8>,

    /// Settings to change, left alone when not given
    #[command(flatten)]
    pub settings: LeagueSettings,
}

/// Optional league settings shared by add and update.
#[derive(Debug, Args, Default)]
pub struct LeagueSettings {
    /// Highlight games at or above this score
    #[arg(long)]
    pub game_highlight: Option<u32>,

    /// Highlight series at or above this total
    #[arg(long)]
    pub series_highlight: Option<u32>,

    /// Pinfall bowled before the league was tracked
    #[arg(long)]
    pub additional_pinfall: Option<u32>,

    /// Games bowled before the league was tracked
    #[arg(long)]
    pub additional_games: Option<u32>,
}

/// Series commands.
#[derive(Debug, Subcommand)]
pub enum SeriesCommand {
    /// Start a new series with empty games
    Add {
        /// League ID
        league: i64,
        /// Date bowled (YYYY-MM-DD), defaults to today
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDateTime>,
        /// Number of games (open league only)
        #[arg(short, long)]
        games: Option<u8>,
    },

    /// List a league's series, newest first
    List {
        /// League ID
        league: i64,
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Change the date of a series
    Date {
        /// Series ID
        id: i64,
        /// New date (YYYY-MM-DD)
        #[arg(value_parser = parse_date)]
        date: NaiveDateTime,
    },

    /// Delete a series and its games
    Delete {
        /// Series ID
        id: i64,
    },
}

/// Game commands.
#[derive(Debug, Subcommand)]
pub enum GameCommand {
    /// Show a game frame by frame
    Show {
        /// Game ID
        id: i64,
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Record the deck after one ball
    Frame {
        /// Game ID
        id: i64,
        /// Frame number (1-10)
        frame: usize,
        /// Ball number (1-3)
        ball: usize,
        /// Pins down after the ball, left to right, e.g. 01110
        deck: Deck,
        /// The ball was a foul
        #[arg(short, long)]
        foul: bool,
    },

    /// Enter a score by hand instead of frame by frame
    Manual {
        /// Game ID
        id: i64,
        /// Final score
        score: u32,
    },

    /// Record a match play result
    Match {
        /// Game ID
        id: i64,
        /// Result against the opponent
        #[arg(value_enum)]
        result: MatchPlayArg,
        /// Opponent's name
        #[arg(short, long)]
        opponent: Option<String>,
        /// Opponent's score
        #[arg(short = 's', long)]
        opponent_score: Option<u32>,
    },

    /// Prevent further edits to a game
    Lock {
        /// Game ID
        id: i64,
    },

    /// Allow edits to a locked game
    Unlock {
        /// Game ID
        id: i64,
    },
}

/// Statistics command arguments.
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// What to compute statistics for
    #[arg(value_enum)]
    pub unit: UnitArg,

    /// ID of the bowler, team, league, series or game
    pub id: i64,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

impl StatsCommand {
    /// The unit named on the command line.
    #[must_use]
    pub fn statistics_unit(&self) -> StatisticsUnit {
        match self.unit {
            UnitArg::Bowler => StatisticsUnit::Bowler(self.id),
            UnitArg::Team => StatisticsUnit::Team(self.id),
            UnitArg::League => StatisticsUnit::League(self.id),
            UnitArg::Series => StatisticsUnit::Series(self.id),
            UnitArg::Game => StatisticsUnit::Game(self.id),
        }
    }
}

/// Transfer server commands.
#[derive(Debug, Subcommand)]
pub enum TransferCommand {
    /// Check that the transfer server is reachable
    Status,

    /// Check whether a transfer key is valid
    Valid {
        /// Transfer key
        key: String,
    },

    /// Upload the database and print its transfer key
    Upload,

    /// Download a database next to the local one
    Download {
        /// Transfer key
        key: String,
        /// Replace the local database right away
        #[arg(short, long)]
        apply: bool,
    },

    /// Replace the local database with the last download
    Apply,

    /// Put back the database replaced by the last apply
    Restore,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Statistics unit argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UnitArg {
    /// All of a bowler's leagues
    Bowler,
    /// All leagues of a team's members
    Team,
    /// One league or event
    League,
    /// One series
    Series,
    /// One game
    Game,
}

/// Match play result argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MatchPlayArg {
    /// Clear the match play result
    None,
    /// Won
    Won,
    /// Lost
    Lost,
    /// Tied
    Tied,
}

impl From<MatchPlayArg> for MatchPlayResult {
    fn from(arg: MatchPlayArg) -> Self {
        match arg {
            MatchPlayArg::None => Self::None,
            MatchPlayArg::Won => Self::Won,
            MatchPlayArg::Lost => Self::Lost,
            MatchPlayArg::Tied => Self::Tied,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// JSON output
    Json,
}

/// Parse a `YYYY-MM-DD` day, or a full series date, to midnight.
fn parse_date(value: &str) -> Result<NaiveDateTime, String> {
    if let Ok(day) = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
        return Ok(day.and_time(NaiveTime::MIN));
    }
    series_date_to_date(value)
        .map(set_to_midnight)
        .map_err(|_| format!("expected a date like 2019-01-31, got '{value}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_play_arg_conversion() {
        assert_eq!(MatchPlayResult::from(MatchPlayArg::None), MatchPlayResult::None);
        assert_eq!(MatchPlayResult::from(MatchPlayArg::Won), MatchPlayResult::Won);
        assert_eq!(MatchPlayResult::from(MatchPlayArg::Lost), MatchPlayResult::Lost);
        assert_eq!(MatchPlayResult::from(MatchPlayArg::Tied), MatchPlayResult::Tied);
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Plain);
    }

    #[test]
    fn test_statistics_unit() {
        let cmd = StatsCommand {
            unit: UnitArg::Series,
            id: 7,
            format: OutputFormat::Json,
        };
        assert_eq!(cmd.statistics_unit(), StatisticsUnit::Series(7));
    }

    #[test]
    fn test_parse_date() {
        let expected = NaiveDate::from_ymd_opt(2019, 1, 31)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(parse_date("2019-01-31").unwrap(), expected);
        assert_eq!(parse_date("2019-01-31 18:30:00").unwrap(), expected);
        assert!(parse_date("31/01/2019").unwrap_err().contains("31/01/2019"));
    }

    #[test]
    fn test_league_settings_default() {
        let settings = LeagueSettings::default();
        assert!(settings.game_highlight.is_none());
        assert!(settings.additional_games.is_none());
    }
}
