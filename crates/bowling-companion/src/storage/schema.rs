//! `SQLite` schema definitions for bowling-companion.
//!
//! Ownership flows bowler → league → series → game → frame, and every child
//! row is removed with its parent.

/// SQL statement to create the bowlers table.
pub const CREATE_BOWLERS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS bowlers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// SQL statement to create the teams table.
pub const CREATE_TEAMS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS teams (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// SQL statement to create the team membership table.
pub const CREATE_TEAM_MEMBERS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS team_members (
    team_id INTEGER NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
    bowler_id INTEGER NOT NULL REFERENCES bowlers(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    PRIMARY KEY (team_id, bowler_id)
)
";

/// SQL statement to create the leagues table.
pub const CREATE_LEAGUES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS leagues (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    bowler_id INTEGER NOT NULL REFERENCES bowlers(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    is_event INTEGER NOT NULL DEFAULT 0,
    games_per_series INTEGER NOT NULL,
    game_highlight INTEGER NOT NULL,
    series_highlight INTEGER NOT NULL,
    additional_pinfall INTEGER NOT NULL DEFAULT 0,
    additional_games INTEGER NOT NULL DEFAULT 0,
    UNIQUE (bowler_id, name)
)
";

/// SQL statement to create the series table.
pub const CREATE_SERIES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS series (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    league_id INTEGER NOT NULL REFERENCES leagues(id) ON DELETE CASCADE,
    series_date TEXT NOT NULL
)
";

/// SQL statement to create the games table.
pub const CREATE_GAMES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS games (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    series_id INTEGER NOT NULL REFERENCES series(id) ON DELETE CASCADE,
    game_number INTEGER NOT NULL,
    is_manual INTEGER NOT NULL DEFAULT 0,
    manual_score INTEGER NOT NULL DEFAULT 0,
    is_locked INTEGER NOT NULL DEFAULT 0,
    match_play TEXT NOT NULL DEFAULT 'none',
    opponent_name TEXT,
    opponent_score INTEGER,
    UNIQUE (series_id, game_number)
)
";

/// SQL statement to create the frames table.
///
/// Ball columns hold five-bit pin masks, bit 0 being the left two pin.
pub const CREATE_FRAMES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS frames (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    game_id INTEGER NOT NULL REFERENCES games(id) ON DELETE CASCADE,
    frame_number INTEGER NOT NULL,
    is_accessed INTEGER NOT NULL DEFAULT 0,
    ball1 INTEGER NOT NULL DEFAULT 0,
    ball2 INTEGER NOT NULL DEFAULT 0,
    ball3 INTEGER NOT NULL DEFAULT 0,
    fouls INTEGER NOT NULL DEFAULT 0,
    UNIQUE (game_id, frame_number)
)
";

/// SQL statement to index leagues by owner.
pub const CREATE_LEAGUE_BOWLER_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_leagues_bowler ON leagues(bowler_id)
";

/// SQL statement to index series by league and date.
pub const CREATE_SERIES_LEAGUE_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_series_league ON series(league_id, series_date DESC)
";

/// SQL statement to index games by series.
pub const CREATE_GAMES_SERIES_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_games_series ON games(series_id)
";

/// SQL statement to index frames by game.
pub const CREATE_FRAMES_GAME_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_frames_game ON frames(game_id)
";

/// SQL statement to index team membership by bowler.
pub const CREATE_TEAM_MEMBERS_BOWLER_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_team_members_bowler ON team_members(bowler_id)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_BOWLERS_TABLE,
    CREATE_TEAMS_TABLE,
    CREATE_TEAM_MEMBERS_TABLE,
    CREATE_LEAGUES_TABLE,
    CREATE_SERIES_TABLE,
    CREATE_GAMES_TABLE,
    CREATE_FRAMES_TABLE,
    CREATE_LEAGUE_BOWLER_INDEX,
    CREATE_SERIES_LEAGUE_INDEX,
    CREATE_GAMES_SERIES_INDEX,
    CREATE_FRAMES_GAME_INDEX,
    CREATE_TEAM_MEMBERS_BOWLER_INDEX,
    CREATE_METADATA_TABLE,
];
