//! Storage layer for bowling-companion.
//!
//! This module provides `SQLite`-based persistent storage for bowlers, teams,
//! leagues, series and games.

pub mod migrations;
pub mod schema;
mod series;
mod source;

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::{Bowler, League, Team, OPEN_LEAGUE_NAME};

/// Column list shared by league queries.
const LEAGUE_COLUMNS: &str = "id, bowler_id, name, is_event, games_per_series, \
     game_highlight, series_highlight, additional_pinfall, additional_games";

/// Storage engine for score data.
///
/// Provides persistent storage using `SQLite` with support for:
/// - Bowler, team and league management
/// - Series creation with empty games and frames
/// - Frame-by-frame game updates
/// - Loading the rows a statistics unit is computed from
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch(
            "PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA foreign_keys=ON;",
        )?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    // Bowlers

    /// Insert a bowler along with their open league.
    ///
    /// Returns the assigned ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or the database operation fails.
    pub fn insert_bowler(&self, bowler: &Bowler) -> Result<i64> {
        let name = validate_name("bowler", &bowler.name)?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute("INSERT INTO bowlers (name) VALUES (?1)", [name])?;
        let id = tx.last_insert_rowid();
        Self::insert_league_row(&tx, &League::open(id))?;
        tx.commit()?;

        debug!("Inserted bowler {} with id {}", name, id);
        Ok(id)
    }

    /// Get a bowler by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_bowler(&self, id: i64) -> Result<Option<Bowler>> {
        let bowler = self
            .conn
            .query_row(
                "SELECT id, name FROM bowlers WHERE id = ?1",
                [id],
                Self::row_to_bowler,
            )
            .optional()?;
        Ok(bowler)
    }

    /// List all bowlers by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_bowlers(&self) -> Result<Vec<Bowler>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM bowlers ORDER BY name COLLATE NOCASE, id")?;
        let bowlers = stmt
            .query_map([], Self::row_to_bowler)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(bowlers)
    }

    /// Rename a bowler.
    ///
    /// Returns `true` if a bowler was renamed, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or the database operation fails.
    pub fn rename_bowler(&self, id: i64, name: &str) -> Result<bool> {
        let name = validate_name("bowler", name)?;
        let affected = self
            .conn
            .execute("UPDATE bowlers SET name = ?1 WHERE id = ?2", params![name, id])?;
        Ok(affected > 0)
    }

    /// Delete a bowler and everything they bowled.
    ///
    /// Returns `true` if a bowler was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_bowler(&self, id: i64) -> Result<bool> {
        let affected = self.conn.execute("DELETE FROM bowlers WHERE id = ?1", [id])?;
        if affected > 0 {
            info!("Deleted bowler {}", id);
        }
        Ok(affected > 0)
    }

    fn row_to_bowler(row: &rusqlite::Row) -> rusqlite::Result<Bowler> {
        Ok(Bowler {
            id: Some(row.get(0)?),
            name: row.get(1)?,
        })
    }

    // Teams

    /// Insert a team with its members.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank, a member doesn't exist, or the
    /// database operation fails.
    pub fn insert_team(&self, team: &Team) -> Result<i64> {
        let name = validate_name("team", &team.name)?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute("INSERT INTO teams (name) VALUES (?1)", [name])?;
        let id = tx.last_insert_rowid();
        Self::write_members(&tx, id, &team.members)?;
        tx.commit()?;

        debug!("Inserted team {} with id {}", name, id);
        Ok(id)
    }

    /// Get a team and its members by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_team(&self, id: i64) -> Result<Option<Team>> {
        let team = self
            .conn
            .query_row("SELECT id, name FROM teams WHERE id = ?1", [id], |row| {
                Ok(Team {
                    id: Some(row.get(0)?),
                    name: row.get(1)?,
                    members: Vec::new(),
                })
            })
            .optional()?;

        match team {
            Some(mut team) => {
                team.members = self.team_members(id)?;
                Ok(Some(team))
            }
            None => Ok(None),
        }
    }

    /// List all teams by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_teams(&self) -> Result<Vec<Team>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM teams ORDER BY name COLLATE NOCASE, id")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, i64>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut teams = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(team) = self.get_team(id)? {
                teams.push(team);
            }
        }
        Ok(teams)
    }

    /// Replace a team's members.
    ///
    /// # Errors
    ///
    /// Returns an error if the team or a member doesn't exist.
    pub fn set_team_members(&self, team_id: i64, members: &[i64]) -> Result<()> {
        if self.get_team(team_id)?.is_none() {
            return Err(Error::not_found("team", team_id));
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM team_members WHERE team_id = ?1", [team_id])?;
        Self::write_members(&tx, team_id, members)?;
        tx.commit()?;
        Ok(())
    }

    /// Delete a team. Member bowlers are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_team(&self, id: i64) -> Result<bool> {
        let affected = self.conn.execute("DELETE FROM teams WHERE id = ?1", [id])?;
        Ok(affected > 0)
    }

    fn team_members(&self, team_id: i64) -> Result<Vec<i64>> {
        let mut stmt = self.conn.prepare(
            "SELECT bowler_id FROM team_members WHERE team_id = ?1 ORDER BY position",
        )?;
        let members = stmt
            .query_map([team_id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(members)
    }

    fn write_members(conn: &Connection, team_id: i64, members: &[i64]) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for (position, bowler_id) in members.iter().enumerate() {
            if !seen.insert(*bowler_id) {
                return Err(Error::invalid_input(format!(
                    "bowler {bowler_id} is listed twice"
                )));
            }
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM bowlers WHERE id = ?1)",
                [bowler_id],
                |row| row.get(0),
            )?;
            if !exists {
                return Err(Error::not_found("bowler", *bowler_id));
            }
            let position = i64::try_from(position).unwrap_or(i64::MAX);
            conn.execute(
                "INSERT INTO team_members (team_id, bowler_id, position) VALUES (?1, ?2, ?3)",
                params![team_id, bowler_id, position],
            )?;
        }
        Ok(())
    }

    // Leagues

    /// Insert a league or event for a bowler.
    ///
    /// # Errors
    ///
    /// Returns an error if the league is invalid, is named like the open
    /// league, duplicates an existing name, or the bowler doesn't exist.
    pub fn insert_league(&self, league: &League) -> Result<i64> {
        league.validate()?;
        if league.name.trim().eq_ignore_ascii_case(OPEN_LEAGUE_NAME) {
            return Err(Error::invalid_input(format!(
                "'{OPEN_LEAGUE_NAME}' is reserved for casual games"
            )));
        }
        if self.get_bowler(league.bowler_id)?.is_none() {
            return Err(Error::not_found("bowler", league.bowler_id));
        }
        self.ensure_unique_league_name(league.bowler_id, &league.name, None)?;

        let id = Self::insert_league_row(&self.conn, league)?;
        debug!("Inserted league {} with id {}", league.name, id);
        Ok(id)
    }

    fn insert_league_row(conn: &Connection, league: &League) -> Result<i64> {
        conn.execute(
            r"
            INSERT INTO leagues (bowler_id, name, is_event, games_per_series,
                game_highlight, series_highlight, additional_pinfall, additional_games)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
            params![
                league.bowler_id,
                league.name.trim(),
                league.is_event,
                league.games_per_series,
                league.game_highlight,
                league.series_highlight,
                league.additional_pinfall,
                league.additional_games,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Get a league by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_league(&self, id: i64) -> Result<Option<League>> {
        let league = self
            .conn
            .query_row(
                &format!("SELECT {LEAGUE_COLUMNS} FROM leagues WHERE id = ?1"),
                [id],
                Self::row_to_league,
            )
            .optional()?;
        Ok(league)
    }

    /// The bowler's open league.
    ///
    /// # Errors
    ///
    /// Returns an error if the bowler has no open league.
    pub fn open_league(&self, bowler_id: i64) -> Result<League> {
        self.conn
            .query_row(
                &format!("SELECT {LEAGUE_COLUMNS} FROM leagues WHERE bowler_id = ?1 AND name = ?2"),
                params![bowler_id, OPEN_LEAGUE_NAME],
                Self::row_to_league,
            )
            .optional()?
            .ok_or_else(|| Error::not_found("bowler", bowler_id))
    }

    /// List a bowler's leagues and events, open league first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_leagues(&self, bowler_id: i64) -> Result<Vec<League>> {
        let mut stmt = self.conn.prepare(&format!(
            r"
            SELECT {LEAGUE_COLUMNS} FROM leagues WHERE bowler_id = ?1
            ORDER BY name != ?2, is_event, name COLLATE NOCASE
            "
        ))?;
        let leagues = stmt
            .query_map(params![bowler_id, OPEN_LEAGUE_NAME], Self::row_to_league)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(leagues)
    }

    /// Update a league's settings.
    ///
    /// Returns `true` if a league was updated, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the league has no ID, is invalid, or would rename
    /// to or from the open league.
    pub fn update_league(&self, league: &League) -> Result<bool> {
        let id = league
            .id
            .ok_or_else(|| Error::invalid_input("league has not been saved"))?;
        league.validate()?;

        let Some(existing) = self.get_league(id)? else {
            return Ok(false);
        };
        let renaming_open = existing.is_open() && league.name.trim() != OPEN_LEAGUE_NAME;
        let renaming_to_open =
            !existing.is_open() && league.name.trim().eq_ignore_ascii_case(OPEN_LEAGUE_NAME);
        if renaming_open || renaming_to_open {
            return Err(Error::invalid_input(format!(
                "the '{OPEN_LEAGUE_NAME}' league can't be renamed"
            )));
        }
        if existing.is_event != league.is_event {
            return Err(Error::invalid_input(
                "a league can't be changed to or from an event",
            ));
        }
        self.ensure_unique_league_name(existing.bowler_id, &league.name, Some(id))?;

        let affected = self.conn.execute(
            r"
            UPDATE leagues SET name = ?1, games_per_series = ?2, game_highlight = ?3,
                series_highlight = ?4, additional_pinfall = ?5, additional_games = ?6
            WHERE id = ?7
            ",
            params![
                league.name.trim(),
                league.games_per_series,
                league.game_highlight,
                league.series_highlight,
                league.additional_pinfall,
                league.additional_games,
                id,
            ],
        )?;
        Ok(affected > 0)
    }

    /// Delete a league and its series.
    ///
    /// # Errors
    ///
    /// Returns an error if the league is the bowler's open league.
    pub fn delete_league(&self, id: i64) -> Result<bool> {
        match self.get_league(id)? {
            Some(league) if league.is_open() => Err(Error::invalid_input(format!(
                "the '{OPEN_LEAGUE_NAME}' league can't be deleted"
            ))),
            Some(_) => {
                let affected = self.conn.execute("DELETE FROM leagues WHERE id = ?1", [id])?;
                info!("Deleted league {}", id);
                Ok(affected > 0)
            }
            None => Ok(false),
        }
    }

    fn ensure_unique_league_name(
        &self,
        bowler_id: i64,
        name: &str,
        except: Option<i64>,
    ) -> Result<()> {
        let taken: bool = self.conn.query_row(
            r"
            SELECT EXISTS(SELECT 1 FROM leagues
                WHERE bowler_id = ?1 AND name = ?2 COLLATE NOCASE AND id != ?3)
            ",
            params![bowler_id, name.trim(), except.unwrap_or(-1)],
            |row| row.get(0),
        )?;
        if taken {
            return Err(Error::invalid_input(format!(
                "a league named '{}' already exists",
                name.trim()
            )));
        }
        Ok(())
    }

    fn row_to_league(row: &rusqlite::Row) -> rusqlite::Result<League> {
        Ok(League {
            id: Some(row.get(0)?),
            bowler_id: row.get(1)?,
            name: row.get(2)?,
            is_event: row.get(3)?,
            games_per_series: row.get(4)?,
            game_highlight: row.get(5)?,
            series_highlight: row.get(6)?,
            additional_pinfall: row.get(7)?,
            additional_games: row.get(8)?,
        })
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let count = |table: &str| -> Result<i64> {
            let n = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                    row.get(0)
                })?;
            Ok(n)
        };

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            bowlers: count("bowlers")?,
            teams: count("teams")?,
            leagues: count("leagues")?,
            series: count("series")?,
            games: count("games")?,
            db_size_bytes,
        })
    }

    /// Write the WAL back into the database file and truncate it.
    ///
    /// Run before the file is copied or uploaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkpoint fails.
    pub fn checkpoint(&self) -> Result<()> {
        self.conn
            .query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))?;
        debug!("Checkpointed {}", self.path.display());
        Ok(())
    }
}

/// Trim a name and reject it if blank.
fn validate_name<'a>(entity: &str, name: &'a str) -> Result<&'a str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_input(format!("{entity} name cannot be empty")));
    }
    Ok(trimmed)
}

/// Row counts and file size of the database.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StorageStats {
    /// Number of bowlers.
    pub bowlers: i64,
    /// Number of teams.
    pub teams: i64,
    /// Number of leagues and events, open leagues included.
    pub leagues: i64,
    /// Number of series.
    pub series: i64,
    /// Number of games.
    pub games: i64,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
