//! Series, game and frame persistence.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use super::Storage;
use crate::dates::{date_to_series_date, SERIES_DATE_FORMAT};
use crate::error::{Error, Result};
use crate::model::{
    Deck, Frame, Game, MatchPlay, MatchPlayResult, Series, MAX_GAMES_PER_SERIES, MAX_SCORE,
    NUMBER_OF_BALLS, NUMBER_OF_FRAMES,
};

const GAME_COLUMNS: &str = "g.id, g.series_id, g.game_number, g.is_manual, g.manual_score, \
     g.is_locked, g.match_play, g.opponent_name, g.opponent_score";

const FRAME_COLUMNS: &str =
    "f.game_id, f.frame_number, f.is_accessed, f.ball1, f.ball2, f.ball3, f.fouls";

impl Storage {
    /// Create a series of empty games in a league.
    ///
    /// `games` overrides the number of games, which only the open league
    /// allows.
    ///
    /// # Errors
    ///
    /// Returns an error if the league doesn't exist, the event already has
    /// its series, or the number of games is out of range.
    pub fn insert_series(
        &self,
        league_id: i64,
        date: NaiveDateTime,
        games: Option<u8>,
    ) -> Result<i64> {
        let league = self
            .get_league(league_id)?
            .ok_or_else(|| Error::not_found("league", league_id))?;

        if league.is_event && self.series_count(league_id)? > 0 {
            return Err(Error::invalid_input(format!(
                "event '{}' already has its series",
                league.name
            )));
        }

        let count = match games {
            Some(n) if n != league.games_per_series && !league.is_open() => {
                return Err(Error::invalid_input(format!(
                    "league '{}' bowls {} games per series",
                    league.name, league.games_per_series
                )));
            }
            Some(n) => n,
            None => league.games_per_series,
        };
        if count == 0 || count > MAX_GAMES_PER_SERIES {
            return Err(Error::invalid_input(format!(
                "games per series must be between 1 and {MAX_GAMES_PER_SERIES}"
            )));
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO series (league_id, series_date) VALUES (?1, ?2)",
            params![league_id, date_to_series_date(&date)],
        )?;
        let series_id = tx.last_insert_rowid();
        for ordinal in 1..=count {
            Self::insert_game_rows(&tx, series_id, ordinal)?;
        }
        tx.commit()?;

        debug!(
            "Inserted series {} with {} games in league {}",
            series_id, count, league_id
        );
        Ok(series_id)
    }

    fn insert_game_rows(conn: &Connection, series_id: i64, ordinal: u8) -> Result<()> {
        conn.execute(
            "INSERT INTO games (series_id, game_number) VALUES (?1, ?2)",
            params![series_id, ordinal],
        )?;
        let game_id = conn.last_insert_rowid();
        let mut stmt =
            conn.prepare_cached("INSERT INTO frames (game_id, frame_number) VALUES (?1, ?2)")?;
        for frame in 1..=NUMBER_OF_FRAMES {
            let frame = i64::try_from(frame).unwrap_or(i64::MAX);
            stmt.execute(params![game_id, frame])?;
        }
        Ok(())
    }

    fn series_count(&self, league_id: i64) -> Result<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM series WHERE league_id = ?1",
            [league_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Get a series and its games by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_series(&self, id: i64) -> Result<Option<Series>> {
        let series = self
            .conn
            .query_row(
                "SELECT id, league_id, series_date FROM series WHERE id = ?1",
                [id],
                Self::row_to_series,
            )
            .optional()?;

        match series {
            Some(mut series) => {
                series.games = self.list_games(id)?;
                Ok(Some(series))
            }
            None => Ok(None),
        }
    }

    /// List a league's series, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_series(&self, league_id: i64) -> Result<Vec<Series>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, league_id, series_date FROM series WHERE league_id = ?1
            ORDER BY series_date DESC, id DESC
            ",
        )?;
        let mut series = stmt
            .query_map([league_id], Self::row_to_series)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for s in &mut series {
            if let Some(id) = s.id {
                s.games = self.list_games(id)?;
            }
        }
        Ok(series)
    }

    /// Change the date a series was bowled.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn set_series_date(&self, id: i64, date: NaiveDateTime) -> Result<bool> {
        let affected = self.conn.execute(
            "UPDATE series SET series_date = ?1 WHERE id = ?2",
            params![date_to_series_date(&date), id],
        )?;
        Ok(affected > 0)
    }

    /// Delete a series and its games.
    ///
    /// # Errors
    ///
    /// Returns an error if the series belongs to an event.
    pub fn delete_series(&self, id: i64) -> Result<bool> {
        let is_event: Option<bool> = self
            .conn
            .query_row(
                r"
                SELECT l.is_event FROM series s JOIN leagues l ON l.id = s.league_id
                WHERE s.id = ?1
                ",
                [id],
                |row| row.get(0),
            )
            .optional()?;

        match is_event {
            Some(true) => Err(Error::invalid_input(
                "an event's series can only be removed with the event",
            )),
            Some(false) => {
                let affected = self.conn.execute("DELETE FROM series WHERE id = ?1", [id])?;
                info!("Deleted series {}", id);
                Ok(affected > 0)
            }
            None => Ok(false),
        }
    }

    fn row_to_series(row: &rusqlite::Row) -> rusqlite::Result<Series> {
        let date: String = row.get(2)?;
        let date = NaiveDateTime::parse_from_str(&date, SERIES_DATE_FORMAT)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;
        Ok(Series {
            id: Some(row.get(0)?),
            league_id: row.get(1)?,
            date,
            games: Vec::new(),
        })
    }

    // Games

    /// Get a game and its frames by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_game(&self, id: i64) -> Result<Option<Game>> {
        let game = self
            .conn
            .query_row(
                &format!("SELECT {GAME_COLUMNS} FROM games g WHERE g.id = ?1"),
                [id],
                Self::row_to_game,
            )
            .optional()?;

        let Some(game) = game else {
            return Ok(None);
        };
        let mut games = vec![game];
        self.attach_frames(
            &mut games,
            &format!("SELECT {FRAME_COLUMNS} FROM frames f WHERE f.game_id = ?1"),
            id,
        )?;
        Ok(games.pop())
    }

    /// List a series' games in slot order, frames included.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_games(&self, series_id: i64) -> Result<Vec<Game>> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT {GAME_COLUMNS} FROM games g WHERE g.series_id = ?1 ORDER BY g.game_number"
        ))?;
        let mut games = stmt
            .query_map([series_id], Self::row_to_game)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        self.attach_frames(
            &mut games,
            &format!(
                r"
                SELECT {FRAME_COLUMNS} FROM frames f JOIN games g ON g.id = f.game_id
                WHERE g.series_id = ?1
                "
            ),
            series_id,
        )?;
        Ok(games)
    }

    fn attach_frames(&self, games: &mut [Game], sql: &str, param: i64) -> Result<()> {
        let index: HashMap<i64, usize> = games
            .iter()
            .enumerate()
            .filter_map(|(i, g)| g.id.map(|id| (id, i)))
            .collect();

        let mut stmt = self.conn.prepare_cached(sql)?;
        let rows = stmt
            .query_map([param], |row| Ok((row.get::<_, i64>(0)?, Self::row_to_frame(row)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for (game_id, frame) in rows {
            let slot = index
                .get(&game_id)
                .and_then(|i| games.get_mut(*i))
                .and_then(|g| g.frames.get_mut(usize::from(frame.ordinal).wrapping_sub(1)));
            if let Some(slot) = slot {
                *slot = frame;
            }
        }
        Ok(())
    }

    /// Write a game's frames, score and match play.
    ///
    /// # Errors
    ///
    /// Returns an error if the game was never saved, is locked, or is invalid.
    pub fn save_game(&self, game: &Game) -> Result<()> {
        let id = game
            .id
            .ok_or_else(|| Error::invalid_input("game has not been saved"))?;
        game.validate()?;
        self.ensure_game_unlocked(id)?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            r"
            UPDATE games SET is_manual = ?1, manual_score = ?2, match_play = ?3,
                opponent_name = ?4, opponent_score = ?5
            WHERE id = ?6
            ",
            params![
                game.is_manual,
                game.manual_score,
                game.match_play.result.to_string(),
                game.match_play.opponent_name,
                game.match_play.opponent_score,
                id,
            ],
        )?;
        {
            let mut stmt = tx.prepare_cached(
                r"
                UPDATE frames SET is_accessed = ?1, ball1 = ?2, ball2 = ?3, ball3 = ?4, fouls = ?5
                WHERE game_id = ?6 AND frame_number = ?7
                ",
            )?;
            for frame in &game.frames {
                stmt.execute(params![
                    frame.is_accessed,
                    frame.balls[0].to_mask(),
                    frame.balls[1].to_mask(),
                    frame.balls[2].to_mask(),
                    fouls_to_mask(&frame.fouls),
                    id,
                    frame.ordinal,
                ])?;
            }
        }
        tx.commit()?;

        debug!("Saved game {} with score {}", id, game.score());
        Ok(())
    }

    /// Record one ball of a game and save it.
    ///
    /// `frame` is 1-based, `ball` is 0-based.
    ///
    /// # Errors
    ///
    /// Returns an error if the game doesn't exist, is locked, or the frame or
    /// ball is out of range.
    pub fn record_ball(
        &self,
        game_id: i64,
        frame: usize,
        ball: usize,
        deck: Deck,
        foul: bool,
    ) -> Result<Game> {
        let mut game = self.require_game(game_id)?;
        game.set_ball(frame, ball, deck, foul)?;
        self.save_game(&game)?;
        Ok(game)
    }

    /// Replace frame-by-frame scoring with a fixed score.
    ///
    /// # Errors
    ///
    /// Returns an error if the game doesn't exist, is locked, or the score is
    /// out of range.
    pub fn set_manual_score(&self, game_id: i64, score: u32) -> Result<Game> {
        let mut game = self.require_game(game_id)?;
        game.set_manual_score(score)?;
        self.save_game(&game)?;
        Ok(game)
    }

    /// Record the outcome against an opponent.
    ///
    /// # Errors
    ///
    /// Returns an error if the game doesn't exist, is locked, or the
    /// opponent's score is out of range.
    pub fn set_match_play(&self, game_id: i64, match_play: MatchPlay) -> Result<Game> {
        if match_play.opponent_score.is_some_and(|s| s > MAX_SCORE) {
            return Err(Error::invalid_input(format!(
                "opponent score exceeds the maximum of {MAX_SCORE}"
            )));
        }
        let mut game = self.require_game(game_id)?;
        game.match_play = if match_play.result == MatchPlayResult::None {
            MatchPlay::default()
        } else {
            match_play
        };
        self.save_game(&game)?;
        Ok(game)
    }

    /// Lock or unlock a game.
    ///
    /// Returns `true` if a game was updated, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn set_game_locked(&self, game_id: i64, locked: bool) -> Result<bool> {
        let affected = self.conn.execute(
            "UPDATE games SET is_locked = ?1 WHERE id = ?2",
            params![locked, game_id],
        )?;
        Ok(affected > 0)
    }

    fn require_game(&self, game_id: i64) -> Result<Game> {
        self.get_game(game_id)?
            .ok_or_else(|| Error::not_found("game", game_id))
    }

    fn ensure_game_unlocked(&self, game_id: i64) -> Result<()> {
        let locked: Option<bool> = self
            .conn
            .query_row(
                "SELECT is_locked FROM games WHERE id = ?1",
                [game_id],
                |row| row.get(0),
            )
            .optional()?;
        match locked {
            None => Err(Error::not_found("game", game_id)),
            Some(true) => Err(Error::invalid_input(format!("game {game_id} is locked"))),
            Some(false) => Ok(()),
        }
    }

    fn row_to_game(row: &rusqlite::Row) -> rusqlite::Result<Game> {
        let mut game = Game::new(row.get(1)?, row.get(2)?);
        game.id = Some(row.get(0)?);
        game.is_manual = row.get(3)?;
        game.manual_score = row.get(4)?;
        game.is_locked = row.get(5)?;
        let result: String = row.get(6)?;
        game.match_play = MatchPlay {
            result: MatchPlayResult::from_db(&result),
            opponent_name: row.get(7)?,
            opponent_score: row.get(8)?,
        };
        Ok(game)
    }

    /// Expects [`FRAME_COLUMNS`] with the game id first.
    fn row_to_frame(row: &rusqlite::Row) -> rusqlite::Result<Frame> {
        let mut frame = Frame::new(row.get(1)?);
        frame.is_accessed = row.get(2)?;
        for ball in 0..NUMBER_OF_BALLS {
            frame.balls[ball] = Deck::from_mask(row.get(3 + ball)?);
        }
        let fouls: u8 = row.get(6)?;
        frame.fouls = fouls_from_mask(fouls);
        Ok(frame)
    }
}

fn fouls_to_mask(fouls: &[bool; NUMBER_OF_BALLS]) -> u8 {
    fouls
        .iter()
        .enumerate()
        .filter(|(_, foul)| **foul)
        .fold(0, |mask, (i, _)| mask | (1 << i))
}

fn fouls_from_mask(mask: u8) -> [bool; NUMBER_OF_BALLS] {
    std::array::from_fn(|i| mask & (1 << i) != 0)
}
