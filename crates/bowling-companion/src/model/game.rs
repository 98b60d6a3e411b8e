//! Frames, games and five-pin scoring.

use serde::{Deserialize, Serialize};

use super::pins::{Deck, FirstBallKind, MAX_DECK_VALUE};
use crate::error::{Error, Result};

/// Frames in a game.
pub const NUMBER_OF_FRAMES: usize = 10;

/// Balls in a frame.
pub const NUMBER_OF_BALLS: usize = 3;

/// Highest possible five-pin score.
pub const MAX_SCORE: u32 = 450;

/// Points deducted for each foul.
pub const FOUL_PENALTY: u32 = 15;

/// A single frame of a game.
///
/// `balls` holds the cumulative deck after each ball. In frames 1 to 9 a pin
/// never gets back up, and a cleared deck stays cleared for the remaining
/// balls. In the tenth frame the rack is reset after every cleared deck, so
/// the following ball starts from a standing deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// 1-based position in the game.
    pub ordinal: u8,
    /// Deck state after each ball.
    pub balls: [Deck; NUMBER_OF_BALLS],
    /// Whether each ball was a foul.
    pub fouls: [bool; NUMBER_OF_BALLS],
    /// Whether the frame has been recorded.
    pub is_accessed: bool,
}

impl Frame {
    /// Create an untouched frame.
    #[must_use]
    pub fn new(ordinal: u8) -> Self {
        Self {
            ordinal,
            balls: [Deck::standing(); NUMBER_OF_BALLS],
            fouls: [false; NUMBER_OF_BALLS],
            is_accessed: false,
        }
    }

    /// Whether this is the tenth frame.
    #[must_use]
    pub fn is_last(&self) -> bool {
        usize::from(self.ordinal) == NUMBER_OF_FRAMES
    }

    /// Deck a ball starts from: empty after a reset, otherwise the previous ball.
    fn starting_deck(&self, ball: usize) -> Deck {
        if ball == 0 {
            return Deck::standing();
        }
        let previous = self.balls[ball - 1];
        if previous.is_cleared() && self.is_last() {
            Deck::standing()
        } else {
            previous
        }
    }

    /// Record the deck after `ball`.
    ///
    /// Pins already down stay down, and later balls are brought in line with
    /// the new state.
    ///
    /// # Errors
    ///
    /// Returns an error if `ball` is out of range.
    pub fn set_ball(&mut self, ball: usize, deck: Deck) -> Result<()> {
        if ball >= NUMBER_OF_BALLS {
            return Err(Error::invalid_input(format!(
                "ball must be between 1 and {NUMBER_OF_BALLS}"
            )));
        }

        self.balls[ball] = self.starting_deck(ball).merge(&deck);
        for next in (ball + 1)..NUMBER_OF_BALLS {
            let start = self.starting_deck(next);
            self.balls[next] = if self.is_last() && start == Deck::standing() {
                self.balls[next]
            } else {
                self.balls[next].merge(&start)
            };
        }
        self.is_accessed = true;
        Ok(())
    }

    /// Pins knocked down by a single ball.
    #[must_use]
    pub fn ball_value(&self, ball: usize) -> u32 {
        self.balls[ball]
            .value()
            .saturating_sub(self.starting_deck(ball).value())
    }

    /// Classification of the first ball.
    #[must_use]
    pub fn first_ball_kind(&self) -> FirstBallKind {
        self.balls[0].first_ball_kind()
    }

    /// Whether the first ball cleared the deck.
    #[must_use]
    pub fn is_strike(&self) -> bool {
        self.balls[0].is_cleared()
    }

    /// Whether the deck was cleared on the second ball.
    #[must_use]
    pub fn is_spare(&self) -> bool {
        !self.balls[0].is_cleared() && self.balls[1].is_cleared()
    }

    /// Value of the pins still standing after the last ball.
    #[must_use]
    pub fn pins_left_on_deck(&self) -> u32 {
        self.balls[NUMBER_OF_BALLS - 1].pins_left_value()
    }

    /// Number of fouls in the frame.
    #[must_use]
    pub fn foul_count(&self) -> u32 {
        self.fouls.iter().map(|f| u32::from(*f)).sum()
    }
}

/// Result of a match play game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPlayResult {
    /// Not played against an opponent.
    #[default]
    None,
    /// Won.
    Won,
    /// Lost.
    Lost,
    /// Tied.
    Tied,
}

impl std::fmt::Display for MatchPlayResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Won => write!(f, "won"),
            Self::Lost => write!(f, "lost"),
            Self::Tied => write!(f, "tied"),
        }
    }
}

impl MatchPlayResult {
    /// Parse the stored representation, falling back to `None`.
    #[must_use]
    pub fn from_db(value: &str) -> Self {
        match value {
            "won" => Self::Won,
            "lost" => Self::Lost,
            "tied" => Self::Tied,
            _ => Self::None,
        }
    }
}

/// Match play details for a game.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MatchPlay {
    /// Outcome.
    pub result: MatchPlayResult,
    /// Opponent's name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent_name: Option<String>,
    /// Opponent's score.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent_score: Option<u32>,
}

/// A single game in a series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    /// Unique identifier (assigned by storage layer).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Series this game belongs to.
    pub series_id: i64,
    /// 1-based slot in the series.
    pub ordinal: u8,
    /// Exactly [`NUMBER_OF_FRAMES`] frames.
    pub frames: Vec<Frame>,
    /// Whether the score was entered by hand instead of frame by frame.
    pub is_manual: bool,
    /// Score used when `is_manual` is set.
    pub manual_score: u32,
    /// Locked games can't be edited.
    pub is_locked: bool,
    /// Match play details.
    pub match_play: MatchPlay,
}

impl Game {
    /// Create an empty game with ten untouched frames.
    #[must_use]
    pub fn new(series_id: i64, ordinal: u8) -> Self {
        Self {
            id: None,
            series_id,
            ordinal,
            frames: (1..=NUMBER_OF_FRAMES)
                .map(|n| Frame::new(u8::try_from(n).unwrap_or(u8::MAX)))
                .collect(),
            is_manual: false,
            manual_score: 0,
            is_locked: false,
            match_play: MatchPlay::default(),
        }
    }

    /// Check that the game has a full set of frames.
    ///
    /// # Errors
    ///
    /// Returns an error if the frames are missing or out of order.
    pub fn validate(&self) -> Result<()> {
        if self.frames.len() != NUMBER_OF_FRAMES {
            return Err(Error::invalid_input(format!(
                "game must have {NUMBER_OF_FRAMES} frames, found {}",
                self.frames.len()
            )));
        }
        for (i, frame) in self.frames.iter().enumerate() {
            if usize::from(frame.ordinal) != i + 1 {
                return Err(Error::invalid_input(format!(
                    "frame {} is stored at position {}",
                    frame.ordinal,
                    i + 1
                )));
            }
        }
        if self.is_manual && self.manual_score > MAX_SCORE {
            return Err(Error::invalid_input(format!(
                "score {} exceeds the maximum of {MAX_SCORE}",
                self.manual_score
            )));
        }
        Ok(())
    }

    /// Set a fixed score, replacing frame-by-frame scoring.
    ///
    /// # Errors
    ///
    /// Returns an error if the game is locked or the score is out of range.
    pub fn set_manual_score(&mut self, score: u32) -> Result<()> {
        self.ensure_unlocked()?;
        if score > MAX_SCORE {
            return Err(Error::invalid_input(format!(
                "score {score} exceeds the maximum of {MAX_SCORE}"
            )));
        }
        self.is_manual = true;
        self.manual_score = score;
        Ok(())
    }

    /// Record one ball of one frame. Clears manual scoring.
    ///
    /// # Errors
    ///
    /// Returns an error if the game is locked or the frame/ball is out of range.
    pub fn set_ball(&mut self, frame: usize, ball: usize, deck: Deck, foul: bool) -> Result<()> {
        self.ensure_unlocked()?;
        let target = frame
            .checked_sub(1)
            .and_then(|i| self.frames.get_mut(i))
            .ok_or_else(|| {
                Error::invalid_input(format!("frame must be between 1 and {NUMBER_OF_FRAMES}"))
            })?;
        target.set_ball(ball, deck)?;
        target.fouls[ball] = foul;
        self.is_manual = false;
        self.manual_score = 0;
        Ok(())
    }

    fn ensure_unlocked(&self) -> Result<()> {
        if self.is_locked {
            return Err(Error::invalid_input(format!(
                "game {} is locked",
                self.ordinal
            )));
        }
        Ok(())
    }

    /// Cumulative score after each frame, before foul penalties.
    #[must_use]
    pub fn frame_scores(&self) -> Vec<u32> {
        let mut running = 0;
        (0..self.frames.len())
            .map(|i| {
                running += self.frame_value(i);
                running
            })
            .collect()
    }

    fn frame_value(&self, index: usize) -> u32 {
        let frame = &self.frames[index];
        if frame.is_last() || index + 1 >= self.frames.len() {
            let bonus: u32 = frame.balls[..NUMBER_OF_BALLS - 1]
                .iter()
                .filter(|deck| deck.is_cleared())
                .map(|_| MAX_DECK_VALUE)
                .sum();
            return frame.balls[NUMBER_OF_BALLS - 1].value() + bonus;
        }

        let next = &self.frames[index + 1];
        if frame.is_strike() {
            let mut value = MAX_DECK_VALUE + next.balls[0].value();
            if next.is_strike() {
                value += if next.is_last() {
                    next.balls[1].value()
                } else {
                    self.frames
                        .get(index + 2)
                        .map_or(0, |after| after.balls[0].value())
                };
            } else {
                value += next.balls[1].value().saturating_sub(next.balls[0].value());
            }
            value
        } else if frame.is_spare() {
            MAX_DECK_VALUE + next.balls[0].value()
        } else {
            frame.balls[NUMBER_OF_BALLS - 1].value()
        }
    }

    /// Total fouls across all frames.
    #[must_use]
    pub fn foul_count(&self) -> u32 {
        self.frames.iter().map(Frame::foul_count).sum()
    }

    /// Final score, after foul penalties.
    #[must_use]
    pub fn score(&self) -> u32 {
        if self.is_manual {
            return self.manual_score;
        }
        let raw = self.frame_scores().last().copied().unwrap_or(0);
        raw.saturating_sub(self.foul_count() * FOUL_PENALTY)
    }

    /// Frames that have been recorded, skipped for manual games.
    pub fn accessed_frames(&self) -> impl Iterator<Item = &Frame> {
        let manual = self.is_manual;
        self.frames
            .iter()
            .filter(move |frame| !manual && frame.is_accessed)
    }
}
