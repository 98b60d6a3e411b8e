//! Core domain types for bowling-companion.
//!
//! Bowlers own leagues, leagues hold series, and series hold games of ten
//! five-pin frames.

mod entities;
mod game;
mod pins;

pub use entities::{
    Bowler, League, Series, Team, DEFAULT_GAME_HIGHLIGHT, DEFAULT_SERIES_HIGHLIGHT,
    MAX_GAMES_PER_SERIES, OPEN_LEAGUE_NAME,
};
pub use game::{
    Frame, Game, MatchPlay, MatchPlayResult, FOUL_PENALTY, MAX_SCORE, NUMBER_OF_BALLS,
    NUMBER_OF_FRAMES,
};
pub use pins::{Deck, FirstBallKind, Pin, MAX_DECK_VALUE, NUMBER_OF_PINS};
