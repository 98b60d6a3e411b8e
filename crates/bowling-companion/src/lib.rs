//! `bowling-companion` - Five-pin bowling score tracking
//!
//! This library provides bowler, team, league and series management on top
//! of a local `SQLite` database, frame-by-frame five-pin scoring, statistics
//! over any slice of the recorded games, and backup of the database through
//! a transfer server.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod dates;
pub mod error;
pub mod logging;
pub mod model;
pub mod statistics;
pub mod storage;
pub mod transfer;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use model::{Bowler, Deck, Frame, Game, League, MatchPlay, MatchPlayResult, Series, Team};
pub use statistics::{compute, StatisticsReport, StatisticsUnit};
pub use storage::{Storage, StorageStats};
pub use transfer::{
    ServerError, State, TransferEvent, TransferHandle, TransferServerConnection, UserData,
};
