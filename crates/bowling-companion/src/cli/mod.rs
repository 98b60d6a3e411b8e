//! Command-line interface for bowling-companion.
//!
//! This module provides the CLI structure, the command definitions and the
//! plain-text rendering used by the `bowlc` binary.

mod commands;
pub mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    BowlerCommand, ConfigCommand, GameCommand, LeagueAddCommand, LeagueCommand, LeagueSettings,
    LeagueUpdateCommand, MatchPlayArg, OutputFormat, SeriesCommand, StatsCommand, StatusCommand,
    TeamCommand, TransferCommand, UnitArg,
};

/// bowlc - Keep score of your five-pin bowling
///
/// Tracks bowlers, teams, leagues and series frame by frame, computes
/// statistics, and backs the database up to a transfer server.
#[derive(Debug, Parser)]
#[command(name = "bowlc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage bowlers
    #[command(subcommand)]
    Bowler(BowlerCommand),

    /// Manage teams
    #[command(subcommand)]
    Team(TeamCommand),

    /// Manage leagues and events
    #[command(subcommand)]
    League(LeagueCommand),

    /// Manage series
    #[command(subcommand)]
    Series(SeriesCommand),

    /// View and score games
    #[command(subcommand)]
    Game(GameCommand),

    /// Compute statistics
    Stats(StatsCommand),

    /// Back up and restore through the transfer server
    #[command(subcommand)]
    Transfer(TransferCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Show database status
    Status(StatusCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
