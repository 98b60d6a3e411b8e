//! `bowlc` - CLI for bowling-companion
//!
//! This binary provides the command-line interface for recording five-pin
//! games, viewing statistics and transferring the database.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use chrono::Local;
use clap::Parser;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::debug;

use bowling_companion::cli::{
    render, BowlerCommand, Cli, Command, ConfigCommand, GameCommand, LeagueCommand,
    LeagueSettings, OutputFormat, SeriesCommand, StatsCommand, TeamCommand, TransferCommand,
};
use bowling_companion::dates::set_to_midnight;
use bowling_companion::{
    compute, init_logging, Bowler, Config, Error, League, MatchPlay, Storage, Team,
    TransferEvent, TransferServerConnection, UserData,
};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[tokio::main]
async fn main() -> CliResult {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Bowler(cmd) => handle_bowler(&config, cmd),
        Command::Team(cmd) => handle_team(&config, cmd),
        Command::League(cmd) => handle_league(&config, cmd),
        Command::Series(cmd) => handle_series(&config, cmd),
        Command::Game(cmd) => handle_game(&config, cmd),
        Command::Stats(cmd) => handle_stats(&config, &cmd),
        Command::Transfer(cmd) => handle_transfer(&config, cmd, cli.quiet).await,
        Command::Config(cmd) => handle_config(&config, cmd),
        Command::Status(cmd) => handle_status(&config, cmd.json),
    }
}

fn open_storage(config: &Config) -> bowling_companion::Result<Storage> {
    Storage::open(config.database_path())
}

fn print_json<T: serde::Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_list(text: &str, empty: &str) {
    if text.is_empty() {
        println!("{empty}");
    } else {
        println!("{text}");
    }
}

fn found(updated: bool, entity: &'static str, id: i64) -> bowling_companion::Result<()> {
    if updated {
        Ok(())
    } else {
        Err(Error::not_found(entity, id))
    }
}

fn handle_bowler(config: &Config, cmd: BowlerCommand) -> CliResult {
    let storage = open_storage(config)?;
    match cmd {
        BowlerCommand::Add { name } => {
            let id = storage.insert_bowler(&Bowler::new(name))?;
            println!("Added bowler #{id}");
        }
        BowlerCommand::List { json } => {
            let bowlers = storage.list_bowlers()?;
            if json {
                print_json(&bowlers)?;
            } else {
                print_list(&render::bowlers(&bowlers), "No bowlers yet.");
            }
        }
        BowlerCommand::Rename { id, name } => {
            found(storage.rename_bowler(id, &name)?, "bowler", id)?;
            println!("Renamed bowler #{id} to {}", name.trim());
        }
        BowlerCommand::Delete { id } => {
            found(storage.delete_bowler(id)?, "bowler", id)?;
            println!("Deleted bowler #{id}");
        }
    }
    Ok(())
}

fn handle_team(config: &Config, cmd: TeamCommand) -> CliResult {
    let storage = open_storage(config)?;
    match cmd {
        TeamCommand::Add { name, members } => {
            let id = storage.insert_team(&Team::new(name, members))?;
            println!("Added team #{id}");
        }
        TeamCommand::List { json } => {
            let teams = storage.list_teams()?;
            if json {
                print_json(&teams)?;
            } else {
                print_list(&render::teams(&teams), "No teams yet.");
            }
        }
        TeamCommand::Members { id, members } => {
            storage.set_team_members(id, &members)?;
            println!("Updated members of team #{id}");
        }
        TeamCommand::Delete { id } => {
            found(storage.delete_team(id)?, "team", id)?;
            println!("Deleted team #{id}");
        }
    }
    Ok(())
}

fn apply_settings(league: &mut League, settings: &LeagueSettings) {
    if let Some(highlight) = settings.game_highlight {
        league.game_highlight = highlight;
    }
    if let Some(highlight) = settings.series_highlight {
        league.series_highlight = highlight;
    }
    if let Some(pinfall) = settings.additional_pinfall {
        league.additional_pinfall = pinfall;
    }
    if let Some(games) = settings.additional_games {
        league.additional_games = games;
    }
}

fn handle_league(config: &Config, cmd: LeagueCommand) -> CliResult {
    let storage = open_storage(config)?;
    match cmd {
        LeagueCommand::Add(add) => {
            let mut league = League::new(add.bowler, add.name, add.games);
            league.is_event = add.event;
            apply_settings(&mut league, &add.settings);
            let id = storage.insert_league(&league)?;
            let kind = if league.is_event { "event" } else { "league" };
            println!("Added {kind} #{id}");
        }
        LeagueCommand::List { bowler, json } => {
            storage
                .get_bowler(bowler)?
                .ok_or_else(|| Error::not_found("bowler", bowler))?;
            let leagues = storage.list_leagues(bowler)?;
            if json {
                print_json(&leagues)?;
            } else {
                print_list(&render::leagues(&leagues), "No leagues yet.");
            }
        }
        LeagueCommand::Update(update) => {
            let mut league = storage
                .get_league(update.id)?
                .ok_or_else(|| Error::not_found("league", update.id))?;
            if let Some(name) = update.name {
                league.name = name;
            }
            if let Some(games) = update.games {
                league.games_per_series = games;
            }
            apply_settings(&mut league, &update.settings);
            found(storage.update_league(&league)?, "league", update.id)?;
            println!("Updated league #{}", update.id);
        }
        LeagueCommand::Delete { id } => {
            found(storage.delete_league(id)?, "league", id)?;
            println!("Deleted league #{id}");
        }
    }
    Ok(())
}

fn handle_series(config: &Config, cmd: SeriesCommand) -> CliResult {
    let storage = open_storage(config)?;
    match cmd {
        SeriesCommand::Add {
            league,
            date,
            games,
        } => {
            let date = date.unwrap_or_else(|| set_to_midnight(Local::now().naive_local()));
            let id = storage.insert_series(league, date, games)?;
            let created = storage.list_games(id)?;
            let ids: Vec<String> = created
                .iter()
                .filter_map(|g| g.id)
                .map(|id| format!("#{id}"))
                .collect();
            println!("Added series #{id} with games {}", ids.join(", "));
        }
        SeriesCommand::List { league, json } => {
            let owner = storage
                .get_league(league)?
                .ok_or_else(|| Error::not_found("league", league))?;
            let series = storage.list_series(league)?;
            if json {
                print_json(&series)?;
            } else {
                let text = render::series_list(
                    &series,
                    &owner,
                    &config.display,
                    Local::now().date_naive(),
                );
                print_list(&text, "No series yet.");
            }
        }
        SeriesCommand::Date { id, date } => {
            found(storage.set_series_date(id, date)?, "series", id)?;
            println!("Moved series #{id} to {}", date.date());
        }
        SeriesCommand::Delete { id } => {
            found(storage.delete_series(id)?, "series", id)?;
            println!("Deleted series #{id}");
        }
    }
    Ok(())
}

fn handle_game(config: &Config, cmd: GameCommand) -> CliResult {
    let storage = open_storage(config)?;
    let game = match cmd {
        GameCommand::Show { id, json } => {
            let game = storage
                .get_game(id)?
                .ok_or_else(|| Error::not_found("game", id))?;
            if json {
                return print_json(&game);
            }
            game
        }
        GameCommand::Frame {
            id,
            frame,
            ball,
            deck,
            foul,
        } => {
            let ball = ball
                .checked_sub(1)
                .ok_or_else(|| Error::invalid_input("ball must be between 1 and 3"))?;
            storage.record_ball(id, frame, ball, deck, foul)?
        }
        GameCommand::Manual { id, score } => storage.set_manual_score(id, score)?,
        GameCommand::Match {
            id,
            result,
            opponent,
            opponent_score,
        } => storage.set_match_play(
            id,
            MatchPlay {
                result: result.into(),
                opponent_name: opponent,
                opponent_score,
            },
        )?,
        GameCommand::Lock { id } => {
            found(storage.set_game_locked(id, true)?, "game", id)?;
            println!("Locked game #{id}");
            return Ok(());
        }
        GameCommand::Unlock { id } => {
            found(storage.set_game_locked(id, false)?, "game", id)?;
            println!("Unlocked game #{id}");
            return Ok(());
        }
    };
    println!("{}", render::game(&game));
    Ok(())
}

fn handle_stats(config: &Config, cmd: &StatsCommand) -> CliResult {
    let storage = open_storage(config)?;
    let source = storage.load_statistics_source(cmd.statistics_unit(), &config.statistics)?;
    let report = compute(&source);
    match cmd.format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Plain => println!("{}", render::report(&report)),
    }
    Ok(())
}

async fn connect(config: &Config) -> bowling_companion::Result<TransferServerConnection> {
    let mut conn = TransferServerConnection::from_config(&config.transfer)?;
    conn.prepare_connection().await?;
    Ok(conn)
}

/// Print progress to stderr until the connection is dropped.
fn show_progress(mut events: broadcast::Receiver<TransferEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                TransferEvent::Progress(percent) => eprint!("\r{percent:>3}%"),
                TransferEvent::StateChanged { state, error } => {
                    debug!("Transfer {} {:?}", state, error);
                }
            }
        }
        eprintln!();
    })
}

/// Cancel the connection's operation on Ctrl-C.
fn cancel_on_interrupt(conn: &TransferServerConnection) -> JoinHandle<()> {
    let handle = conn.handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.cancel();
        }
    })
}

async fn handle_transfer(config: &Config, cmd: TransferCommand, quiet: bool) -> CliResult {
    let user_data = UserData::new(config.database_path());
    match cmd {
        TransferCommand::Status => {
            connect(config).await?;
            println!(
                "Transfer server is available at {}",
                config.transfer.server_url.as_deref().unwrap_or_default()
            );
        }
        TransferCommand::Valid { key } => {
            let mut conn = connect(config).await?;
            conn.is_key_valid(&key).await?;
            println!("Key {key} is valid");
        }
        TransferCommand::Upload => {
            // Fold the WAL into the database file before sending it
            open_storage(config)?.checkpoint()?;

            let mut conn = connect(config).await?;
            let progress = (!quiet).then(|| show_progress(conn.subscribe()));
            let interrupt = cancel_on_interrupt(&conn);
            let result = conn.upload_user_data(user_data.database_file()).await;
            interrupt.abort();
            drop(conn);
            if let Some(progress) = progress {
                let _ = progress.await;
            }

            let key = result?;
            println!("Uploaded database. Transfer key: {key}");
        }
        TransferCommand::Download { key, apply } => {
            let mut conn = connect(config).await?;
            let progress = (!quiet).then(|| show_progress(conn.subscribe()));
            let interrupt = cancel_on_interrupt(&conn);
            let result = conn
                .download_user_data(&key, &user_data.download_file())
                .await;
            interrupt.abort();
            drop(conn);
            if let Some(progress) = progress {
                let _ = progress.await;
            }

            result?;
            if apply {
                user_data.apply_download()?;
                println!(
                    "Downloaded and applied database. Previous database kept at {}",
                    user_data.backup_file().display()
                );
            } else {
                println!(
                    "Downloaded database to {}. Run `bowlc transfer apply` to use it.",
                    user_data.download_file().display()
                );
            }
        }
        TransferCommand::Apply => {
            user_data.apply_download()?;
            println!(
                "Applied downloaded database. Previous database kept at {}",
                user_data.backup_file().display()
            );
        }
        TransferCommand::Restore => {
            user_data.restore_backup()?;
            println!("Restored database from backup.");
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> CliResult {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                print_json(config)?;
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Transfer]");
                println!(
                    "  Server URL:         {}",
                    config.transfer.server_url.as_deref().unwrap_or("(not set)")
                );
                println!(
                    "  API key:            {}",
                    if config.transfer.api_key.is_some() {
                        "(set)"
                    } else {
                        "(not set)"
                    }
                );
                println!("  Timeout (secs):     {}", config.transfer.timeout_secs);
                println!("  Buffer size:        {}", config.transfer.buffer_size);
                println!();
                println!("[Statistics]");
                println!(
                    "  Include events:     {}",
                    config.statistics.include_events
                );
                println!(
                    "  Include open games: {}",
                    config.statistics.include_open_games
                );
                println!();
                println!("[Display]");
                println!("  Series view:        {:?}", config.display.series_view);
                println!("  Highlight series:   {}", config.display.highlight_series);
                println!("  Highlight scores:   {}", config.display.highlight_scores);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> CliResult {
    let storage = open_storage(config)?;
    let stats = storage.stats()?;
    let user_data = UserData::new(storage.path());

    if json {
        let status = serde_json::json!({
            "database_path": storage.path(),
            "stats": stats,
            "pending_download": user_data.has_download(),
            "backup_available": user_data.has_backup(),
        });
        print_json(&status)?;
    } else {
        println!("bowlc status");
        println!("------------");
        println!("Database:      {}", storage.path().display());
        println!("Size:          {} bytes", stats.db_size_bytes);
        println!("Bowlers:       {}", stats.bowlers);
        println!("Teams:         {}", stats.teams);
        println!("Leagues:       {}", stats.leagues);
        println!("Series:        {}", stats.series);
        println!("Games:         {}", stats.games);
        if user_data.has_download() {
            println!("A downloaded database is waiting: run `bowlc transfer apply`.");
        }
        if user_data.has_backup() {
            println!("A backup is available: run `bowlc transfer restore`.");
        }
    }
    Ok(())
}
