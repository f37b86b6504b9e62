//! MoviePoll CLI
//!
//! Command-line administration for a MoviePoll data file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use moviepoll_core::{CycleId, MovieId, SettingKind, Store, UserId};

mod commands;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "moviepoll")]
#[command(about = "MoviePoll - administer a movie poll data file")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log store activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Data file to use instead of the configured one
    #[arg(long, global = true, value_name = "PATH")]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show store location and contents
    Status,
    /// Manage voting cycles
    Cycle {
        #[command(subcommand)]
        command: CycleCommands,
    },
    /// Manage movies
    Movie {
        #[command(subcommand)]
        command: MovieCommands,
    },
    /// Inspect users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Read and write stored settings
    Setting {
        #[command(subcommand)]
        command: SettingCommands,
    },
}

#[derive(Subcommand)]
enum CycleCommands {
    /// Start a new cycle and make it current
    Start {
        /// Planned end (RFC 3339)
        #[arg(long)]
        end: Option<String>,
    },
    /// Show the current cycle
    Show,
    /// List past cycles by id range
    Past {
        start: CycleId,
        end: CycleId,
    },
    /// End the current cycle
    End,
}

#[derive(Subcommand)]
enum MovieCommands {
    /// Nominate a movie
    Add {
        name: String,
        /// Link to add (repeatable)
        #[arg(short, long)]
        link: Vec<String>,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// List movies not yet watched
    #[command(alias = "ls")]
    List,
    /// Show movie details (including votes)
    Show { id: MovieId },
    /// Mark a movie as watched
    Watched { id: MovieId },
    /// Remove a movie from the ballot
    #[command(alias = "rm")]
    Remove { id: MovieId },
    /// Approve a nominated movie
    Approve { id: MovieId },
}

#[derive(Subcommand)]
enum UserCommands {
    /// List users
    #[command(alias = "ls")]
    List {
        /// First user id to list
        #[arg(long, default_value_t = 0)]
        start: UserId,
        /// Maximum number of users
        #[arg(long, default_value_t = 50)]
        count: usize,
    },
    /// Show a user
    Show { id: UserId },
}

#[derive(Subcommand)]
enum SettingCommands {
    /// List all settings
    #[command(alias = "ls")]
    List,
    /// Show a setting
    Get {
        key: String,
        /// Read the value as this kind (string, int, bool)
        #[arg(long)]
        kind: Option<SettingKind>,
    },
    /// Set a setting
    Set {
        key: String,
        value: String,
        /// Kind of the value (string, int, bool)
        #[arg(long)]
        kind: SettingKind,
    },
    /// Delete a setting
    #[command(alias = "rm")]
    Delete { key: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    let store = match &cli.data {
        Some(path) => Store::open_path(path)
            .with_context(|| format!("Failed to open data file {:?}", path))?,
        None => Store::open()?,
    };
    debug!("Using data file {:?}", store.path());

    match cli.command {
        Commands::Status => commands::status::show(&store, &output),
        Commands::Cycle { command } => handle_cycle_command(command, &store, &output),
        Commands::Movie { command } => handle_movie_command(command, &store, &output),
        Commands::User { command } => handle_user_command(command, &store, &output),
        Commands::Setting { command } => handle_setting_command(command, &store, &output),
    }
}

fn handle_cycle_command(command: CycleCommands, store: &Store, output: &Output) -> Result<()> {
    match command {
        CycleCommands::Start { end } => commands::cycle::start(store, end, output),
        CycleCommands::Show => commands::cycle::show(store, output),
        CycleCommands::Past { start, end } => commands::cycle::past(store, start, end, output),
        CycleCommands::End => commands::cycle::end(store, output),
    }
}

fn handle_movie_command(command: MovieCommands, store: &Store, output: &Output) -> Result<()> {
    match command {
        MovieCommands::Add {
            name,
            link,
            description,
        } => commands::movie::add(store, name, link, description, output),
        MovieCommands::List => commands::movie::list(store, output),
        MovieCommands::Show { id } => commands::movie::show(store, id, output),
        MovieCommands::Watched { id } => commands::movie::watched(store, id, output),
        MovieCommands::Remove { id } => commands::movie::remove(store, id, output),
        MovieCommands::Approve { id } => commands::movie::approve(store, id, output),
    }
}

fn handle_user_command(command: UserCommands, store: &Store, output: &Output) -> Result<()> {
    match command {
        UserCommands::List { start, count } => commands::user::list(store, start, count, output),
        UserCommands::Show { id } => commands::user::show(store, id, output),
    }
}

fn handle_setting_command(command: SettingCommands, store: &Store, output: &Output) -> Result<()> {
    match command {
        SettingCommands::List => commands::setting::list(store, output),
        SettingCommands::Get { key, kind } => commands::setting::get(store, key, kind, output),
        SettingCommands::Set { key, value, kind } => {
            commands::setting::set(store, key, value, kind, output)
        }
        SettingCommands::Delete { key } => commands::setting::delete(store, key, output),
    }
}

/// Send logs to stderr; `RUST_LOG` overrides the `--verbose` default
fn init_logging(verbose: bool) {
    let log_level = if verbose { "debug" } else { "warn" };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("moviepoll_core={},moviepoll={}", log_level, log_level))
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();

    debug!("Logging initialized at {} level", log_level);
}
