// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fortuna - a fortune cookie that refills itself from a remote advice service.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use fortuna::{FortuneApp, commands, shell};

/// Fortuna - crack a cookie, get some advice.
#[derive(Parser, Debug)]
#[command(name = "fortuna", version, about, long_about = None)]
struct Cli {
    /// Keep all state in memory for this run.
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Load configuration from this file instead of the default locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Crack a cookie and print the fortune.
    Crack {
        /// Wait for the background refill to finish before exiting.
        #[arg(long)]
        wait: bool,
    },
    /// Refill the message queue from the advice service.
    Fill,
    /// List served fortunes, newest first.
    History {
        /// Only show favorites.
        #[arg(long)]
        favorites: bool,
        /// Only show fortunes whose text or lucky numbers contain this.
        #[arg(long, value_name = "QUERY")]
        search: Option<String>,
    },
    /// Toggle the favorite flag of fortune N (as numbered by `history`).
    Favorite { position: usize },
    /// Delete fortune N (as numbered by `history`).
    Delete { position: usize },
    /// Show or set the favorites-only history preference.
    Filter { state: Option<Toggle> },
    /// Show queue, storage, and API status.
    Status {
        /// Print machine-readable JSON.
        #[arg(long)]
        json: bool,
    },
    /// Launch an interactive session.
    Shell,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Toggle {
    On,
    Off,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => fortuna_config::load_and_validate_path(path),
        None => fortuna_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            fortuna_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.app.log_level);

    let app = match FortuneApp::from_config(config, cli.ephemeral) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("{}: {e}", "error".red());
            return ExitCode::FAILURE;
        }
    };

    let output = match cli.command.unwrap_or(Commands::Crack { wait: false }) {
        Commands::Crack { wait } => Ok(commands::crack(&app, wait).await),
        Commands::Fill => Ok(commands::fill(&app).await),
        Commands::History { favorites, search } => {
            Ok(commands::history(&app, favorites, search.as_deref()))
        }
        Commands::Favorite { position } => commands::favorite(&app, position),
        Commands::Delete { position } => commands::delete(&app, position),
        Commands::Filter { state } => Ok(commands::filter(
            &app,
            state.map(|s| matches!(s, Toggle::On)),
        )),
        Commands::Status { json } => commands::status(&app, json),
        Commands::Shell => {
            return match shell::run_shell(app).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("{}: {e}", "error".red());
                    ExitCode::FAILURE
                }
            };
        }
    };

    match output {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: {e}", "error".red());
            ExitCode::FAILURE
        }
    }
}

/// Initializes the tracing subscriber with the given log level.
///
/// `RUST_LOG` takes precedence. Logs go to stderr so command output stays
/// clean.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("fortuna={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
