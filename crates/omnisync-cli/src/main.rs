//! OmniSync CLI
//!
//! Tracks an Unreal project's config files and syncs them with a per-user
//! global settings directory.

mod cli;
mod commands;
mod context;
mod error;
mod logging;

use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{}: could not set up logging: {}", "warning".yellow().bold(), e);
    }
    tracing::debug!("Verbose mode enabled");

    match cli.command {
        Some(cmd) => execute_command(cmd, cli.project),
        None => {
            // No command provided - show help hint
            println!("{} Unreal config sync", "omnisync".green().bold());
            println!();
            println!("Run {} for available commands.", "omnisync --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cmd: Commands, project: Option<PathBuf>) -> Result<()> {
    let start = context::start_dir(project)?;
    match cmd {
        Commands::Discover => commands::run_discover(&start),
        Commands::List { json } => commands::run_list(&start, json),
        Commands::Enable { files } => commands::run_enable(&start, &files),
        Commands::Disable { files } => commands::run_disable(&start, &files),
        Commands::Scope { file, scope } => commands::run_scope(&start, &file, scope.into()),
        Commands::Auto { file, state } => commands::run_auto(&start, &file, state.is_on()),
        Commands::Push { json } => commands::run_push(&start, json),
        Commands::Pull { json } => commands::run_pull(&start, json),
        Commands::Status { json } => commands::run_status(&start, json),
        Commands::Watch { mode } => commands::run_watch(&start, mode),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "omnisync", &mut std::io::stdout());
            Ok(())
        }
    }
}
