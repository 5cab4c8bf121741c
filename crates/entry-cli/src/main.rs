//! Entry-point registry CLI
//!
//! Inspects the entry points an environment declares and reports which of
//! them can be loaded.

mod cli;
mod commands;
mod context;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use context::CliContext;
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
        eprintln!("{} failed to set up logging: {}", "warning:".yellow().bold(), e);
    }

    match cli.command {
        Some(cmd) => {
            let ctx = CliContext::open(&cli.env)?;
            execute_command(&ctx, cmd)
        }
        None => {
            println!("{} Entry-point registry CLI", "entries".green().bold());
            println!();
            println!("Run {} for available commands.", "entries --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(ctx: &CliContext, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Groups => commands::run_groups(ctx),
        Commands::List { group } => commands::run_list(ctx, &group),
        Commands::Show { group, json } => commands::run_show(ctx, &group, json),
        Commands::Load { group, name } => commands::run_load(ctx, &group, &name),
    }
}
