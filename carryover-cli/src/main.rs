mod cli;
mod commands;
mod config;
mod prompt;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_overrides(cli.dirs);

    match cli.command {
        Command::Merge => commands::merge(&config),
        Command::Upsert { threshold } => commands::upsert(&config, threshold),
        Command::Check { ratio } => commands::check(&config, ratio),
        Command::Preview => commands::preview(&config),
        Command::Fill { policy } => {
            commands::fill(&config, commands::resolver_for(policy).as_mut()).map(drop)
        }
        Command::Inconsistencies { resolve, policy } => {
            commands::inconsistencies(&config, resolve, commands::resolver_for(policy).as_mut())
                .map(drop)
        }
        Command::Short { fix, ratio, policy } => {
            commands::short(&config, fix, ratio, commands::resolver_for(policy).as_mut()).map(drop)
        }
        Command::Apply => commands::apply(&config),
    }
}
