//! devrank - local driver for the leaderboard pipeline.
//!
//! Normalizes device identifiers, scores metric snapshots, runs gated and
//! throttled upload passes, and prints per-category rankings. Entries go to
//! the configured remote store, or to a local JSON file when none is set.

#![allow(clippy::print_stdout, reason = "CLI tool outputs to stdout")]

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

mod cli;
mod commands;

use cli::{Cli, Commands, ConfigCommands};
use devrank_core::modules::{config as core_config, logger};
use devrank_core::utils::paths::get_data_dir;

fn resolve_data_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(dir) => {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
            Ok(dir)
        },
        None => get_data_dir().context("Failed to resolve data directory"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init_logger(cli.verbose);

    match cli.command {
        Commands::Normalize { model, brand, manufacturer, fingerprint, json } => {
            commands::normalize_device(&model, &brand, &manufacturer, &fingerprint, json)
        },
        Commands::Score { snapshot, json } => commands::score_snapshot(&snapshot, json),
        command => {
            let data_dir = resolve_data_dir(cli.data_dir)?;
            run_with_data_dir(command, &data_dir).await
        },
    }
}

async fn run_with_data_dir(command: Commands, data_dir: &Path) -> Result<()> {
    tracing::debug!("Using data directory {}", data_dir.display());
    if let Commands::Config(ConfigCommands::Init) = command {
        return commands::init_config(data_dir);
    }

    let config = core_config::load_config_from(&core_config::config_path(data_dir))
        .context("Failed to load configuration")?;

    match command {
        Commands::Upload { snapshot, device, trigger, entries } => {
            commands::run_upload(&config, data_dir, &snapshot, &device, trigger.into(), entries)
                .await
        },
        Commands::Rank { entries, category, top, json } => {
            commands::rank(&config, data_dir, entries, category.as_deref(), top, json).await
        },
        Commands::Insight { device_id, entries, json } => {
            commands::insight(&config, data_dir, &device_id, entries, json).await
        },
        Commands::Config(ConfigCommands::Show { json }) => commands::show_config(&config, json),
        Commands::Normalize { .. } | Commands::Score { .. } | Commands::Config(ConfigCommands::Init) => {
            Ok(())
        },
    }
}
