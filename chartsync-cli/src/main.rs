//! # chartsync-cli
//!
//! CLI driver for the chartsync push synchronizer.
//!
//! ## Commands
//!
//! - `login` / `logout`: Manage the local session
//! - `status`: Show the current sync status
//! - `sync`: Run one reconciliation pass now
//! - `run`: Keep syncing periodically until interrupted
//!
//! ## Example
//!
//! ```bash
//! # Sign in
//! chartsync login --user dr-crusher
//!
//! # Push everything pending, once
//! chartsync sync
//!
//! # Background mode: tick every 45 seconds
//! chartsync run --interval 45
//! ```
//!
//! Local records live under `<data-dir>/local/<collection>.json`; the
//! demo remote store is `<data-dir>/remote.json`. Pass `--offline` to
//! simulate a dropped connection.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod session;
mod stores;

use commands::{login, logout, run, status, sync};

/// CLI driver for the chartsync push synchronizer.
#[derive(Parser, Debug)]
#[command(name = "chartsync")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Data directory for session, local records, and the demo remote
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Simulate a dropped connection: every remote call fails as offline
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign a principal in
    Login {
        /// User identifier
        #[arg(long, short)]
        user: String,
    },

    /// Sign the current principal out
    Logout,

    /// Show the current sync status
    Status,

    /// Run one reconciliation pass now
    Sync,

    /// Keep syncing periodically until interrupted
    Run {
        /// Seconds between reconciliation passes
        #[arg(long, default_value = "45")]
        interval: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };

    tokio::fs::create_dir_all(&data_dir)
        .await
        .context("Failed to create data directory")?;

    match cli.command {
        Commands::Login { user } => {
            login::run(&data_dir, &user).await?;
        }
        Commands::Logout => {
            logout::run(&data_dir).await?;
        }
        Commands::Status => {
            status::run(&data_dir, cli.offline).await?;
        }
        Commands::Sync => {
            sync::run(&data_dir, cli.offline).await?;
        }
        Commands::Run { interval } => {
            run::run(&data_dir, cli.offline, interval).await?;
        }
    }

    Ok(())
}

/// Get the default data directory for chartsync.
fn default_data_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("io", "chartsync", "chartsync")
        .context("Could not determine home directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
