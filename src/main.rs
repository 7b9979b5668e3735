//! # feedroll CLI
//!
//! The `feedroll` binary runs the scheduled feed job and inspects its
//! output.
//!
//! ## Usage
//!
//! ```bash
//! feedroll --config ./config/feedroll.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `feedroll run` | Fetch new videos, merge them into the dataset, and save |
//! | `feedroll sources` | List configured channels |
//! | `feedroll stats` | Summarize the persisted dataset |
//! | `feedroll changed` | Preview which days today's window would rewrite or drop |
//!
//! ## Examples
//!
//! ```bash
//! # Scheduled run
//! feedroll run --config ./config/feedroll.toml
//!
//! # See what a run would do without writing
//! feedroll run --dry-run --progress human
//!
//! # Check the channel list resolves
//! feedroll sources --resolve
//!
//! # Inspect a data file without a config
//! feedroll stats --data ./public/data.json
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`
//! (default `feedroll=info`).

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use feedroll::config::{self, Config};
use feedroll::progress::ProgressMode;
use feedroll::{pipeline, sources, stats};

/// feedroll: keep a rolling, day-grouped window of recent channel videos.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/feedroll.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "feedroll",
    about = "feedroll — a rolling window of recent channel videos, grouped by day",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/feedroll.toml")]
    config: PathBuf,

    /// Override the data file path from config.
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, merge, and save.
    ///
    /// Resolves every configured channel, fetches its feed, merges videos
    /// not already stored into the dataset, drops days outside the window,
    /// and writes the result atomically.
    Run {
        /// Compute everything but do not write the data file.
        #[arg(long)]
        dry_run: bool,

        /// Progress on stderr: `auto`, `off`, `human`, or `json`.
        #[arg(long, default_value = "auto", value_parser = ProgressMode::parse)]
        progress: ProgressMode,
    },

    /// List configured channels.
    Sources {
        /// Look up channel ids over HTTP.
        #[arg(long)]
        resolve: bool,
    },

    /// Summarize the persisted dataset.
    ///
    /// Works without a config file when `--data` is given.
    Stats,

    /// Preview which stored days today's window would change or drop.
    ///
    /// Never writes. Works without a config file when `--data` is given.
    Changed,
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("feedroll=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    // Read-only commands fall back to defaults when --data is given
    let mut cfg = match &cli.command {
        Commands::Stats | Commands::Changed if cli.data.is_some() => {
            config::load_config(&cli.config).unwrap_or_else(|_| Config::minimal())
        }
        _ => config::load_config(&cli.config)?,
    };
    if let Some(data) = cli.data {
        cfg.data.path = data;
    }

    match cli.command {
        Commands::Run { dry_run, progress } => {
            pipeline::run_pipeline(&cfg, dry_run, progress).await?;
        }
        Commands::Sources { resolve } => {
            sources::list_sources(&cfg, resolve).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg)?;
        }
        Commands::Changed => {
            stats::run_changed(&cfg)?;
        }
    }

    Ok(())
}
