// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Murmur binary: config loading, logging setup, and the background
//! sweeper lifecycle. The HTTP surface consumes the service crates
//! directly and is deployed separately.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use murmur_config::MurmurConfig;
use murmur_core::MurmurError;
use murmur_ratelimit::RateLimiter;
use murmur_service::ExpirationSweeper;
use murmur_storage::Database;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "murmur", version, about = "Anonymous location-anchored whisper engine")]
struct Cli {
    /// Path to a murmur.toml config file. Falls back to the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the expiration sweeper on its interval until interrupted.
    Serve,
    /// Run one expiration sweep and exit.
    Sweep,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("murmur: config error: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.log.level);

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "fatal");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<MurmurConfig, figment::Error> {
    match path {
        Some(path) => murmur_config::load_config_from_path(path),
        None => murmur_config::load_config(),
    }
}

/// `RUST_LOG` wins; the config level is the default filter otherwise.
fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(command: Command, config: MurmurConfig) -> Result<(), MurmurError> {
    if let Some(parent) = std::path::Path::new(&config.storage.database_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(MurmurError::storage)?;
        }
    }
    let db = Database::open(&config.storage.database_path).await?;
    let limiter = Arc::new(RateLimiter::new());
    let sweeper = ExpirationSweeper::new(db.clone(), config.sweeper.clone())
        .with_rate_limiter(Arc::clone(&limiter));

    match command {
        Command::Sweep => {
            let stats = sweeper.sweep().await?;
            println!(
                "removed {} expired messages, trimmed {} emotion log entries",
                stats.messages_removed, stats.emotion_entries_trimmed
            );
        }
        Command::Serve => {
            let cancel = CancellationToken::new();
            let sweep_task = {
                let cancel = cancel.clone();
                tokio::spawn(async move { sweeper.run(cancel).await })
            };

            info!("murmur serving; ctrl-c to stop");
            tokio::signal::ctrl_c().await.map_err(MurmurError::storage)?;
            info!("shutdown requested");
            cancel.cancel();
            let _ = sweep_task.await;
        }
    }

    db.close().await?;
    Ok(())
}
