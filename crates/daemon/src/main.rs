// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Matching Engine Daemon (med)
//!
//! Recovers engine state from the backing store, then applies operations
//! read from stdin while checkpointing in the background.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod config;
mod input;
mod lifecycle;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use me_core::{BookState, SystemClock};
use me_persist::RecoveryCoordinator;
use me_storage::HistoryLedger;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal::unix::{signal, SignalKind};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::config::Config;
use crate::lifecycle::{open_store, LifecycleError};
use crate::output::{HistoryRow, OutputFormat, RecoverySummary};

#[derive(Parser)]
#[command(
    name = "med",
    version,
    about = "Matching engine daemon with checkpointing and crash recovery"
)]
struct Cli {
    /// Config file (TOML); defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recover, then apply operations from stdin until EOF or a signal
    Run,
    /// Run recovery only and report what it found
    Recover {
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// List recent checkpoints from slice_history
    History {
        /// Maximum number of entries, newest first
        #[arg(long, default_value = "10")]
        limit: usize,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    // Write startup marker to log (before tracing setup)
    write_startup_marker(&config)?;
    let _log_guard = setup_logging(&config)?;

    match cli.command {
        Commands::Run => run(&config).await,
        Commands::Recover { format } => recover(&config, format),
        Commands::History { limit, format } => history(&config, limit, format),
    }
}

async fn run(config: &Config) -> Result<()> {
    info!("Starting med with store {}", config.store_path.display());

    let (mut daemon, _) = match lifecycle::startup(config) {
        Ok(started) => started,
        Err(e) => {
            // Write error synchronously (tracing is non-blocking and may not flush in time)
            write_startup_error(config, &e);
            error!("Failed to start daemon: {}", e);
            return Err(e.into());
        }
    };

    // Set up signal handlers
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    let mut ticker = interval(config.persist.tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // Skip initial immediate tick
    ticker.tick().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    info!(
        operlog_id_start = daemon.persistence.context().map(|c| c.operlog_id_start()),
        "Daemon ready"
    );
    // Signal ready for the parent process
    println!("READY");

    let result = loop {
        tokio::select! {
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => match daemon.handle_line(&line) {
                        Ok(Some(reply)) => {
                            if let Ok(json) = serde_json::to_string(&reply) {
                                println!("{}", json);
                            }
                        }
                        Ok(None) => {}
                        Err(e) => {
                            error!("Stopping after fatal error: {}", e);
                            break Err(e);
                        }
                    },
                    Ok(None) => {
                        info!("stdin closed, shutting down...");
                        break Ok(());
                    }
                    Err(e) => {
                        error!("Failed to read stdin: {}", e);
                        break Err(LifecycleError::Io(e));
                    }
                }
            }

            _ = ticker.tick() => daemon.tick(),

            // Graceful shutdown on SIGTERM
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
                break Ok(());
            }

            // Graceful shutdown on SIGINT
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down...");
                break Ok(());
            }
        }
    };

    daemon.shutdown().await;
    info!("Daemon stopped");
    result?;
    Ok(())
}

fn recover(config: &Config, format: OutputFormat) -> Result<()> {
    let store = open_store(config)?;
    let (book, outcome) = RecoveryCoordinator::new(store, SystemClock)
        .recover::<BookState>()
        .map_err(LifecycleError::from)?;
    output::print(&RecoverySummary::new(&outcome, &book), format);
    Ok(())
}

fn history(config: &Config, limit: usize, format: OutputFormat) -> Result<()> {
    let entries = HistoryLedger::new(open_store(config)?)
        .recent(limit)
        .map_err(LifecycleError::from)?;
    let rows: Vec<HistoryRow> = entries.into_iter().map(HistoryRow).collect();
    output::print_list(&rows, format);
    Ok(())
}

/// Startup marker prefix written to log before anything else.
/// Full format: "--- med: starting (pid: 12345) ---"
pub const STARTUP_MARKER_PREFIX: &str = "--- med: starting (pid: ";

/// Write startup marker to log file (appends to existing log)
fn write_startup_marker(config: &Config) -> Result<(), LifecycleError> {
    use std::io::Write;

    // Create log directory if needed
    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;
    writeln!(file, "{}{}) ---", STARTUP_MARKER_PREFIX, std::process::id())?;

    Ok(())
}

/// Write startup error synchronously to log file.
fn write_startup_error(config: &Config, error: &LifecycleError) {
    use std::io::Write;

    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
    else {
        return;
    };
    let _ = writeln!(file, "ERROR Failed to start daemon: {}", error);
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let file_appender = tracing_appender::rolling::never(
        config.log_path.parent().ok_or(LifecycleError::NoStateDir)?,
        config
            .log_path
            .file_name()
            .ok_or(LifecycleError::NoStateDir)?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
        .init();

    Ok(guard)
}
