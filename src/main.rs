//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `playlist_import` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - Ctrl-C cancellation
//! - User-facing output formatting and the exit code
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;
use tokio_util::sync::CancellationToken;

use playlist_import::initialization::init_logger_with;
use playlist_import::{list_playlists, run_import_with_cancel, Config, ImportReport};

fn print_report(report: &ImportReport) {
    let destination = match &report.playlist_id {
        Some(id) => format!("playlist {}", id),
        None => "liked songs".to_string(),
    };
    println!(
        "{} Imported {} track{} to {} in {} batch{} ({:.1}s)",
        if report.success { "✅" } else { "❌" },
        report.resolved,
        if report.resolved == 1 { "" } else { "s" },
        destination,
        report.batches,
        if report.batches == 1 { "" } else { "es" },
        report.elapsed_seconds
    );
    if !report.unresolved.is_empty() {
        println!("{} track(s) could not be found:", report.unresolved.len());
        for track in &report.unresolved {
            println!("  - {}", track);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env (current directory, then next to the executable)
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let config = Config::parse();

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    if config.list_playlists {
        return match list_playlists(config).await {
            Ok(playlists) => {
                for playlist in playlists {
                    println!("{}\t{}", playlist.id, playlist.name);
                }
                Ok(())
            }
            Err(e) => {
                eprintln!("playlist_import error: {:#}", e);
                process::exit(1);
            }
        };
    }

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!("Interrupted, stopping the import");
                cancel.cancel();
            }
        });
    }

    match run_import_with_cancel(config, cancel).await {
        Ok(report) => {
            print_report(&report);
            if !report.success {
                process::exit(1);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("playlist_import error: {:#}", e);
            process::exit(1);
        }
    }
}
