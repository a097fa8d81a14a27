//! # Erosion Broadcaster
//!
//! Runs one broadcast: inspects the erosion repository, picks at most one
//! commit and prints (default) or posts (`--live`) its announcement.
//!
//! ## Example Usage
//!
//! ```bash
//! # Dry run: print what would be posted
//! cargo run
//!
//! # Post for real
//! cargo run -- --live
//!
//! # Run with debug logging
//! RUST_LOG=debug cargo run
//! ```

use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use erosion_broadcaster::{
    BroadcastState, Broadcaster, BroadcasterConfig, GitRepository, RunMode, TwitterPoster,
};

/// Witness the digital decay: announce notable erosion commits on Twitter/X.
#[derive(Parser, Debug)]
#[command(name = "erosion-broadcaster", version, about)]
struct Cli {
    /// Actually post to Twitter/X instead of printing
    #[arg(long)]
    live: bool,
}

/// Main entry point for the erosion broadcaster.
///
/// Initializes logging, loads the persisted state, runs one broadcast and
/// saves the state if something was announced.
///
/// # Logging
///
/// The application uses the `env_logger` crate for structured logging. Log levels
/// can be controlled via the `RUST_LOG` environment variable.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let mode = if cli.live {
        RunMode::Live
    } else {
        println!("Running in DRY RUN mode (no actual tweets)");
        println!("Use --live flag to actually post tweets");
        RunMode::Simulate
    };

    let config = BroadcasterConfig::from_env();
    let state = match BroadcastState::load(&config.state_file) {
        Ok(state) => state,
        Err(e) => {
            error!(
                "Failed to load state from {}: {}",
                config.state_file.display(),
                e
            );
            return ExitCode::FAILURE;
        }
    };

    let poster = match mode {
        RunMode::Live => {
            let mut poster = TwitterPoster::from_env();
            poster.connect().await;
            poster
        }
        RunMode::Simulate => TwitterPoster::new(None),
    };

    let repo = GitRepository::new(&config.repo_url, &config.clone_path);
    let broadcaster = Broadcaster::new(repo, poster, &config.source_file);
    let report = broadcaster
        .run(state, mode, &mut rand::thread_rng())
        .await;

    if report.announced() {
        if let Err(e) = report.state.save(&config.state_file) {
            error!(
                "Failed to save state to {}: {}",
                config.state_file.display(),
                e
            );
            return ExitCode::FAILURE;
        }
        info!("State saved to {}", config.state_file.display());
    }

    ExitCode::SUCCESS
}
