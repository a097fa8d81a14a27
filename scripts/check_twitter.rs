//! Twitter Connection Check
//!
//! Verifies that the `TWITTER_*` credentials authenticate, without posting anything.

use std::process::ExitCode;

use erosion_broadcaster::{TwitterCredentials, TwitterPoster};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::init();

    let mut poster = TwitterPoster::from_env();
    if poster.connect().await {
        println!(
            "✓ Twitter integration ready! Authenticated as @{}",
            poster.username().unwrap_or("?")
        );
        return ExitCode::SUCCESS;
    }

    println!("⚠ Twitter API not configured");
    println!("\nTo enable Twitter posting:");
    println!("1. Get API credentials from https://developer.twitter.com");
    println!("2. Set these environment variables (or put them in .env.local):");
    for var in TwitterCredentials::REQUIRED_VARS {
        println!("   - {}", var);
    }
    ExitCode::FAILURE
}
