//! Genesis Tweet Script
//!
//! Posts the one hand-written tweet that introduces the Digital Erosion
//! artwork. Everything after it is left to the broadcaster.

use std::io::{self, Write};
use std::process::ExitCode;

use erosion_broadcaster::twitter::{status_url, Publisher, TwitterPoster};

const GENESIS_MESSAGE: &str = "Digital Erosion begins.

A self-modifying artwork that slowly corrupts its own source code, committing each mutation to git. 

I will witness and document this decay.

The program dreams of its own entropy.

#DigitalErosion #ConceptualArt #GenerativeArt";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::init();

    println!("Genesis Tweet:");
    println!("{}", "=".repeat(50));
    println!("{}", GENESIS_MESSAGE);
    println!("{}", "=".repeat(50));
    println!("Length: {} characters", GENESIS_MESSAGE.chars().count());

    print!("\nPost this genesis tweet? (y/N): ");
    if io::stdout().flush().is_err() {
        return ExitCode::FAILURE;
    }
    let mut answer = String::new();
    if io::stdin().read_line(&mut answer).is_err() {
        println!("\nCould not read confirmation");
        return ExitCode::FAILURE;
    }

    if !answer.trim().eq_ignore_ascii_case("y") {
        println!("\nGenesis tweet cancelled");
        return ExitCode::FAILURE;
    }

    let mut poster = TwitterPoster::from_env();
    if !poster.connect().await {
        println!("\n⚠ Twitter API not connected");
        return ExitCode::FAILURE;
    }

    match poster.post_text(GENESIS_MESSAGE).await {
        Ok(tweet_id) => {
            println!("\n✓ Genesis tweet posted successfully!");
            println!("URL: {}", status_url(&tweet_id));
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("\n⚠ Failed to post genesis tweet: {}", e);
            ExitCode::FAILURE
        }
    }
}
