//! # Erosion Broadcaster Library
//!
//! Witnesses a piece of digital decay. The *erosion* repository is an artwork
//! whose source code corrupts itself a little more with every automated
//! commit. This library watches its history, picks the commits worth
//! announcing, turns the corrupted source into a short poetic or diagnostic
//! post, and publishes it to Twitter/X.
//!
//! ## Features
//!
//! - Corrupted-line detection in the artwork's source ([`snippet`])
//! - Before/after sampling of a commit's diff ([`diff`])
//! - Commit selection with duplicate suppression ([`selector`])
//! - Four interchangeable post styles plus a restoration template ([`composer`])
//! - Persisted state across runs ([`state`])
//! - Twitter/X API integration with OAuth 1.0a User Context authentication ([`twitter`])
//! - Structured logging
//!
//! ## Configuration
//!
//! - `TWITTER_API_KEY`, `TWITTER_API_SECRET`, `TWITTER_ACCESS_TOKEN`,
//!   `TWITTER_ACCESS_SECRET`: all four are needed to post (also read from `.env.local`)
//! - `EROSION_REPO_URL`, `EROSION_CLONE_PATH`, `BROADCASTER_STATE_FILE`,
//!   `EROSION_SOURCE_FILE`: optional overrides of the defaults in [`config`]
//! - `RUST_LOG`: log level

pub mod broadcaster;
pub mod commit;
pub mod composer;
pub mod config;
pub mod diff;
pub mod git;
pub mod oauth;
pub mod selector;
pub mod snippet;
pub mod state;
pub mod text;
pub mod twitter;

// Re-export commonly used types and functions
pub use broadcaster::{BroadcastOutcome, Broadcaster, RunMode, RunReport};
pub use commit::Commit;
pub use composer::{compose, compose_restoration, ComposedText, Style};
pub use config::{BroadcasterConfig, TwitterCredentials};
pub use diff::{sample_diff, DiffSample};
pub use git::{GitRepository, VersionControl};
pub use selector::{select_commit, should_announce};
pub use snippet::extract_snippet;
pub use state::BroadcastState;
pub use twitter::{PublishError, Publisher, TwitterPoster};
