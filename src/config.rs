//! Configuration module for the erosion broadcaster.
//!
//! This module contains configuration structures and environment variable handling
//! for the erosion repository mirror and the Twitter/X API integration.

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

/// Default location of the self-corrupting artwork.
pub const DEFAULT_REPO_URL: &str = "https://github.com/closestfriend/digital-erosion.git";
/// Default directory of the local mirror.
pub const DEFAULT_CLONE_PATH: &str = "./erosion_clone";
/// Default location of the persisted state.
pub const DEFAULT_STATE_FILE: &str = ".broadcaster_state.json";
/// The file that the artwork keeps corrupting.
pub const DEFAULT_SOURCE_FILE: &str = "erosion.py";
/// Optional file holding credentials for local runs.
pub const LOCAL_ENV_FILE: &str = ".env.local";

/// Where the broadcaster reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcasterConfig {
    /// Remote URL of the erosion repository
    pub repo_url: String,
    /// Local mirror of the erosion repository
    pub clone_path: PathBuf,
    /// JSON file holding the [`crate::BroadcastState`]
    pub state_file: PathBuf,
    /// Path of the corrupting source file inside the repository
    pub source_file: String,
}

impl Default for BroadcasterConfig {
    fn default() -> Self {
        Self {
            repo_url: DEFAULT_REPO_URL.to_string(),
            clone_path: PathBuf::from(DEFAULT_CLONE_PATH),
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
            source_file: DEFAULT_SOURCE_FILE.to_string(),
        }
    }
}

impl BroadcasterConfig {
    /// Loads the configuration from environment variables, falling back to defaults.
    ///
    /// # Environment Variables
    ///
    /// - `EROSION_REPO_URL`: remote of the erosion repository
    /// - `EROSION_CLONE_PATH`: local mirror directory
    /// - `BROADCASTER_STATE_FILE`: state file path
    /// - `EROSION_SOURCE_FILE`: corrupting source file inside the repository
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let config = Self {
            repo_url: env_or("EROSION_REPO_URL", defaults.repo_url),
            clone_path: PathBuf::from(env_or(
                "EROSION_CLONE_PATH",
                defaults.clone_path.to_string_lossy().into_owned(),
            )),
            state_file: PathBuf::from(env_or(
                "BROADCASTER_STATE_FILE",
                defaults.state_file.to_string_lossy().into_owned(),
            )),
            source_file: env_or("EROSION_SOURCE_FILE", defaults.source_file),
        };
        debug!("Broadcaster configuration: {:?}", config);
        config
    }
}

fn env_or(key: &str, default: String) -> String {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => default,
    }
}

/// Masks a secret for logging, keeping only its first 8 characters.
pub fn mask_secret(secret: &str) -> String {
    let prefix: String = secret.chars().take(8).collect();
    format!("{}...", prefix)
}

/// Parses `KEY=value` lines, skipping blanks and `#` comments.
pub fn parse_env_file(contents: &str) -> HashMap<String, String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect()
}

/// OAuth 1.0a credentials for posting to Twitter/X.
///
/// All four values are required; with any of them missing the publisher
/// stays disconnected.
#[derive(Clone, PartialEq, Eq)]
pub struct TwitterCredentials {
    /// Consumer key of the app (`TWITTER_API_KEY`)
    pub api_key: String,
    /// Consumer secret of the app (`TWITTER_API_SECRET`)
    pub api_secret: String,
    /// Access token of the posting account (`TWITTER_ACCESS_TOKEN`)
    pub access_token: String,
    /// Access token secret of the posting account (`TWITTER_ACCESS_SECRET`)
    pub access_secret: String,
}

impl std::fmt::Debug for TwitterCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterCredentials")
            .field("api_key", &mask_secret(&self.api_key))
            .field("api_secret", &"[REDACTED]")
            .field("access_token", &mask_secret(&self.access_token))
            .field("access_secret", &"[REDACTED]")
            .finish()
    }
}

impl TwitterCredentials {
    /// The environment variables that must all be set.
    pub const REQUIRED_VARS: [&'static str; 4] = [
        "TWITTER_API_KEY",
        "TWITTER_API_SECRET",
        "TWITTER_ACCESS_TOKEN",
        "TWITTER_ACCESS_SECRET",
    ];

    /// Loads credentials from the process environment, with `.env.local` as a fallback.
    ///
    /// # Returns
    ///
    /// - `Some(TwitterCredentials)`: if all four variables are present and non-empty
    /// - `None`: if any is missing
    pub fn from_env() -> Option<Self> {
        Self::from_env_with_file(Path::new(LOCAL_ENV_FILE))
    }

    /// Like [`TwitterCredentials::from_env`] with an explicit fallback file.
    ///
    /// Values already present in the process environment win over the file.
    pub fn from_env_with_file(path: &Path) -> Option<Self> {
        Self::from_file_with_overrides(path, |key| env::var(key).ok())
    }

    /// Reads `path` as an env file and resolves each key through `overrides`
    /// first, falling back to the file.
    pub fn from_file_with_overrides<F>(path: &Path, overrides: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file_values = match std::fs::read_to_string(path) {
            Ok(contents) => {
                info!("Loaded local environment overrides from {}", path.display());
                parse_env_file(&contents)
            }
            Err(_) => {
                debug!("No local environment file at {}", path.display());
                HashMap::new()
            }
        };

        Self::from_lookup(|key| overrides(key).or_else(|| file_values.get(key).cloned()))
    }

    /// Builds credentials from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut values = Vec::with_capacity(Self::REQUIRED_VARS.len());
        let mut missing = Vec::new();

        for key in Self::REQUIRED_VARS {
            match lookup(key).filter(|v| !v.trim().is_empty()) {
                Some(value) => {
                    debug!("Found {} ({})", key, mask_secret(&value));
                    values.push(value);
                }
                None => missing.push(key),
            }
        }

        if !missing.is_empty() {
            warn!(
                "Twitter API credentials not found in environment: missing {}",
                missing.join(", ")
            );
            return None;
        }

        let mut values = values.into_iter();
        Some(Self {
            api_key: values.next()?,
            api_secret: values.next()?,
            access_token: values.next()?,
            access_secret: values.next()?,
        })
    }
}
