//! Commit values and commit message parsing.
//!
//! The erosion repository writes its state into every commit message, e.g.
//! `"moderate erosion - iteration 12 (3 mutations)"`. This module pulls the
//! tokens the broadcaster cares about out of that free text.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Iterations that are always worth announcing and always carry hashtags.
pub const MILESTONE_ITERATIONS: [u64; 5] = [10, 50, 100, 500, 1000];

/// Token that marks a restoration event in a commit message.
pub const RESTORATION_MARKER: &str = "RESTORATION";

/// Label used when a commit message carries no iteration number.
pub const UNKNOWN_ITERATION: &str = "∞";

/// Decay level used when a commit message carries no `X erosion` token.
pub const UNKNOWN_DECAY: &str = "unknown";

static ITERATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"iteration (\d+)").expect("valid iteration regex"));
static DECAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+) erosion").expect("valid decay regex"));
static MUTATIONS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+) mutations").expect("valid mutations regex"));

/// A single commit of the erosion repository.
///
/// Commits are fetched fresh on every run; only the identifier ever reaches
/// the persisted state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub id: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Commit {
    pub fn new(id: impl Into<String>, message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
            timestamp,
        }
    }

    /// Returns `true` when the message signals a restoration event.
    pub fn is_restoration(&self) -> bool {
        self.message.contains(RESTORATION_MARKER)
    }

    fn iteration_digits(&self) -> Option<&str> {
        ITERATION_RE
            .captures(&self.message)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// Extracts the number from the first `iteration N` token.
    ///
    /// Returns `None` when the token is missing or the number does not fit a `u64`.
    pub fn iteration(&self) -> Option<u64> {
        self.iteration_digits().and_then(|digits| digits.parse().ok())
    }

    /// The digits of the `iteration N` token as written, `∞` when the token is absent.
    pub fn iteration_label(&self) -> String {
        self.iteration_digits()
            .unwrap_or(UNKNOWN_ITERATION)
            .to_string()
    }

    /// Extracts the word in front of `erosion`, `unknown` when absent.
    pub fn decay_level(&self) -> String {
        DECAY_RE
            .captures(&self.message)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| UNKNOWN_DECAY.to_string())
    }

    /// Extracts the count from an `N mutations` token.
    pub fn mutations(&self) -> Option<u64> {
        MUTATIONS_RE
            .captures(&self.message)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    /// Returns `true` when the message mentions severe or critical decay.
    pub fn is_severe(&self) -> bool {
        self.message.contains("severe") || self.message.contains("critical")
    }
}

/// Returns `true` for iterations in [`MILESTONE_ITERATIONS`].
pub fn is_milestone(iteration: u64) -> bool {
    MILESTONE_ITERATIONS.contains(&iteration)
}
