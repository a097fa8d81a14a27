//! The broadcast run.
//!
//! One invocation: refresh the erosion mirror, look at the most recent
//! commits, pick at most one, compose its post, then print or publish it.
//! The persisted state goes in as a value and comes back out as a value;
//! loading and saving it is the caller's job.

use log::{debug, info, warn};
use rand::Rng;

use crate::commit::Commit;
use crate::composer::{compose, compose_restoration, should_include_hashtags, ComposedText, Style};
use crate::diff::{sample_diff, DiffSample};
use crate::git::VersionControl;
use crate::selector::{select_commit, COMMIT_WINDOW};
use crate::snippet::extract_snippet;
use crate::state::BroadcastState;
use crate::twitter::{status_url, Publisher};

/// Whether a run prints or publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Print the post instead of publishing it
    Simulate,
    /// Publish through the [`Publisher`]
    Live,
}

/// What a single run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BroadcastOutcome {
    /// The repository returned no commits at all
    NoCommits,
    /// No commit in the window qualified
    NothingToAnnounce,
    /// The post was printed in simulation mode
    Simulated { commit_id: String, text: ComposedText },
    /// The post went out
    Published {
        commit_id: String,
        text: ComposedText,
        post_id: String,
    },
    /// Live mode, but the publisher was not connected
    PublishSkipped { commit_id: String },
    /// The platform rejected the post
    PublishFailed { commit_id: String, reason: String },
}

/// The state after a run together with what happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub state: BroadcastState,
    pub outcome: BroadcastOutcome,
}

impl RunReport {
    /// Whether the run announced something and the state must be saved.
    pub fn announced(&self) -> bool {
        matches!(
            self.outcome,
            BroadcastOutcome::Simulated { .. } | BroadcastOutcome::Published { .. }
        )
    }
}

/// Ties the collaborators together for one run.
pub struct Broadcaster<V, P> {
    vcs: V,
    publisher: P,
    source_file: String,
}

impl<V: VersionControl, P: Publisher> Broadcaster<V, P> {
    /// # Parameters
    ///
    /// - `vcs`: Access to the erosion repository
    /// - `publisher`: Where live posts go
    /// - `source_file`: The corrupting file inside the repository
    pub fn new(vcs: V, publisher: P, source_file: impl Into<String>) -> Self {
        Self {
            vcs,
            publisher,
            source_file: source_file.into(),
        }
    }

    pub fn vcs(&self) -> &V {
        &self.vcs
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Extracts a snippet from the source file as it was at `commit`.
    pub fn snippet_for<R: Rng + ?Sized>(&self, commit: &Commit, rng: &mut R) -> Option<String> {
        let source = self.vcs.read_file_at_commit(&commit.id, &self.source_file)?;
        extract_snippet(&source, rng)
    }

    /// Samples a before/after pair from the change `commit` made to the source file.
    pub fn diff_sample_for<R: Rng + ?Sized>(
        &self,
        commit: &Commit,
        rng: &mut R,
    ) -> Option<DiffSample> {
        let diff = self.vcs.diff_against_parent(&commit.id, &self.source_file)?;
        sample_diff(&diff, rng)
    }

    /// Composes the post for `commit`.
    ///
    /// Restoration events use their fixed template and never read the source.
    /// Other commits get a snippet, a random style and a hashtag decision.
    pub fn compose_for<R: Rng + ?Sized>(&self, commit: &Commit, rng: &mut R) -> ComposedText {
        if commit.is_restoration() {
            return compose_restoration(&commit.iteration_label());
        }

        let snippet = self.snippet_for(commit, rng);
        if snippet.is_none() {
            debug!("No snippet available for commit {}", commit.id);
        }
        let style = Style::random(rng);
        let include_hashtags =
            should_include_hashtags(commit.iteration(), &commit.decay_level(), rng);
        debug!(
            "Composing commit {} in {} style (hashtags: {})",
            commit.id, style, include_hashtags
        );

        compose(style, commit, snippet.as_deref(), include_hashtags, rng)
    }

    /// Runs one broadcast.
    ///
    /// # Returns
    ///
    /// A [`RunReport`] whose state differs from `state` only when something was
    /// announced: printed in simulation mode, or accepted by the publisher in
    /// live mode.
    pub async fn run<R: Rng + ?Sized>(
        &self,
        state: BroadcastState,
        mode: RunMode,
        rng: &mut R,
    ) -> RunReport {
        info!("Starting erosion broadcast ({:?} mode)", mode);

        if !self.vcs.refresh() {
            warn!("Continuing with the existing local mirror");
        }

        let commits = self.vcs.list_recent_commits(COMMIT_WINDOW);
        if commits.is_empty() {
            info!("No commits found");
            return RunReport {
                state,
                outcome: BroadcastOutcome::NoCommits,
            };
        }

        let Some(commit) = select_commit(&commits, &state) else {
            info!("No new commits to announce");
            return RunReport {
                state,
                outcome: BroadcastOutcome::NothingToAnnounce,
            };
        };

        info!("Announcing commit {}: {}", commit.id, commit.message);
        let text = self.compose_for(commit, rng);
        let commit_id = commit.id.clone();

        let outcome = match mode {
            RunMode::Simulate => {
                let rule = "=".repeat(50);
                println!("\n{}", rule);
                println!("Would tweet ({} chars):", text.char_count());
                println!("{}", rule);
                println!("{}", text);
                println!("{}\n", rule);
                BroadcastOutcome::Simulated { commit_id, text }
            }
            RunMode::Live if !self.publisher.is_connected() => {
                warn!("Cannot post: Twitter API not connected");
                return RunReport {
                    state,
                    outcome: BroadcastOutcome::PublishSkipped { commit_id },
                };
            }
            RunMode::Live => match self.publisher.post_text(text.as_str()).await {
                Ok(post_id) => {
                    info!("Successfully posted: {}", status_url(&post_id));
                    BroadcastOutcome::Published {
                        commit_id,
                        text,
                        post_id,
                    }
                }
                Err(e) => {
                    warn!("Failed to post tweet for commit {}: {}", commit_id, e);
                    return RunReport {
                        state,
                        outcome: BroadcastOutcome::PublishFailed {
                            commit_id,
                            reason: e.to_string(),
                        },
                    };
                }
            },
        };

        let state = state.record_announcement(&commit.id, commit.is_restoration());
        info!("Total announcements: {}", state.total_posts);
        RunReport { state, outcome }
    }
}
