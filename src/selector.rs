//! Commit selection: which commit, if any, gets announced this run.

use log::debug;

use crate::commit::{is_milestone, Commit};
use crate::state::BroadcastState;

/// Number of most recent commits inspected per run.
pub const COMMIT_WINDOW: usize = 20;

/// Announce every N-th iteration.
pub const ITERATION_INTERVAL: u64 = 6;

/// Decides whether a single commit is worth announcing.
///
/// Rules, first match wins:
///
/// 1. Restoration events are always announced. The duplicate check below is
///    not applied to them, so a restoration commit that was already announced
///    is announced again.
/// 2. The commit last announced is skipped.
/// 3. Iterations divisible by [`ITERATION_INTERVAL`], and milestone iterations, are announced.
/// 4. Messages mentioning `severe` or `critical` decay are announced.
/// 5. Everything else is skipped.
pub fn should_announce(commit: &Commit, state: &BroadcastState) -> bool {
    if commit.is_restoration() {
        return true;
    }

    if state.last_announced_commit.as_deref() == Some(commit.id.as_str()) {
        return false;
    }

    if let Some(iteration) = commit.iteration() {
        if iteration % ITERATION_INTERVAL == 0 || is_milestone(iteration) {
            return true;
        }
    }

    commit.is_severe()
}

/// Returns the most recent eligible commit within [`COMMIT_WINDOW`].
///
/// `commits` must be ordered most recent first.
pub fn select_commit<'a>(commits: &'a [Commit], state: &BroadcastState) -> Option<&'a Commit> {
    let selected = commits
        .iter()
        .take(COMMIT_WINDOW)
        .find(|commit| should_announce(commit, state));

    match selected {
        Some(commit) => debug!("Selected commit {} for announcement", commit.id),
        None => debug!("No eligible commit among {} candidates", commits.len()),
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn commit(id: &str, message: &str) -> Commit {
        Commit::new(id, message, Utc::now())
    }

    fn announced(id: &str) -> BroadcastState {
        BroadcastState {
            last_announced_commit: Some(id.to_string()),
            ..BroadcastState::default()
        }
    }

    #[test]
    fn test_iteration_rule_matches_interval_and_milestones() {
        let state = BroadcastState::default();
        for n in 1..=1200u64 {
            let c = commit("c", &format!("slight erosion - iteration {}", n));
            let expected = n % 6 == 0 || [10, 50, 100, 500, 1000].contains(&n);
            assert_eq!(should_announce(&c, &state), expected, "iteration {}", n);
        }
    }

    #[test]
    fn test_restoration_always_announced() {
        let c = commit("r1", "RESTORATION EVENT - iteration 7");
        assert!(should_announce(&c, &BroadcastState::default()));
        assert!(should_announce(&c, &announced("r1")));
    }

    #[test]
    fn test_duplicate_suppressed() {
        let c = commit("c12", "moderate erosion - iteration 12");
        assert!(should_announce(&c, &BroadcastState::default()));
        assert!(!should_announce(&c, &announced("c12")));
    }

    #[test]
    fn test_severity_words() {
        let state = BroadcastState::default();
        assert!(should_announce(&commit("a", "severe erosion - iteration 7"), &state));
        assert!(should_announce(&commit("b", "critical erosion"), &state));
        assert!(!should_announce(&commit("c", "Severe erosion - iteration 7"), &state));
        assert!(!should_announce(&commit("d", "minimal erosion - iteration 7"), &state));
    }

    #[test]
    fn test_select_returns_most_recent_eligible() {
        let commits = vec![
            commit("c13", "slight erosion - iteration 13"),
            commit("c12", "slight erosion - iteration 12"),
            commit("c6", "slight erosion - iteration 6"),
        ];
        let selected = select_commit(&commits, &BroadcastState::default()).unwrap();
        assert_eq!(selected.id, "c12");

        let selected = select_commit(&commits, &announced("c12")).unwrap();
        assert_eq!(selected.id, "c6");
    }

    #[test]
    fn test_select_ignores_commits_beyond_window() {
        let mut commits: Vec<Commit> = (0..COMMIT_WINDOW)
            .map(|i| commit(&format!("c{}", i), "minimal erosion - iteration 1"))
            .collect();
        commits.push(commit("late", "critical erosion - iteration 12"));
        assert!(select_commit(&commits, &BroadcastState::default()).is_none());
    }
}
