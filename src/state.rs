//! Persisted broadcaster state.
//!
//! The state file is the only thing that survives between runs. It is read
//! once at startup and rewritten at most once per run.

use std::io::Write;
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

/// What the broadcaster remembers between runs.
///
/// The field names on disk are `last_tweeted_commit`, `total_tweets` and
/// `last_restoration`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BroadcastState {
    /// Identifier of the last commit that was announced
    #[serde(rename = "last_tweeted_commit")]
    pub last_announced_commit: Option<String>,
    /// Number of announcements made so far; never decreases
    #[serde(rename = "total_tweets")]
    pub total_posts: u64,
    /// Identifier of the last announced restoration commit
    #[serde(rename = "last_restoration")]
    pub last_restoration_commit: Option<String>,
}

impl BroadcastState {
    /// Loads the state from `path`.
    ///
    /// # Returns
    ///
    /// - `Ok(BroadcastState)`: the stored state, or the default state if the file does not exist
    /// - `Err(...)`: if the file exists but cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        if !path.exists() {
            info!(
                "No state file at {}, starting with a fresh state",
                path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let state: Self = serde_json::from_str(&contents)?;
        debug!("Loaded state from {}: {:?}", path.display(), state);
        Ok(state)
    }

    /// Writes the state to `path` as pretty-printed JSON.
    ///
    /// The file is written to a temporary file next to `path` and renamed into
    /// place, so a crash mid-write leaves the previous state intact.
    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let json = serde_json::to_string_pretty(self)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.persist(path)?;

        debug!("Saved state to {}", path.display());
        Ok(())
    }

    /// Returns the state after announcing `commit_id`.
    pub fn record_announcement(&self, commit_id: &str, is_restoration: bool) -> Self {
        Self {
            last_announced_commit: Some(commit_id.to_string()),
            total_posts: self.total_posts + 1,
            last_restoration_commit: if is_restoration {
                Some(commit_id.to_string())
            } else {
                self.last_restoration_commit.clone()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let state = BroadcastState::load(&dir.path().join("missing.json")).unwrap();
        assert_eq!(state, BroadcastState::default());
        assert_eq!(state.total_posts, 0);
        assert!(state.last_announced_commit.is_none());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let state = BroadcastState {
            last_announced_commit: Some("abc".to_string()),
            total_posts: 4,
            last_restoration_commit: Some("def".to_string()),
        };

        state.save(&path).unwrap();
        assert_eq!(BroadcastState::load(&path).unwrap(), state);
    }

    #[test]
    fn test_on_disk_field_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        BroadcastState::default()
            .record_announcement("abc", false)
            .save(&path)
            .unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["last_tweeted_commit"], "abc");
        assert_eq!(raw["total_tweets"], 1);
        assert!(raw["last_restoration"].is_null());
    }

    #[test]
    fn test_load_accepts_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, r#"{"total_tweets": 9}"#).unwrap();

        let state = BroadcastState::load(&path).unwrap();
        assert_eq!(state.total_posts, 9);
        assert!(state.last_announced_commit.is_none());
    }

    #[test]
    fn test_load_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(BroadcastState::load(&path).is_err());
    }

    #[test]
    fn test_record_announcement() {
        let state = BroadcastState::default().record_announcement("r1", true);
        assert_eq!(state.total_posts, 1);
        assert_eq!(state.last_restoration_commit.as_deref(), Some("r1"));

        let state = state.record_announcement("c2", false);
        assert_eq!(state.total_posts, 2);
        assert_eq!(state.last_announced_commit.as_deref(), Some("c2"));
        assert_eq!(state.last_restoration_commit.as_deref(), Some("r1"));
    }
}
