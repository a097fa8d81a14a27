//! Version-control collaborator.
//!
//! The broadcaster only ever reads from the erosion repository: it keeps a
//! local mirror up to date, lists recent commits, and reads the tracked source
//! file (or its diff) at a given commit. Every failure is logged and mapped to
//! an absent value; nothing here aborts a run.

use std::path::{Path, PathBuf};

use chrono::{TimeZone, Utc};
use git2::{build::CheckoutBuilder, DiffFormat, DiffOptions, Repository};
use log::{debug, info, warn};

use crate::commit::Commit;

/// Read access to the erosion repository.
pub trait VersionControl {
    /// Brings the local mirror up to date. Returns `false` if that failed.
    fn refresh(&self) -> bool;

    /// Lists up to `limit` commits, most recent first.
    fn list_recent_commits(&self, limit: usize) -> Vec<Commit>;

    /// Returns the contents of `path` at commit `id`.
    fn read_file_at_commit(&self, id: &str, path: &str) -> Option<String>;

    /// Returns the unified diff of `path` between `base_id` and `id`.
    fn diff_file(&self, base_id: &str, id: &str, path: &str) -> Option<String>;

    /// Returns the diff of `path` introduced by commit `id`.
    fn diff_against_parent(&self, id: &str, path: &str) -> Option<String> {
        self.diff_file(&format!("{}~1", id), id, path)
    }
}

/// A local clone of the erosion repository, managed through libgit2.
#[derive(Debug, Clone)]
pub struct GitRepository {
    remote_url: String,
    local_path: PathBuf,
}

impl GitRepository {
    pub fn new(remote_url: impl Into<String>, local_path: impl Into<PathBuf>) -> Self {
        Self {
            remote_url: remote_url.into(),
            local_path: local_path.into(),
        }
    }

    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    fn open(&self) -> Result<Repository, git2::Error> {
        Repository::open(&self.local_path)
    }

    fn clone_mirror(&self) -> Result<(), git2::Error> {
        info!(
            "Cloning {} into {}",
            self.remote_url,
            self.local_path.display()
        );
        Repository::clone(&self.remote_url, &self.local_path)?;
        Ok(())
    }

    /// Fetches the current branch from `origin` and fast-forwards onto it.
    fn pull(&self) -> Result<(), git2::Error> {
        let repo = self.open()?;
        let head = repo.head()?;
        let branch = head
            .shorthand()
            .ok_or_else(|| git2::Error::from_str("HEAD is not a named branch"))?
            .to_string();
        let refname = head
            .name()
            .ok_or_else(|| git2::Error::from_str("HEAD has a non-UTF-8 name"))?
            .to_string();

        debug!("Fetching {} from origin", branch);
        let mut remote = repo.find_remote("origin")?;
        remote.fetch(&[branch.as_str()], None, None)?;

        let fetch_head = repo.find_reference("FETCH_HEAD")?;
        let fetched = repo.reference_to_annotated_commit(&fetch_head)?;
        let (analysis, _) = repo.merge_analysis(&[&fetched])?;

        if analysis.is_up_to_date() {
            debug!("Local mirror already up to date");
            return Ok(());
        }
        if !analysis.is_fast_forward() {
            return Err(git2::Error::from_str(
                "local mirror has diverged from origin; refusing to merge",
            ));
        }

        let mut reference = repo.find_reference(&refname)?;
        reference.set_target(fetched.id(), "erosion-broadcaster: fast-forward")?;
        repo.set_head(&refname)?;
        repo.checkout_head(Some(CheckoutBuilder::default().force()))?;
        info!("Fast-forwarded {} to {}", branch, fetched.id());
        Ok(())
    }

    fn try_list_recent_commits(&self, limit: usize) -> Result<Vec<Commit>, git2::Error> {
        let repo = self.open()?;
        let mut revwalk = repo.revwalk()?;
        revwalk.push_head()?;
        revwalk.set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::TIME)?;

        let mut commits = Vec::with_capacity(limit);
        for oid in revwalk.take(limit) {
            let commit = repo.find_commit(oid?)?;
            let timestamp = Utc
                .timestamp_opt(commit.time().seconds(), 0)
                .single()
                .unwrap_or_else(Utc::now);
            commits.push(Commit::new(
                commit.id().to_string(),
                commit.summary().unwrap_or(""),
                timestamp,
            ));
        }
        Ok(commits)
    }

    fn try_read_file(&self, id: &str, path: &str) -> Result<String, git2::Error> {
        let repo = self.open()?;
        let commit = repo.revparse_single(id)?.peel_to_commit()?;
        let entry = commit.tree()?.get_path(Path::new(path))?;
        let blob = entry.to_object(&repo)?.peel_to_blob()?;
        Ok(String::from_utf8_lossy(blob.content()).into_owned())
    }

    fn try_diff(&self, base_id: &str, id: &str, path: &str) -> Result<String, git2::Error> {
        let repo = self.open()?;
        let old_tree = repo.revparse_single(base_id)?.peel_to_tree()?;
        let new_tree = repo.revparse_single(id)?.peel_to_tree()?;

        let mut opts = DiffOptions::new();
        opts.pathspec(path);
        let diff = repo.diff_tree_to_tree(Some(&old_tree), Some(&new_tree), Some(&mut opts))?;

        let mut text = String::new();
        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            if matches!(line.origin(), '+' | '-' | ' ') {
                text.push(line.origin());
            }
            text.push_str(&String::from_utf8_lossy(line.content()));
            true
        })?;
        Ok(text)
    }
}

impl VersionControl for GitRepository {
    fn refresh(&self) -> bool {
        let result = if self.local_path.exists() {
            self.pull()
        } else {
            self.clone_mirror()
        };

        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    "Failed to refresh erosion mirror at {}: {}",
                    self.local_path.display(),
                    e
                );
                false
            }
        }
    }

    fn list_recent_commits(&self, limit: usize) -> Vec<Commit> {
        match self.try_list_recent_commits(limit) {
            Ok(commits) => {
                debug!("Listed {} recent commits", commits.len());
                commits
            }
            Err(e) => {
                warn!("Failed to list commits: {}", e);
                Vec::new()
            }
        }
    }

    fn read_file_at_commit(&self, id: &str, path: &str) -> Option<String> {
        match self.try_read_file(id, path) {
            Ok(contents) => Some(contents),
            Err(e) => {
                debug!("Could not read {} at {}: {}", path, id, e);
                None
            }
        }
    }

    fn diff_file(&self, base_id: &str, id: &str, path: &str) -> Option<String> {
        match self.try_diff(base_id, id, path) {
            Ok(text) if !text.is_empty() => Some(text),
            Ok(_) => None,
            Err(e) => {
                debug!("Could not diff {} between {} and {}: {}", path, base_id, id, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{Oid, Signature};

    struct TestRepo {
        dir: tempfile::TempDir,
        repo: Repository,
    }

    impl TestRepo {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let repo = Repository::init(dir.path()).unwrap();
            Self { dir, repo }
        }

        fn commit_file(&self, path: &str, contents: &str, message: &str) -> Oid {
            std::fs::write(self.dir.path().join(path), contents).unwrap();
            let mut index = self.repo.index().unwrap();
            index.add_path(Path::new(path)).unwrap();
            index.write().unwrap();
            let tree = self.repo.find_tree(index.write_tree().unwrap()).unwrap();
            let sig = Signature::now("Erosion", "erosion@example.com").unwrap();
            let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
            let parents: Vec<&git2::Commit> = parent.iter().collect();
            self.repo
                .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
                .unwrap()
        }

        fn git(&self) -> GitRepository {
            GitRepository::new("unused", self.dir.path())
        }
    }

    #[test]
    fn test_list_recent_commits_most_recent_first() {
        let repo = TestRepo::new();
        repo.commit_file("erosion.py", "a = 1\n", "minimal erosion - iteration 1");
        repo.commit_file("erosion.py", "a = 2\n", "slight erosion - iteration 2\n\nbody");
        let head = repo.commit_file("erosion.py", "a = 3\n", "moderate erosion - iteration 3");

        let commits = repo.git().list_recent_commits(2);
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].id, head.to_string());
        assert_eq!(commits[0].message, "moderate erosion - iteration 3");
        assert_eq!(commits[1].message, "slight erosion - iteration 2");
    }

    #[test]
    fn test_read_file_at_commit() {
        let repo = TestRepo::new();
        let first = repo.commit_file("erosion.py", "def erode():\n    pass\n", "iteration 1");
        repo.commit_file("erosion.py", "def erode#():\n", "iteration 2");

        let git = repo.git();
        assert_eq!(
            git.read_file_at_commit(&first.to_string(), "erosion.py").as_deref(),
            Some("def erode():\n    pass\n")
        );
        assert_eq!(git.read_file_at_commit(&first.to_string(), "missing.py"), None);
        assert_eq!(git.read_file_at_commit("deadbeef", "erosion.py"), None);
    }

    #[test]
    fn test_diff_against_parent() {
        let repo = TestRepo::new();
        repo.commit_file("erosion.py", "    for char in text:\n", "iteration 1");
        let second = repo.commit_file("erosion.py", "    for ch#r in text:\n", "iteration 2");

        let diff = repo
            .git()
            .diff_against_parent(&second.to_string(), "erosion.py")
            .unwrap();
        assert!(diff.contains("-    for char in text:"));
        assert!(diff.contains("+    for ch#r in text:"));
    }

    #[test]
    fn test_diff_of_root_commit_is_absent() {
        let repo = TestRepo::new();
        let root = repo.commit_file("erosion.py", "x = 1\n", "iteration 1");
        assert_eq!(repo.git().diff_against_parent(&root.to_string(), "erosion.py"), None);
    }

    #[test]
    fn test_missing_repository_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let git = GitRepository::new("unused", dir.path().join("nowhere"));
        assert!(git.list_recent_commits(20).is_empty());
        assert_eq!(git.read_file_at_commit("HEAD", "erosion.py"), None);
    }

    #[test]
    fn test_refresh_clones_then_pulls() {
        let upstream = TestRepo::new();
        upstream.commit_file("erosion.py", "a = 1\n", "iteration 1");

        let dir = tempfile::tempdir().unwrap();
        let mirror_path = dir.path().join("mirror");
        let url = upstream.dir.path().to_str().unwrap().to_string();
        let mirror = GitRepository::new(url, &mirror_path);

        assert!(mirror.refresh());
        assert_eq!(mirror.list_recent_commits(10).len(), 1);

        let head = upstream.commit_file("erosion.py", "a = 2\n", "iteration 2");
        assert!(mirror.refresh());
        let commits = mirror.list_recent_commits(10);
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].id, head.to_string());
    }
}
