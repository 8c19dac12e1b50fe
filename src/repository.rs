//! # Git Operations Seam
//!
//! The synchronization engine never calls `git` directly. Everything goes
//! through the [`GitOperations`] trait, which separates the decision logic
//! (what to clone, which ref to fetch, when to fall back to a pull) from the
//! mechanics of running git.
//!
//! In the application, [`DefaultGitOperations`] wraps the functions in
//! [`crate::git`] with a shared timeout. In tests, a recording
//! implementation can be swapped in to check the exact sequence of
//! operations a checkout plan performs without touching the network.

use std::path::Path;
use std::time::Duration;

use crate::error::Result;
use crate::git::{self, CloneOptions};

/// Trait for git operations - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// Clones `url` into `target_dir` with the given flags.
    ///
    /// `ref_label` names the ref being materialized, for error messages.
    fn clone_repo(
        &self,
        url: &str,
        target_dir: &Path,
        options: &CloneOptions,
        ref_label: &str,
    ) -> Result<()>;

    /// Fetches `refspec` from `origin`, optionally with a shallow depth.
    fn fetch(&self, dir: &Path, refspec: &str, depth: Option<u32>) -> Result<()>;

    /// Checks out a commit hash, tag or branch.
    fn checkout(&self, dir: &Path, rev: &str) -> Result<()>;

    /// Hard-resets the working tree to `rev`.
    fn reset_hard(&self, dir: &Path, rev: &str) -> Result<()>;

    /// Runs a conventional `git pull`.
    fn pull(&self, dir: &Path) -> Result<()>;

    /// Restricts the working tree to `paths`.
    fn sparse_checkout_set(&self, dir: &Path, paths: &[String]) -> Result<()>;

    /// Lists the sparse-checkout paths, `None` when sparse checkout is off.
    fn sparse_checkout_list(&self, dir: &Path) -> Result<Option<Vec<String>>>;

    /// Resolves `HEAD` to a full or abbreviated commit hash.
    fn head_commit(&self, dir: &Path, short: bool) -> Result<String>;

    /// Every tag pointing at `HEAD`; empty when `HEAD` is on no tag.
    fn tags_at_head(&self, dir: &Path) -> Result<Vec<String>>;
}

/// The default implementation of `GitOperations`, which uses the system's
/// `git` command with a per-command timeout.
#[derive(Debug, Clone)]
pub struct DefaultGitOperations {
    timeout: Duration,
}

impl DefaultGitOperations {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl GitOperations for DefaultGitOperations {
    fn clone_repo(
        &self,
        url: &str,
        target_dir: &Path,
        options: &CloneOptions,
        ref_label: &str,
    ) -> Result<()> {
        git::clone(url, target_dir, options, ref_label, self.timeout)
    }

    fn fetch(&self, dir: &Path, refspec: &str, depth: Option<u32>) -> Result<()> {
        git::fetch(dir, refspec, depth, self.timeout)
    }

    fn checkout(&self, dir: &Path, rev: &str) -> Result<()> {
        git::checkout(dir, rev, self.timeout)
    }

    fn reset_hard(&self, dir: &Path, rev: &str) -> Result<()> {
        git::reset_hard(dir, rev, self.timeout)
    }

    fn pull(&self, dir: &Path) -> Result<()> {
        git::pull(dir, self.timeout)
    }

    fn sparse_checkout_set(&self, dir: &Path, paths: &[String]) -> Result<()> {
        git::sparse_checkout_set(dir, paths, self.timeout)
    }

    fn sparse_checkout_list(&self, dir: &Path) -> Result<Option<Vec<String>>> {
        git::sparse_checkout_list(dir, self.timeout)
    }

    fn head_commit(&self, dir: &Path, short: bool) -> Result<String> {
        git::rev_parse_head(dir, short, self.timeout)
    }

    fn tags_at_head(&self, dir: &Path) -> Result<Vec<String>> {
        git::tags_at_head(dir, self.timeout)
    }
}
