//! # Mirror Store
//!
//! The on-disk collection of working trees, one per repository, at
//! `root/<name>`. The store answers questions about what is on disk (does
//! the entry exist, which commit and tag is it on, which sparse paths are
//! checked out) and carries no decision logic.
//!
//! Introspection never fails: a lookup that cannot be answered (missing
//! entry, corrupt repository, git error) degrades to `None`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;
use serde::Serialize;

use crate::config::MirrorConfig;
use crate::error::Result;
use crate::pin::{Category, RepositoryPin};
use crate::repository::{DefaultGitOperations, GitOperations};

/// Marker directory that makes a directory under the root a mirror entry.
const GIT_DIR: &str = ".git";

/// Accessors for the mirrored working trees.
#[derive(Clone)]
pub struct MirrorStore {
    root: PathBuf,
    git: Arc<dyn GitOperations>,
}

impl std::fmt::Debug for MirrorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MirrorStore")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl MirrorStore {
    /// A store using the system git with the configured timeout.
    pub fn new(config: &MirrorConfig) -> Self {
        Self::with_operations(
            config.root.clone(),
            Arc::new(DefaultGitOperations::new(config.git_timeout)),
        )
    }

    /// A store with a custom `GitOperations` implementation.
    pub fn with_operations(root: PathBuf, git: Arc<dyn GitOperations>) -> Self {
        Self { root, git }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn git(&self) -> &dyn GitOperations {
        self.git.as_ref()
    }

    /// Where repository `name` lives, whether or not it exists yet.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// True when `root/name` is a directory with git metadata.
    pub fn exists(&self, name: &str) -> bool {
        let path = self.path_for(name);
        path.is_dir() && path.join(GIT_DIR).exists()
    }

    /// Full commit hash of `HEAD`.
    pub fn current_commit(&self, name: &str) -> Option<String> {
        self.head(name, false)
    }

    /// Abbreviated commit hash of `HEAD`.
    pub fn short_commit(&self, name: &str) -> Option<String> {
        self.head(name, true)
    }

    fn head(&self, name: &str, short: bool) -> Option<String> {
        if !self.exists(name) {
            return None;
        }
        match self.git.head_commit(&self.path_for(name), short) {
            Ok(commit) if !commit.is_empty() => Some(commit),
            Ok(_) => None,
            Err(e) => {
                debug!("could not resolve HEAD of {}: {}", name, e);
                None
            }
        }
    }

    /// Tags `HEAD` sits exactly on; empty if it is on no tag or the tags
    /// cannot be determined.
    pub fn current_tags(&self, name: &str) -> Vec<String> {
        if !self.exists(name) {
            return Vec::new();
        }
        self.git
            .tags_at_head(&self.path_for(name))
            .unwrap_or_else(|e| {
                debug!("could not read tags of {}: {}", name, e);
                Vec::new()
            })
    }

    /// True when `tag` is one of the tags at `HEAD`.
    pub fn is_on_tag(&self, name: &str, tag: &str) -> bool {
        self.current_tags(name).iter().any(|t| t == tag)
    }

    /// Sparse-checkout paths, `None` for a full checkout.
    pub fn sparse_paths(&self, name: &str) -> Option<Vec<String>> {
        if !self.exists(name) {
            return None;
        }
        self.git
            .sparse_checkout_list(&self.path_for(name))
            .unwrap_or_else(|e| {
                debug!("could not read sparse paths of {}: {}", name, e);
                None
            })
    }

    /// Create the mirror root if missing. Idempotent.
    pub fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Recursively remove `root/name` if present.
    pub fn remove(&self, name: &str) -> Result<()> {
        let path = self.path_for(name);
        if path.exists() {
            debug!("removing {}", path.display());
            fs::remove_dir_all(&path)?;
        }
        Ok(())
    }

    /// Status rows for every pin, recomputed from disk on each call.
    pub fn library_entries(&self, pins: &[RepositoryPin]) -> Vec<LibraryEntry> {
        pins.iter()
            .map(|pin| {
                let spec = pin.ref_spec();
                let cloned = self.exists(&pin.name);
                LibraryEntry {
                    name: pin.name.clone(),
                    url: pin.url.clone(),
                    category: pin.category,
                    ref_kind: spec.kind(),
                    ref_name: spec.name().to_string(),
                    description: pin.description.clone(),
                    cloned,
                    commit: if cloned {
                        self.short_commit(&pin.name)
                    } else {
                        None
                    },
                }
            })
            .collect()
    }
}

/// A pin plus its live on-disk state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryEntry {
    pub name: String,
    pub url: String,
    pub category: Category,
    pub ref_kind: &'static str,
    pub ref_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub cloned: bool,
    /// Short commit hash when cloned.
    pub commit: Option<String>,
}
