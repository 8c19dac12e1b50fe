//! # Mirror Configuration
//!
//! [`MirrorConfig`] is the single value every component is built from: where
//! the mirror lives, how long subprocesses may run, which external matcher
//! to probe, and the default language version. It is passed explicitly into
//! constructors, so tests can point several stores at different temporary
//! roots side by side.
//!
//! The environment is consulted in exactly one place,
//! [`MirrorConfig::from_env`], which reads:
//!
//! - `NOIR_MIRROR_DIR`: mirror root (defaults to the platform cache dir)
//! - `NOIR_VERSION`: default tag for the core repository

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::defaults;

/// Settings shared by the mirror store, checkout strategy, orchestrator and
/// search engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorConfig {
    /// Base directory; repository `name` lives at `root/name`.
    pub root: PathBuf,
    /// Deadline for each git command.
    pub git_timeout: Duration,
    /// Deadline for each external matcher run.
    pub search_timeout: Duration,
    /// External matcher program; `None` always uses the in-process scan.
    pub matcher: Option<String>,
    /// Default tag for the core repository when a sync request names none.
    pub core_version: Option<String>,
}

impl MirrorConfig {
    /// A configuration rooted at `root` with default timeouts and matcher.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            git_timeout: defaults::DEFAULT_GIT_TIMEOUT,
            search_timeout: defaults::DEFAULT_SEARCH_TIMEOUT,
            matcher: Some(defaults::DEFAULT_MATCHER.to_string()),
            core_version: None,
        }
    }

    /// Build a configuration from the process environment.
    pub fn from_env() -> Self {
        let root = non_empty_var(defaults::MIRROR_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(defaults::default_mirror_root);
        Self::new(root).with_core_version(non_empty_var(defaults::CORE_VERSION_ENV))
    }

    pub fn with_git_timeout(mut self, timeout: Duration) -> Self {
        self.git_timeout = timeout;
        self
    }

    pub fn with_search_timeout(mut self, timeout: Duration) -> Self {
        self.search_timeout = timeout;
        self
    }

    pub fn with_matcher(mut self, matcher: Option<String>) -> Self {
        self.matcher = matcher.filter(|m| !m.trim().is_empty());
        self
    }

    pub fn with_core_version(mut self, version: Option<String>) -> Self {
        self.core_version = version.filter(|v| !v.trim().is_empty());
        self
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
