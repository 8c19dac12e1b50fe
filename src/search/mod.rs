//! # Search Engine
//!
//! Line search over the mirror. Two [`LineMatcher`] implementations produce
//! [`RawMatch`]es:
//!
//! - [`RipgrepMatcher`] runs an external `rg` process. It is chosen when a
//!   `--version` probe succeeds at call time.
//! - [`ScanMatcher`] walks the files in-process. It is used when the probe
//!   fails, when no external matcher is configured, and when the external
//!   run errors.
//!
//! Raw matches from either side go through the same [`normalize`] stage,
//! so both produce the same [`SearchResult`] shape.
//!
//! A mirror that has not been synced yet is a normal state: searching a
//! root that does not exist yields no results rather than an error.

pub mod normalize;
pub mod ripgrep;
pub mod scan;

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use log::debug;
use serde::Serialize;

use crate::config::MirrorConfig;
use crate::defaults;
use crate::error::{Error, Result};

pub use normalize::{normalize, parse_match_line};
pub use ripgrep::RipgrepMatcher;
pub use scan::ScanMatcher;

/// Parameters of one search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Glob for candidate files; `{a,b}` alternatives are allowed.
    pub file_pattern: String,
    /// Mirror-relative subdirectory to search instead of the whole mirror.
    pub repo: Option<String>,
    pub max_results: usize,
    pub case_sensitive: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            file_pattern: defaults::DEFAULT_FILE_PATTERN.to_string(),
            repo: None,
            max_results: defaults::DEFAULT_MAX_RESULTS,
            case_sensitive: false,
        }
    }
}

/// One matching line, relative to the mirror root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    /// Mirror-relative path with `/` separators.
    pub file: String,
    /// 1-based line number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// The matched line, trimmed.
    pub content: String,
    /// First segment of `file`.
    pub repo: String,
}

/// A match as reported by a matcher, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMatch {
    pub path: PathBuf,
    pub line: Option<usize>,
    pub content: String,
}

/// Finds lines matching a query under a root directory.
pub trait LineMatcher {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Matching lines under `root` in files selected by
    /// `options.file_pattern`.
    fn find(&self, root: &Path, query: &str, options: &SearchOptions) -> Result<Vec<RawMatch>>;
}

/// Searches the mirror described by a [`MirrorConfig`].
#[derive(Debug, Clone)]
pub struct SearchEngine {
    root: PathBuf,
    matcher: Option<String>,
    timeout: Duration,
}

impl SearchEngine {
    pub fn new(config: &MirrorConfig) -> Self {
        Self {
            root: config.root.clone(),
            matcher: config.matcher.clone(),
            timeout: config.search_timeout,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Search the mirror for `query`.
    ///
    /// Fails only when `options.repo` tries to leave the mirror root.
    pub fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<SearchResult>> {
        let root = self.scope_root(options.repo.as_deref())?;
        if options.max_results == 0 || !root.is_dir() {
            debug!("nothing to search under {}", root.display());
            return Ok(Vec::new());
        }

        let raw = match self.external_matcher() {
            Some(matcher) => match matcher.find(&root, query, options) {
                Ok(raw) => raw,
                Err(e) => {
                    debug!("{} failed, falling back to scan: {}", matcher.name(), e);
                    ScanMatcher.find(&root, query, options)?
                }
            },
            None => ScanMatcher.find(&root, query, options)?,
        };

        Ok(raw
            .into_iter()
            .filter_map(|m| normalize(&self.root, m))
            .take(options.max_results)
            .collect())
    }

    /// Search Markdown documentation of the core repository, optionally
    /// within one `section` of it.
    pub fn search_docs(
        &self,
        query: &str,
        section: Option<&str>,
        max_results: usize,
    ) -> Result<Vec<SearchResult>> {
        let scope = match section.map(str::trim).filter(|s| !s.is_empty()) {
            Some(section) => format!("{}/{}", defaults::DOCS_SCOPE, section.trim_matches('/')),
            None => defaults::DOCS_SCOPE.to_string(),
        };
        self.search(
            query,
            &SearchOptions {
                file_pattern: defaults::DOCS_FILE_PATTERN.to_string(),
                repo: Some(scope),
                max_results,
                case_sensitive: false,
            },
        )
    }

    /// Search the standard library sources.
    pub fn search_stdlib(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        self.search(
            query,
            &SearchOptions {
                file_pattern: defaults::DEFAULT_FILE_PATTERN.to_string(),
                repo: Some(defaults::STDLIB_SCOPE.to_string()),
                max_results,
                case_sensitive: false,
            },
        )
    }

    fn external_matcher(&self) -> Option<RipgrepMatcher> {
        let program = self.matcher.as_deref()?;
        let matcher = RipgrepMatcher::new(program, self.timeout);
        if matcher.is_available() {
            Some(matcher)
        } else {
            debug!("{} not available, using in-process scan", program);
            None
        }
    }

    fn scope_root(&self, repo: Option<&str>) -> Result<PathBuf> {
        let repo = match repo.map(str::trim).filter(|r| !r.is_empty()) {
            Some(repo) => repo,
            None => return Ok(self.root.clone()),
        };
        let scope = Path::new(repo);
        let escapes = scope
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(Error::Config {
                message: format!("Search scope '{}' is outside the mirror", repo),
                hint: Some("Use a path relative to the mirror root, such as 'noir/noir_stdlib'".to_string()),
            });
        }
        Ok(self.root.join(scope))
    }
}
