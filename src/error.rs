//! # Error Handling
//!
//! This module defines the centralized error type for the `noir-mirror`
//! library. It uses `thiserror` to describe every anticipated failure mode
//! with enough context (repository, URL, git command, stderr) to turn it into
//! a readable status line.
//!
//! ## Key Components
//!
//! - **`Error`**: the enum of all failures the synchronization engine and the
//!   search subsystem can report.
//! - **`Result<T>`**: a type alias for `std::result::Result<T, Error>`.
//!
//! Failures are grouped the same way the sync orchestrator treats them:
//!
//! - Configuration errors (`Config`, `UnknownRepository`) are reported once
//!   and never retried.
//! - Transient errors (`GitClone`, `GitCommand`, `Spawn`, `Timeout`, `Io`)
//!   are recorded per repository so that sibling repositories still sync.
//! - `Matcher` never reaches search callers; the engine falls back to the
//!   in-process scan.
//! - `NotMirrored` is a contract violation: updating a repository that has
//!   never been checked out.

use std::time::Duration;

use thiserror::Error;

/// Main error type for noir-mirror operations
#[derive(Error, Debug)]
pub enum Error {
    /// The pin table or a request was malformed.
    #[error("Configuration error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    Config {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A request referenced a repository name that is not in the pin table.
    #[error("Unknown repository '{name}'")]
    UnknownRepository { name: String },

    /// An error occurred while cloning a Git repository.
    ///
    /// Includes the repository URL, ref (branch/tag/commit), error message,
    /// and an optional hint for resolution.
    #[error("Git clone error for {url}@{r#ref}: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    GitClone {
        url: String,
        r#ref: String,
        message: String,
        /// Optional hint for how to resolve the clone issue
        hint: Option<String>,
    },

    /// A git command inside an existing working tree failed.
    #[error("Git command failed in {dir}: git {command} - {stderr}")]
    GitCommand {
        command: String,
        dir: String,
        stderr: String,
    },

    /// An update was requested for a repository that is not on disk.
    #[error("Repository '{name}' is not mirrored at {path}")]
    NotMirrored { name: String, path: String },

    /// A subprocess ran past its deadline and was killed.
    #[error("Command timed out after {}s: {command}", timeout.as_secs())]
    Timeout { command: String, timeout: Duration },

    /// A subprocess could not be started at all.
    #[error("Failed to spawn {program}: {message}")]
    Spawn { program: String, message: String },

    /// The external line matcher ran but reported an error.
    #[error("Matcher {program} failed: {message}")]
    Matcher { program: String, message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl Error {
    /// Shorthand for a configuration error without a hint.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            hint: None,
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
