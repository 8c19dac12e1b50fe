//! Thin wrappers around the system `git` binary.
//!
//! Using the system git means SSH keys, credential helpers and anything else
//! configured in `~/.gitconfig` keep working. Every call runs under a
//! deadline (see [`crate::process`]) and with `GIT_TERMINAL_PROMPT=0`, so a
//! repository that would ask for credentials fails instead of hanging.

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::process;

/// Flags for a `git clone` invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloneOptions {
    /// Clone without materializing a working tree (`--no-checkout`).
    pub no_checkout: bool,
    /// Shallow clone depth (`--depth`).
    pub depth: Option<u32>,
    /// Skip blob downloads (`--filter=blob:none`).
    pub blobless: bool,
    /// Start with a sparse checkout of top-level files only (`--sparse`).
    pub sparse: bool,
    /// Branch to clone (`--branch`); the remote default when `None`.
    pub branch: Option<String>,
}

impl CloneOptions {
    /// Render the options as git arguments, in a stable order.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.no_checkout {
            args.push("--no-checkout".to_string());
        }
        if let Some(depth) = self.depth {
            args.push(format!("--depth={}", depth));
        }
        if self.blobless {
            args.push("--filter=blob:none".to_string());
        }
        if self.sparse {
            args.push("--sparse".to_string());
        }
        if let Some(branch) = &self.branch {
            args.push("--branch".to_string());
            args.push(branch.clone());
        }
        args
    }
}

fn git() -> Command {
    let mut command = Command::new("git");
    command.env("GIT_TERMINAL_PROMPT", "0");
    command
}

/// Clone `url` into `target_dir`.
///
/// The parent directory is created if needed. `ref_label` only feeds the
/// error message.
pub fn clone(
    url: &str,
    target_dir: &Path,
    options: &CloneOptions,
    ref_label: &str,
    timeout: Duration,
) -> Result<()> {
    if let Some(parent) = target_dir.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut command = git();
    command
        .arg("clone")
        .args(options.to_args())
        .arg("--")
        .arg(url)
        .arg(target_dir);

    let output = process::run_with_timeout(&mut command, timeout).map_err(|e| match e {
        Error::Timeout { .. } => e,
        other => Error::GitClone {
            url: url.to_string(),
            r#ref: ref_label.to_string(),
            message: other.to_string(),
            hint: None,
        },
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);

        // Private repositories are out of scope, but say so clearly
        let hint = if stderr.contains("Authentication failed")
            || stderr.contains("Permission denied")
            || stderr.contains("could not read Username")
            || stderr.contains("Could not read from remote repository")
        {
            Some("the repository may be private or the URL may be wrong".to_string())
        } else {
            None
        };

        return Err(Error::GitClone {
            url: url.to_string(),
            r#ref: ref_label.to_string(),
            message: stderr.trim().to_string(),
            hint,
        });
    }

    Ok(())
}

/// Run `git -C <dir> <args>` and return trimmed stdout.
pub fn run(dir: &Path, args: &[&str], timeout: Duration) -> Result<String> {
    let mut command = git();
    command.arg("-C").arg(dir).args(args);

    let output = process::run_with_timeout(&mut command, timeout)?;
    if !output.status.success() {
        return Err(Error::GitCommand {
            command: args.join(" "),
            dir: dir.display().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Fetch `refspec` from `origin`, optionally shallow.
pub fn fetch(dir: &Path, refspec: &str, depth: Option<u32>, timeout: Duration) -> Result<()> {
    let depth_arg = depth.map(|d| format!("--depth={}", d));
    let mut args = vec!["fetch"];
    if let Some(depth_arg) = depth_arg.as_deref() {
        args.push(depth_arg);
    }
    args.extend(["origin", refspec]);
    run(dir, &args, timeout).map(|_| ())
}

/// Check out `rev` (a hash, tag or branch) in `dir`.
pub fn checkout(dir: &Path, rev: &str, timeout: Duration) -> Result<()> {
    run(dir, &["checkout", "--quiet", rev], timeout).map(|_| ())
}

/// Hard-reset the working tree in `dir` to `rev`.
pub fn reset_hard(dir: &Path, rev: &str, timeout: Duration) -> Result<()> {
    run(dir, &["reset", "--hard", "--quiet", rev], timeout).map(|_| ())
}

/// Plain `git pull` in `dir`.
pub fn pull(dir: &Path, timeout: Duration) -> Result<()> {
    run(dir, &["pull", "--quiet"], timeout).map(|_| ())
}

/// Restrict the working tree in `dir` to `paths` (cone mode).
pub fn sparse_checkout_set(dir: &Path, paths: &[String], timeout: Duration) -> Result<()> {
    let mut args = vec!["sparse-checkout", "set"];
    args.extend(paths.iter().map(String::as_str));
    run(dir, &args, timeout).map(|_| ())
}

/// The sparse-checkout path set of `dir`, or `None` when sparse checkout is
/// not enabled.
pub fn sparse_checkout_list(dir: &Path, timeout: Duration) -> Result<Option<Vec<String>>> {
    let enabled = run(dir, &["config", "--get", "core.sparseCheckout"], timeout)
        .map(|value| value == "true")
        .unwrap_or(false);
    if !enabled {
        return Ok(None);
    }

    let listing = run(dir, &["sparse-checkout", "list"], timeout)?;
    Ok(Some(
        listing
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
    ))
}

/// The commit hash of `HEAD`, abbreviated when `short` is set.
pub fn rev_parse_head(dir: &Path, short: bool, timeout: Duration) -> Result<String> {
    let args: &[&str] = if short {
        &["rev-parse", "--short", "HEAD"]
    } else {
        &["rev-parse", "HEAD"]
    };
    run(dir, args, timeout)
}

/// Every tag pointing at `HEAD`, sorted by name.
///
/// This is `git tag --points-at HEAD`: a commit that is merely *after* a tag
/// reports nothing, never the nearest tag. A commit can carry several tags,
/// so callers check membership instead of comparing a single name.
pub fn tags_at_head(dir: &Path, timeout: Duration) -> Result<Vec<String>> {
    match run(dir, &["tag", "--points-at", "HEAD"], timeout) {
        Ok(listing) => Ok(listing
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()),
        Err(Error::GitCommand { .. }) => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}
