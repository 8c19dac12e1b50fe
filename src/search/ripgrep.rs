//! Subprocess-backed matcher using ripgrep.

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use log::debug;

use super::normalize::parse_match_line;
use super::{LineMatcher, RawMatch, SearchOptions};
use crate::error::{Error, Result};
use crate::process;

/// Runs an `rg`-compatible program over the search root.
///
/// The query and pattern are passed as separate argv elements, never
/// through a shell, so they reach the matcher byte for byte.
#[derive(Debug, Clone)]
pub struct RipgrepMatcher {
    program: String,
    timeout: Duration,
}

impl RipgrepMatcher {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// True when `<program> --version` runs and exits successfully.
    pub fn is_available(&self) -> bool {
        let mut command = Command::new(&self.program);
        command.arg("--version");
        match process::run_with_timeout(&mut command, self.timeout) {
            Ok(output) => output.status.success(),
            Err(e) => {
                debug!("matcher {} unavailable: {}", self.program, e);
                false
            }
        }
    }

    fn command(&self, root: &Path, query: &str, options: &SearchOptions) -> Command {
        let mut command = Command::new(&self.program);
        command.args([
            "--no-config",
            "--line-number",
            "--no-heading",
            "--with-filename",
            "--color",
            "never",
            "--sort",
            "path",
        ]);
        if !options.case_sensitive {
            command.arg("-i");
        }
        command
            .arg("--glob")
            .arg(&options.file_pattern)
            .arg("-e")
            .arg(query)
            .arg(root);
        command
    }
}

impl LineMatcher for RipgrepMatcher {
    fn name(&self) -> &'static str {
        "ripgrep"
    }

    fn find(&self, root: &Path, query: &str, options: &SearchOptions) -> Result<Vec<RawMatch>> {
        let mut command = self.command(root, query, options);
        let cap = options.max_results.saturating_mul(2);
        let output = process::run_lines_with_timeout(&mut command, self.timeout, cap)?;

        // Exit 1 is "no matches". A child killed by the closed pipe after the
        // cap was reached is still a successful run.
        let code = output.status.code();
        if !(output.truncated || matches!(code, Some(0) | Some(1))) {
            return Err(Error::Matcher {
                program: self.program.clone(),
                message: match code {
                    Some(code) => format!("exit status {}: {}", code, output.stderr.trim()),
                    None => format!("terminated by signal: {}", output.stderr.trim()),
                },
            });
        }

        Ok(output
            .lines
            .iter()
            .filter_map(|line| parse_match_line(line))
            .collect())
    }
}
