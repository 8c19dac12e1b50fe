//! In-process fallback matcher.
//!
//! Walks the search root with ripgrep's own directory walker, so the same
//! files are visited: hidden entries are skipped, `.gitignore`, `.ignore`
//! and git exclude rules are honored, and entries come in path order. Each
//! line is tested against the query.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use glob::{MatchOptions, Pattern};
use ignore::WalkBuilder;
use log::debug;
use regex::{Regex, RegexBuilder};

use super::{LineMatcher, RawMatch, SearchOptions};
use crate::error::Result;

/// Scans files with `ignore` and `regex`; needs no external program.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanMatcher;

impl LineMatcher for ScanMatcher {
    fn name(&self) -> &'static str {
        "scan"
    }

    fn find(&self, root: &Path, query: &str, options: &SearchOptions) -> Result<Vec<RawMatch>> {
        let mut matches = Vec::new();
        if options.max_results == 0 || !root.is_dir() {
            return Ok(matches);
        }

        let filter = FileFilter::new(&options.file_pattern)?;
        let regex = compile_query(query, options.case_sensitive)?;

        let files = WalkBuilder::new(root)
            .hidden(true)
            .git_ignore(true)
            .git_exclude(true)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build()
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!("skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|e| e.file_type().map_or(false, |ft| ft.is_file()));

        for entry in files {
            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            if !filter.matches(relative) {
                continue;
            }
            if scan_file(entry.path(), &regex, options.max_results, &mut matches) {
                break;
            }
        }
        Ok(matches)
    }
}

/// Compile `query`, treating it as a literal string when it is not a valid
/// regular expression.
pub fn compile_query(query: &str, case_sensitive: bool) -> Result<Regex> {
    let build = |source: &str| {
        RegexBuilder::new(source)
            .case_insensitive(!case_sensitive)
            .build()
    };
    match build(query) {
        Ok(regex) => Ok(regex),
        Err(e) => {
            debug!("query is not a valid regex ({}), matching literally", e);
            Ok(build(&regex::escape(query))?)
        }
    }
}

/// Expand `{a,b}` alternatives into separate patterns.
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let open = match pattern.find('{') {
        Some(open) => open,
        None => return vec![pattern.to_string()],
    };
    let close = match pattern[open..].find('}') {
        Some(offset) => open + offset,
        None => return vec![pattern.to_string()],
    };

    let (prefix, body, suffix) = (&pattern[..open], &pattern[open + 1..close], &pattern[close + 1..]);
    body.split(',')
        .flat_map(|alternative| expand_braces(&format!("{}{}{}", prefix, alternative, suffix)))
        .collect()
}

/// The file half of a search: which paths under the root are scanned.
///
/// Patterns without a `/` match the file name anywhere below the root, so
/// `*.nr` behaves like `**/*.nr`. Patterns with a `/` match the path
/// relative to the root.
#[derive(Debug)]
struct FileFilter {
    patterns: Vec<(Pattern, bool)>,
}

impl FileFilter {
    fn new(file_pattern: &str) -> Result<Self> {
        let mut patterns = Vec::new();
        for p in expand_braces(file_pattern) {
            patterns.push((Pattern::new(&p)?, p.contains('/')));
        }
        Ok(Self { patterns })
    }

    fn matches(&self, relative: &Path) -> bool {
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: true,
        };
        let name = relative.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        let full = relative.to_string_lossy().replace('\\', "/");
        self.patterns.iter().any(|(pattern, anchored)| {
            if *anchored {
                pattern.matches_with(&full, options)
            } else {
                pattern.matches_with(&name, options)
            }
        })
    }
}

/// Append matching lines of `path`; returns true once `max` is reached.
fn scan_file(path: &Path, regex: &Regex, max: usize, matches: &mut Vec<RawMatch>) -> bool {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            debug!("skipping {}: {}", path.display(), e);
            return false;
        }
    };

    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();
    let mut number = 0;
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => return false,
            Ok(_) => {}
            Err(e) => {
                debug!("stopped reading {}: {}", path.display(), e);
                return false;
            }
        }
        number += 1;
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']);
        if regex.is_match(line) {
            matches.push(RawMatch {
                path: path.to_path_buf(),
                line: Some(number),
                content: line.to_string(),
            });
            if matches.len() >= max {
                return true;
            }
        }
    }
}
