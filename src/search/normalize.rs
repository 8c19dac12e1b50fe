//! Shared post-processing for both line matchers.
//!
//! Matchers report paths the way they found them: absolute, or relative to
//! a relative mirror root. [`normalize`] turns them into mirror-relative,
//! `/`-separated paths and derives the owning repository from the first
//! segment.

use std::path::{Component, Path, PathBuf};

use super::{RawMatch, SearchResult};

/// Parse one `path:line:content` line of matcher output.
///
/// The line number is the first all-digit field between two colons, so
/// paths containing colons (drive letters) still parse. Lines without such
/// a field are malformed and yield `None`.
pub fn parse_match_line(line: &str) -> Option<RawMatch> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let mut offset = 0;
    while let Some(pos) = line[offset..].find(':') {
        let start = offset + pos;
        let rest = &line[start + 1..];
        if let Some(end) = rest.find(':') {
            let digits = &rest[..end];
            if start > 0 && !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                if let Ok(number) = digits.parse::<usize>() {
                    return Some(RawMatch {
                        path: PathBuf::from(&line[..start]),
                        line: Some(number),
                        content: rest[end + 1..].to_string(),
                    });
                }
            }
        }
        offset = start + 1;
    }
    None
}

/// Convert a raw match into a result relative to `mirror_root`.
///
/// Returns `None` for paths outside the mirror or without a repository
/// segment.
pub fn normalize(mirror_root: &Path, raw: RawMatch) -> Option<SearchResult> {
    let relative = match raw.path.strip_prefix(mirror_root) {
        Ok(relative) => relative.to_path_buf(),
        Err(_) if raw.path.is_relative() => raw.path.clone(),
        Err(_) => return None,
    };

    let segments: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    let repo = segments.first()?.clone();
    if segments.len() < 2 {
        return None;
    }

    Some(SearchResult {
        file: segments.join("/"),
        line: raw.line,
        content: raw.content.trim().to_string(),
        repo,
    })
}
