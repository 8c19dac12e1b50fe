//! # Error Suggestions
//!
//! Helpers that build CLI errors carrying hints. An error should say what
//! went wrong and how to fix it.
//!
//! ```rust,ignore
//! use noir_mirror::suggestions;
//!
//! // Instead of:
//! anyhow::bail!("Unknown repository: {}", name);
//!
//! // Use:
//! return Err(suggestions::unknown_repository(name, &pins));
//! ```

use std::path::Path;

use crate::pin::RepositoryPin;

/// Error for a pin table file that does not exist.
pub fn catalog_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Pin table not found: {path}\n\n\
         hint: Omit --catalog to use the built-in table\n\
         hint: Unset NOIR_MIRROR_CATALOG if it points at a removed file",
        path = path.display()
    )
}

/// Error for a repository name missing from the pin table, suggesting the
/// closest known name.
pub fn unknown_repository(name: &str, pins: &[RepositoryPin]) -> anyhow::Error {
    let names: Vec<&str> = pins.iter().map(|p| p.name.as_str()).collect();
    let did_you_mean = find_similar(name, &names)
        .map(|s| format!("\nhint: Did you mean '{s}'?"))
        .unwrap_or_default();

    anyhow::anyhow!(
        "Unknown repository: {name}{did_you_mean}\n\n\
         Known repositories are: {known}\n\
         hint: Run 'noir-mirror status' to see every pinned repository",
        known = names.join(", ")
    )
}

/// Error for a search in a mirror that has not been synced yet.
pub fn mirror_empty(root: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "No repositories mirrored at {root}\n\n\
         hint: Run 'noir-mirror sync' first\n\
         hint: Use --mirror-dir or NOIR_MIRROR_DIR to point at an existing mirror",
        root = root.display()
    )
}

/// Error for a sync batch with failed repositories.
pub fn sync_failed(failed: usize, total: usize) -> anyhow::Error {
    anyhow::anyhow!(
        "{failed} of {total} repositories failed to sync\n\n\
         hint: Re-run with --log-level debug to see the git commands\n\
         hint: Use --force to reclone a repository from scratch"
    )
}

/// Find a similar string from a list of candidates using edit distance.
///
/// Returns Some(candidate) if a close match is found (edit distance <= 2).
fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = edit_distance(input, candidate);
            if distance <= 2 && distance < input.len() {
                Some((candidate, distance))
            } else {
                None
            }
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Calculate the Levenshtein edit distance between two strings.
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.iter().enumerate() {
        let mut current = vec![i + 1; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        previous = current;
    }

    previous[b.len()]
}
