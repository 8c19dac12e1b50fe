//! # Version Reconciler
//!
//! Compares a pin with what is on disk and decides whether the working tree
//! can be kept (and at most updated forward) or must be thrown away and
//! cloned again.
//!
//! Pins are checked in priority order:
//!
//! 1. **Commit**: the strongest contract. The on-disk `HEAD` must start with
//!    the pinned hash, so abbreviated hashes work.
//! 2. **Tag**: the pinned tag must be one of the tags pointing at `HEAD`.
//!    A commit may carry several tags. A `HEAD` that is on no tag at all
//!    counts as a mismatch.
//! 3. **Branch**: never forces a reclone; branches are updated in place.

use log::debug;

use crate::mirror::MirrorStore;
use crate::pin::{RefSpec, RepositoryPin};

/// What the reconciler concluded about one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// Nothing on disk yet.
    Missing,
    /// On disk, but at the wrong commit or tag.
    Mismatch {
        expected: String,
        found: Option<String>,
    },
    /// On disk at exactly the pinned commit or tag.
    UpToDate,
    /// Branch pin on disk; bring it forward with an update.
    NeedsUpdate,
}

impl Reconciliation {
    pub fn needs_reclone(&self) -> bool {
        matches!(self, Reconciliation::Missing | Reconciliation::Mismatch { .. })
    }
}

/// Compare `pin` with the mirror entry of the same name.
pub fn assess(pin: &RepositoryPin, store: &MirrorStore) -> Reconciliation {
    if !store.exists(&pin.name) {
        return Reconciliation::Missing;
    }

    let verdict = match pin.ref_spec() {
        RefSpec::Commit(expected) => {
            let found = store.current_commit(&pin.name);
            match &found {
                Some(current) if current.starts_with(expected.as_str()) => {
                    Reconciliation::UpToDate
                }
                _ => Reconciliation::Mismatch { expected, found },
            }
        }
        RefSpec::Tag(expected) => {
            let tags = store.current_tags(&pin.name);
            if tags.iter().any(|t| *t == expected) {
                Reconciliation::UpToDate
            } else {
                let found = (!tags.is_empty()).then(|| tags.join(", "));
                Reconciliation::Mismatch { expected, found }
            }
        }
        RefSpec::Branch(_) => Reconciliation::NeedsUpdate,
    };

    if let Reconciliation::Mismatch { expected, found } = &verdict {
        debug!(
            "{} is at {} but pinned to {}",
            pin.name,
            found.as_deref().unwrap_or("<unknown>"),
            expected
        );
    }
    verdict
}

/// True when the entry for `pin` is missing or pinned to something else.
pub fn needs_reclone(pin: &RepositoryPin, store: &MirrorStore) -> bool {
    assess(pin, store).needs_reclone()
}
