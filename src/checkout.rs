//! # Checkout Strategy
//!
//! Produces a working tree that matches a pin while transferring as little
//! as possible.
//!
//! [`CheckoutStrategy::ensure`] first asks the reconciler whether the
//! existing entry can be kept. A kept entry is updated in place; anything
//! else is removed and checked out fresh. Fresh checkouts follow the pin's
//! ref kind:
//!
//! | Pin    | Clone                                   | Then                              |
//! |--------|-----------------------------------------|-----------------------------------|
//! | commit | `--no-checkout` (+ blobless if sparse)  | sparse set, fetch hash, checkout  |
//! | tag    | `--no-checkout` (+ blobless if sparse)  | sparse set, shallow fetch tag, checkout |
//! | branch | `--depth=1 --branch` (+ blobless, `--sparse`) | sparse set                  |
//!
//! Commit and tag pins need a no-checkout clone because the wanted ref is
//! usually not the tip of the default branch; branch pins are the clone
//! target themselves. Sparse clones always skip blobs so unneeded file
//! contents are never downloaded.
//!
//! A fresh checkout that fails part-way is removed again, so a half-built
//! tree is never mistaken for a synced entry.

use std::fmt;

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::git::CloneOptions;
use crate::mirror::MirrorStore;
use crate::pin::{RefSpec, RepositoryPin};
use crate::reconcile::{self, Reconciliation};

/// What `ensure` did to the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutAction {
    /// Removed (if present) and checked out fresh.
    Cloned,
    /// Brought forward in place.
    Updated,
    /// Already at the pinned commit or tag.
    Unchanged,
}

/// Successful outcome of reconciling one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutReport {
    pub name: String,
    pub ref_spec: RefSpec,
    pub sparse_paths: Option<Vec<String>>,
    pub action: CheckoutAction,
    /// Short commit hash after the operation, when it could be read.
    pub commit: Option<String>,
}

impl fmt::Display for CheckoutReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.action {
            CheckoutAction::Cloned => write!(f, "Cloned {} at {}", self.name, self.ref_spec)?,
            CheckoutAction::Updated => write!(f, "Updated {} at {}", self.name, self.ref_spec)?,
            CheckoutAction::Unchanged => {
                write!(f, "{} already at {}", self.name, self.ref_spec)?
            }
        }
        if let Some(paths) = &self.sparse_paths {
            write!(f, " [sparse: {}]", paths.join(", "))?;
        }
        Ok(())
    }
}

/// Clone, update and check out mirror entries.
#[derive(Debug, Clone)]
pub struct CheckoutStrategy {
    store: MirrorStore,
}

impl CheckoutStrategy {
    pub fn new(store: MirrorStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &MirrorStore {
        &self.store
    }

    /// Make the entry for `pin` match it, recloning when `force` is set or
    /// the reconciler finds a mismatch.
    pub fn ensure(&self, pin: &RepositoryPin, force: bool) -> Result<CheckoutReport> {
        let verdict = reconcile::assess(pin, &self.store);
        let reclone = force || verdict.needs_reclone();

        if !reclone {
            return self.update_in_place(pin);
        }

        if self.store.exists(&pin.name) {
            info!(
                "recloning {} ({})",
                pin.name,
                if force { "forced" } else { "pin changed" }
            );
        }
        // Also clears leftovers that are not a valid entry, which git
        // would refuse to clone into.
        self.store.remove(&pin.name)?;
        self.fresh_checkout(pin)
    }

    /// Bring an existing entry forward without recloning.
    ///
    /// Branch pins fetch the branch tip shallowly and hard-reset to it,
    /// falling back to `git pull`. Commit and tag pins that already match
    /// are left alone; otherwise the pinned ref is fetched and checked out.
    ///
    /// Returns [`Error::NotMirrored`] when there is no entry to update.
    pub fn update_in_place(&self, pin: &RepositoryPin) -> Result<CheckoutReport> {
        let dir = self.store.path_for(&pin.name);
        if !self.store.exists(&pin.name) {
            return Err(Error::NotMirrored {
                name: pin.name.clone(),
                path: dir.display().to_string(),
            });
        }

        let git = self.store.git();
        let spec = pin.ref_spec();

        if let Some(paths) = pin.sparse() {
            if self.store.sparse_paths(&pin.name).as_deref() != Some(paths) {
                debug!("updating sparse paths of {}", pin.name);
                git.sparse_checkout_set(&dir, paths)?;
            }
        }

        let action = match &spec {
            RefSpec::Branch(branch) => {
                let refspec = branch.as_deref().unwrap_or("HEAD");
                let shallow = git
                    .fetch(&dir, refspec, Some(1))
                    .and_then(|_| git.reset_hard(&dir, "FETCH_HEAD"));
                if let Err(e) = shallow {
                    warn!("shallow update of {} failed, trying pull: {}", pin.name, e);
                    git.pull(&dir)?;
                }
                CheckoutAction::Updated
            }
            RefSpec::Commit(_) | RefSpec::Tag(_) => {
                if reconcile::assess(pin, &self.store) == Reconciliation::UpToDate {
                    CheckoutAction::Unchanged
                } else {
                    self.fetch_pinned_ref(pin, &spec)?;
                    git.checkout(&dir, spec.name())?;
                    CheckoutAction::Updated
                }
            }
        };

        Ok(self.report(pin, spec, action))
    }

    fn fresh_checkout(&self, pin: &RepositoryPin) -> Result<CheckoutReport> {
        let spec = pin.ref_spec();
        info!("cloning {} at {}", pin.name, spec);

        if let Err(e) = self.run_fresh_plan(pin, &spec) {
            if let Err(cleanup) = self.store.remove(&pin.name) {
                warn!("could not remove partial checkout of {}: {}", pin.name, cleanup);
            }
            return Err(e);
        }

        Ok(self.report(pin, spec, CheckoutAction::Cloned))
    }

    fn run_fresh_plan(&self, pin: &RepositoryPin, spec: &RefSpec) -> Result<()> {
        let git = self.store.git();
        let dir = self.store.path_for(&pin.name);
        let sparse = pin.sparse();

        match spec {
            RefSpec::Commit(_) | RefSpec::Tag(_) => {
                let options = CloneOptions {
                    no_checkout: true,
                    blobless: sparse.is_some(),
                    ..Default::default()
                };
                git.clone_repo(&pin.url, &dir, &options, spec.name())?;
                if let Some(paths) = sparse {
                    git.sparse_checkout_set(&dir, paths)?;
                }
                self.fetch_pinned_ref(pin, spec)?;
                git.checkout(&dir, spec.name())?;
            }
            RefSpec::Branch(branch) => {
                let options = CloneOptions {
                    depth: Some(1),
                    blobless: sparse.is_some(),
                    sparse: sparse.is_some(),
                    branch: branch.clone(),
                    ..Default::default()
                };
                git.clone_repo(&pin.url, &dir, &options, spec.name())?;
                if let Some(paths) = sparse {
                    git.sparse_checkout_set(&dir, paths)?;
                }
            }
        }
        Ok(())
    }

    /// Fetch the pinned commit or tag into an existing clone.
    ///
    /// A failed commit fetch is not fatal: the no-checkout clone carries the
    /// full history, and abbreviated hashes cannot be fetched by name anyway.
    /// The following checkout decides.
    fn fetch_pinned_ref(&self, pin: &RepositoryPin, spec: &RefSpec) -> Result<()> {
        let git = self.store.git();
        let dir = self.store.path_for(&pin.name);
        match spec {
            RefSpec::Commit(commit) => {
                if let Err(e) = git.fetch(&dir, commit, None) {
                    warn!("could not fetch {} of {}, using cloned history: {}", commit, pin.name, e);
                }
                Ok(())
            }
            RefSpec::Tag(tag) => git.fetch(&dir, &format!("refs/tags/{0}:refs/tags/{0}", tag), Some(1)),
            RefSpec::Branch(_) => Ok(()),
        }
    }

    fn report(&self, pin: &RepositoryPin, spec: RefSpec, action: CheckoutAction) -> CheckoutReport {
        CheckoutReport {
            name: pin.name.clone(),
            ref_spec: spec,
            sparse_paths: pin.sparse().map(<[String]>::to_vec),
            action,
            commit: self.store.short_commit(&pin.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pin::Category;
    use crate::testing::{FakeGit, CLONED_HEAD, UPDATED_HEAD};
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    const URL: &str = "https://github.com/noir-lang/noir";
    const COMMIT: &str = "4f1e2d3c4b5a69788796a5b4c3d2e1f001122334";

    fn setup() -> (TempDir, Arc<FakeGit>, CheckoutStrategy) {
        let temp = TempDir::new().unwrap();
        let git = Arc::new(FakeGit::new());
        let store = MirrorStore::with_operations(temp.path().to_path_buf(), git.clone());
        (temp, git, CheckoutStrategy::new(store))
    }

    fn pin() -> RepositoryPin {
        RepositoryPin::new("noir", URL, Category::Core)
    }

    #[test]
    fn test_commit_pin_with_sparse_plan() {
        let (_temp, git, strategy) = setup();
        let pin = pin()
            .with_commit(COMMIT)
            .with_sparse_paths(["noir_stdlib", "docs"]);

        let report = strategy.ensure(&pin, false).unwrap();

        assert_eq!(
            git.calls(),
            vec![
                format!("clone {} --no-checkout --filter=blob:none", URL),
                "sparse-checkout set noir_stdlib docs".to_string(),
                format!("fetch origin {}", COMMIT),
                format!("checkout {}", COMMIT),
            ]
        );
        assert_eq!(report.action, CheckoutAction::Cloned);
        assert_eq!(report.commit.as_deref(), Some("4f1e2d3"));
    }

    #[test]
    fn test_commit_pin_plan() {
        let (_temp, git, strategy) = setup();
        strategy.ensure(&pin().with_commit(COMMIT), false).unwrap();

        assert_eq!(
            git.calls(),
            vec![
                format!("clone {} --no-checkout", URL),
                format!("fetch origin {}", COMMIT),
                format!("checkout {}", COMMIT),
            ]
        );
    }

    #[test]
    fn test_commit_fetch_failure_still_checks_out() {
        let (_temp, git, strategy) = setup();
        git.fail_on("fetch");

        let report = strategy.ensure(&pin().with_commit("4f1e2d3"), false).unwrap();
        assert_eq!(report.action, CheckoutAction::Cloned);
        assert_eq!(git.calls().last().unwrap(), "checkout 4f1e2d3");
    }

    #[test]
    fn test_tag_pin_with_sparse_plan() {
        let (_temp, git, strategy) = setup();
        let pin = pin().with_tag("v1.0.0").with_sparse_paths(["noir_stdlib"]);

        let report = strategy.ensure(&pin, false).unwrap();

        assert_eq!(
            git.calls(),
            vec![
                format!("clone {} --no-checkout --filter=blob:none", URL),
                "sparse-checkout set noir_stdlib".to_string(),
                "fetch --depth=1 origin refs/tags/v1.0.0:refs/tags/v1.0.0".to_string(),
                "checkout v1.0.0".to_string(),
            ]
        );
        assert_eq!(
            report.to_string(),
            "Cloned noir at v1.0.0 (tag) [sparse: noir_stdlib]"
        );
    }

    #[test]
    fn test_tag_pin_plan() {
        let (_temp, git, strategy) = setup();
        strategy.ensure(&pin().with_tag("v1.0.0"), false).unwrap();

        assert_eq!(
            git.calls(),
            vec![
                format!("clone {} --no-checkout", URL),
                "fetch --depth=1 origin refs/tags/v1.0.0:refs/tags/v1.0.0".to_string(),
                "checkout v1.0.0".to_string(),
            ]
        );
    }

    #[test]
    fn test_branch_pin_with_sparse_plan() {
        let (_temp, git, strategy) = setup();
        let pin = pin().with_branch("master").with_sparse_paths(["docs"]);

        strategy.ensure(&pin, false).unwrap();

        assert_eq!(
            git.calls(),
            vec![
                format!(
                    "clone {} --depth=1 --filter=blob:none --sparse --branch master",
                    URL
                ),
                "sparse-checkout set docs".to_string(),
            ]
        );
    }

    #[test]
    fn test_default_branch_plan() {
        let (_temp, git, strategy) = setup();
        let report = strategy.ensure(&pin(), false).unwrap();

        assert_eq!(git.calls(), vec![format!("clone {} --depth=1", URL)]);
        assert_eq!(report.to_string(), "Cloned noir at default (branch)");
    }

    #[test]
    fn test_second_ensure_updates_in_place() {
        let (_temp, git, strategy) = setup();
        let pin = pin().with_tag("v1.0.0");

        strategy.ensure(&pin, false).unwrap();
        assert!(!reconcile::needs_reclone(&pin, strategy.store()));

        let before = git.calls().len();
        let report = strategy.ensure(&pin, false).unwrap();

        assert_eq!(report.action, CheckoutAction::Unchanged);
        assert!(
            git.calls()[before..].iter().all(|c| !c.starts_with("clone")),
            "no reclone expected: {:?}",
            git.calls()
        );
        assert!(strategy.store().is_on_tag("noir", "v1.0.0"));
    }

    #[test]
    fn test_force_reclones_existing_entry() {
        let (temp, git, strategy) = setup();
        let pin = pin().with_tag("v1.0.0");
        strategy.ensure(&pin, false).unwrap();
        fs::write(temp.path().join("noir/stale.txt"), "stale").unwrap();

        let report = strategy.ensure(&pin, true).unwrap();

        assert_eq!(report.action, CheckoutAction::Cloned);
        assert!(!temp.path().join("noir/stale.txt").exists());
        assert_eq!(
            git.calls()
                .iter()
                .filter(|c| c.starts_with("clone"))
                .count(),
            2
        );
    }

    #[test]
    fn test_pin_change_reclones() {
        let (_temp, git, strategy) = setup();
        git.seed(&strategy.store().path_for("noir"), COMMIT, Some("v0.36.0"));

        let report = strategy.ensure(&pin().with_tag("v1.0.0"), false).unwrap();

        assert_eq!(report.action, CheckoutAction::Cloned);
        assert!(strategy.store().is_on_tag("noir", "v1.0.0"));
    }

    #[test]
    fn test_branch_update_fetches_and_resets() {
        let (_temp, git, strategy) = setup();
        let dir = strategy.store().path_for("noir");
        git.seed(&dir, CLONED_HEAD, None);

        let report = strategy.ensure(&pin().with_branch("master"), false).unwrap();

        assert_eq!(report.action, CheckoutAction::Updated);
        assert_eq!(
            git.calls_in(&dir),
            vec!["fetch --depth=1 origin master", "reset --hard FETCH_HEAD"]
        );
        assert_eq!(
            strategy.store().current_commit("noir").as_deref(),
            Some(UPDATED_HEAD)
        );
    }

    #[test]
    fn test_branch_update_falls_back_to_pull() {
        let (_temp, git, strategy) = setup();
        let dir = strategy.store().path_for("noir");
        git.seed(&dir, CLONED_HEAD, None);
        git.fail_on("fetch");

        let report = strategy.ensure(&pin(), false).unwrap();

        assert_eq!(report.action, CheckoutAction::Updated);
        assert_eq!(
            git.calls_in(&dir),
            vec!["fetch --depth=1 origin HEAD", "pull"]
        );
    }

    #[test]
    fn test_branch_update_failure_leaves_entry() {
        let (_temp, git, strategy) = setup();
        let dir = strategy.store().path_for("noir");
        git.seed(&dir, CLONED_HEAD, None);
        git.fail_on("fetch");
        git.fail_on("pull");

        let err = strategy.ensure(&pin(), false).unwrap_err();

        assert!(matches!(err, Error::GitCommand { .. }));
        assert!(strategy.store().exists("noir"));
        assert_eq!(strategy.store().current_commit("noir").as_deref(), Some(CLONED_HEAD));
    }

    #[test]
    fn test_update_of_missing_entry_is_contract_violation() {
        let (_temp, _git, strategy) = setup();
        let err = strategy.update_in_place(&pin()).unwrap_err();
        assert!(matches!(err, Error::NotMirrored { .. }));
    }

    #[test]
    fn test_update_in_place_moves_mismatched_tag() {
        let (_temp, git, strategy) = setup();
        let dir = strategy.store().path_for("noir");
        git.seed(&dir, COMMIT, Some("v0.36.0"));

        let report = strategy.update_in_place(&pin().with_tag("v1.0.0")).unwrap();

        assert_eq!(report.action, CheckoutAction::Updated);
        assert_eq!(
            git.calls_in(&dir),
            vec![
                "fetch --depth=1 origin refs/tags/v1.0.0:refs/tags/v1.0.0",
                "checkout v1.0.0"
            ]
        );
    }

    #[test]
    fn test_update_reapplies_changed_sparse_paths() {
        let (_temp, git, strategy) = setup();
        let dir = strategy.store().path_for("noir");
        git.seed(&dir, CLONED_HEAD, None);

        strategy
            .ensure(&pin().with_sparse_paths(["noir_stdlib"]), false)
            .unwrap();

        assert_eq!(git.calls_in(&dir)[0], "sparse-checkout set noir_stdlib");
    }

    #[test]
    fn test_failed_clone_leaves_no_entry() {
        let (temp, git, strategy) = setup();
        git.fail_on("checkout");

        let err = strategy.ensure(&pin().with_tag("v1.0.0"), false).unwrap_err();

        assert!(matches!(err, Error::GitCommand { .. }));
        assert!(!strategy.store().exists("noir"));
        assert!(!temp.path().join("noir").exists());
    }

    #[test]
    fn test_leftover_directory_is_cleared_before_clone() {
        let (temp, git, strategy) = setup();
        fs::create_dir_all(temp.path().join("noir")).unwrap();
        fs::write(temp.path().join("noir/partial.nr"), "").unwrap();

        strategy.ensure(&pin(), false).unwrap();

        assert!(!temp.path().join("noir/partial.nr").exists());
        assert_eq!(git.calls().len(), 1);
    }
}
