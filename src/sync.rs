//! # Sync Orchestrator
//!
//! Runs the checkout strategy over a selection of pins and collects one
//! [`SyncOutcome`] per repository. Repositories are processed one after
//! another; a failure in one is recorded and the batch moves on.
//!
//! Every outcome carries a human-readable status. Failed statuses always
//! start with `Error:`, so callers that only see text can still detect
//! failure with a case-insensitive search for "error". [`SyncOutcome::ok`]
//! is the typed form of the same signal.

use log::{info, warn};
use serde::Serialize;

use crate::catalog::{self, VersionOverrides};
use crate::checkout::{CheckoutReport, CheckoutStrategy};
use crate::config::MirrorConfig;
use crate::error::Error;
use crate::mirror::MirrorStore;
use crate::pin::{Category, RepositoryPin};

/// Which pins a sync run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Explicit repository names.
    Names(Vec<String>),
    /// Every pin in any of these categories.
    Categories(Vec<Category>),
    /// Every pin in the `core` category.
    Default,
}

impl Selection {
    /// Names win over categories; neither means the default selection.
    pub fn from_request(repos: &[String], categories: &[Category]) -> Self {
        if !repos.is_empty() {
            Selection::Names(repos.to_vec())
        } else if !categories.is_empty() {
            Selection::Categories(categories.to_vec())
        } else {
            Selection::Default
        }
    }

    fn describe(&self) -> String {
        match self {
            Selection::Names(names) => format!("repositories [{}]", names.join(", ")),
            Selection::Categories(categories) => format!(
                "categories [{}]",
                categories
                    .iter()
                    .map(Category::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Selection::Default => "category [core]".to_string(),
        }
    }
}

/// A sync request as received from the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncRequest {
    /// Tag for the core repository; falls back to the configured default.
    pub version: Option<String>,
    /// Tag for the Aztec repository.
    pub aztec_version: Option<String>,
    /// Reclone even when the entry already matches.
    pub force: bool,
    pub repos: Vec<String>,
    pub categories: Vec<Category>,
}

/// Result of reconciling one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    pub ok: bool,
}

impl SyncOutcome {
    fn succeeded(report: &CheckoutReport) -> Self {
        Self {
            name: report.name.clone(),
            status: report.to_string(),
            commit: report.commit.clone(),
            ok: true,
        }
    }

    fn failed(name: &str, error: &Error) -> Self {
        Self {
            name: name.to_string(),
            status: format!("Error: {}", error),
            commit: None,
            ok: false,
        }
    }

    /// The textual failure check: does the status mention an error?
    pub fn looks_failed(&self) -> bool {
        self.status.to_lowercase().contains("error")
    }
}

/// Aggregate of one sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    /// True when at least one repository was selected and all succeeded.
    pub success: bool,
    pub message: String,
    pub outcomes: Vec<SyncOutcome>,
}

/// Progress notifications emitted during a run.
#[derive(Debug)]
pub enum SyncEvent<'a> {
    Started(&'a RepositoryPin),
    Finished(&'a SyncOutcome),
}

/// Drives the checkout strategy over a pin table.
#[derive(Debug, Clone)]
pub struct SyncOrchestrator {
    checkout: CheckoutStrategy,
    default_core_version: Option<String>,
}

impl SyncOrchestrator {
    /// An orchestrator over the mirror described by `config`.
    pub fn new(config: &MirrorConfig) -> Self {
        Self::with_checkout(
            CheckoutStrategy::new(MirrorStore::new(config)),
            config.core_version.clone(),
        )
    }

    pub fn with_checkout(checkout: CheckoutStrategy, default_core_version: Option<String>) -> Self {
        Self {
            checkout,
            default_core_version,
        }
    }

    pub fn store(&self) -> &MirrorStore {
        self.checkout.store()
    }

    /// Bind the request's version overrides onto `pins` and reconcile the
    /// requested selection.
    pub fn run(
        &self,
        pins: Vec<RepositoryPin>,
        request: &SyncRequest,
        observer: &mut dyn FnMut(SyncEvent<'_>),
    ) -> BatchResult {
        let overrides = VersionOverrides {
            core: request
                .version
                .clone()
                .or_else(|| self.default_core_version.clone()),
            aztec: request.aztec_version.clone(),
        };
        let pins = catalog::apply_overrides(pins, &overrides);
        let selection = Selection::from_request(&request.repos, &request.categories);
        self.reconcile_observed(&pins, &selection, request.force, observer)
    }

    /// Reconcile every pin in `selection`.
    pub fn reconcile(&self, pins: &[RepositoryPin], selection: &Selection, force: bool) -> BatchResult {
        self.reconcile_observed(pins, selection, force, &mut |_| {})
    }

    /// [`reconcile`](Self::reconcile), reporting progress to `observer`.
    pub fn reconcile_observed(
        &self,
        pins: &[RepositoryPin],
        selection: &Selection,
        force: bool,
        observer: &mut dyn FnMut(SyncEvent<'_>),
    ) -> BatchResult {
        let (selected, mut outcomes) = select(pins, selection);

        if selected.is_empty() {
            let message = if outcomes.is_empty() {
                format!("No repositories match {}", selection.describe())
            } else {
                format!("No known repositories in {}", selection.describe())
            };
            warn!("{}", message);
            return BatchResult {
                success: false,
                message,
                outcomes,
            };
        }

        info!("syncing {} repositories", selected.len());

        if let Err(e) = self.checkout.store().ensure_root() {
            warn!("cannot create mirror root: {}", e);
            outcomes.extend(selected.iter().map(|pin| SyncOutcome::failed(&pin.name, &e)));
            return finish(outcomes);
        }

        for pin in selected {
            observer(SyncEvent::Started(pin));
            let outcome = match self.checkout.ensure(pin, force) {
                Ok(report) => SyncOutcome::succeeded(&report),
                Err(e) => {
                    warn!("{} failed: {}", pin.name, e);
                    SyncOutcome::failed(&pin.name, &e)
                }
            };
            info!("{}: {}", outcome.name, outcome.status);
            observer(SyncEvent::Finished(&outcome));
            outcomes.push(outcome);
        }

        finish(outcomes)
    }
}

/// Split `pins` into the selected ones plus failure outcomes for names that
/// are not in the table.
fn select<'a>(pins: &'a [RepositoryPin], selection: &Selection) -> (Vec<&'a RepositoryPin>, Vec<SyncOutcome>) {
    match selection {
        Selection::Names(names) => {
            let mut selected = Vec::new();
            let mut unknown = Vec::new();
            for name in names {
                match pins.iter().find(|p| &p.name == name) {
                    Some(pin) if !selected.iter().any(|s: &&RepositoryPin| s.name == pin.name) => {
                        selected.push(pin)
                    }
                    Some(_) => {}
                    None => unknown.push(SyncOutcome::failed(
                        name,
                        &Error::UnknownRepository { name: name.clone() },
                    )),
                }
            }
            (selected, unknown)
        }
        Selection::Categories(categories) => (
            pins.iter()
                .filter(|p| categories.contains(&p.category))
                .collect(),
            Vec::new(),
        ),
        Selection::Default => (catalog::in_category(pins, Category::Core), Vec::new()),
    }
}

fn finish(outcomes: Vec<SyncOutcome>) -> BatchResult {
    let failed = outcomes.iter().filter(|o| !o.ok).count();
    let message = if failed == 0 {
        format!("Synced {} repositories", outcomes.len())
    } else {
        format!("{} of {} repositories failed", failed, outcomes.len())
    };
    BatchResult {
        success: failed == 0,
        message,
        outcomes,
    }
}
