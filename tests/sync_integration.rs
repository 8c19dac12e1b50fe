//! Integration tests running the checkout strategy against real git
//! repositories served from `file://` URLs.

#[allow(dead_code)]
mod common;
use common::prelude::*;

use noir_mirror::checkout::{CheckoutAction, CheckoutStrategy};
use noir_mirror::config::MirrorConfig;
use noir_mirror::mirror::MirrorStore;
use noir_mirror::pin::{Category, RepositoryPin};
use noir_mirror::reconcile;
use noir_mirror::sync::{Selection, SyncOrchestrator};

struct Setup {
    _temp: TempDir,
    origin: GitOrigin,
    first: String,
    checkout: CheckoutStrategy,
}

/// An origin with two tagged commits and a docs directory, plus an empty
/// mirror.
fn setup() -> Setup {
    let temp = TempDir::new().unwrap();
    let origin = GitOrigin::init(&temp.path().join("origin/widgets"));
    let first = origin.commit(
        &[
            ("src/lib.nr", "fn one() {}\n"),
            ("docs/guide.md", "# Guide\n"),
        ],
        "one",
    );
    origin.tag("v0.1.0");
    origin.commit(&[("src/lib.nr", "fn two() {}\n")], "two");
    origin.tag("v0.2.0");

    let config = MirrorConfig::new(temp.path().join("mirror"));
    let checkout = CheckoutStrategy::new(MirrorStore::new(&config));
    Setup {
        _temp: temp,
        origin,
        first,
        checkout,
    }
}

fn pin(setup: &Setup) -> RepositoryPin {
    RepositoryPin::new("widgets", setup.origin.url(), Category::Core)
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_commit_pin_checks_out_prefix() {
    let setup = setup();
    let store = setup.checkout.store();
    let pinned = pin(&setup).with_commit(&setup.first[..7]);

    let report = setup.checkout.ensure(&pinned, false).unwrap();

    assert_eq!(report.action, CheckoutAction::Cloned);
    assert!(store.current_commit("widgets").unwrap().starts_with(&setup.first[..7]));
    assert!(!reconcile::needs_reclone(&pinned, store));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_tag_pin_checks_out_exact_tag() {
    let setup = setup();
    let store = setup.checkout.store();
    let pinned = pin(&setup).with_tag("v0.1.0");

    setup.checkout.ensure(&pinned, false).unwrap();

    assert!(store.is_on_tag("widgets", "v0.1.0"));
    let lib = std::fs::read_to_string(store.path_for("widgets").join("src/lib.nr")).unwrap();
    assert_eq!(lib, "fn one() {}\n");
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_second_ensure_does_not_reclone() {
    let setup = setup();
    let store = setup.checkout.store();
    let pinned = pin(&setup).with_tag("v0.2.0");

    setup.checkout.ensure(&pinned, false).unwrap();
    assert!(!reconcile::needs_reclone(&pinned, store));

    let marker = store.path_for("widgets").join("untracked.txt");
    std::fs::write(&marker, "kept").unwrap();

    let report = setup.checkout.ensure(&pinned, false).unwrap();

    assert_eq!(report.action, CheckoutAction::Unchanged);
    assert!(marker.exists(), "in-place update must not reclone");
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_commit_with_two_tags_is_not_recloned() {
    let setup = setup();
    let store = setup.checkout.store();
    setup.origin.tag("v0.2.0-rc.1");
    let pinned = pin(&setup).with_tag("v0.2.0");

    setup.checkout.ensure(&pinned, false).unwrap();
    assert!(store.is_on_tag("widgets", "v0.2.0"));
    assert!(!reconcile::needs_reclone(&pinned, store));

    let marker = store.path_for("widgets").join("untracked.txt");
    std::fs::write(&marker, "kept").unwrap();
    let report = setup.checkout.ensure(&pinned, false).unwrap();

    assert_eq!(report.action, CheckoutAction::Unchanged);
    assert!(marker.exists());
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_changed_tag_reclones() {
    let setup = setup();
    let store = setup.checkout.store();

    setup.checkout.ensure(&pin(&setup).with_tag("v0.1.0"), false).unwrap();
    let report = setup.checkout.ensure(&pin(&setup).with_tag("v0.2.0"), false).unwrap();

    assert_eq!(report.action, CheckoutAction::Cloned);
    assert!(store.is_on_tag("widgets", "v0.2.0"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_sparse_tag_checkout_limits_tree() {
    let setup = setup();
    let store = setup.checkout.store();
    let pinned = pin(&setup).with_tag("v0.1.0").with_sparse_paths(["src"]);

    let report = setup.checkout.ensure(&pinned, false).unwrap();

    assert_eq!(report.sparse_paths, Some(vec!["src".to_string()]));
    let dir = store.path_for("widgets");
    assert!(dir.join("src/lib.nr").exists());
    assert!(!dir.join("docs").exists());
    assert!(store.is_on_tag("widgets", "v0.1.0"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_branch_pin_updates_in_place() {
    let setup = setup();
    let store = setup.checkout.store();
    let pinned = pin(&setup).with_branch("main");

    let first = setup.checkout.ensure(&pinned, false).unwrap();
    assert_eq!(first.action, CheckoutAction::Cloned);

    let newest = setup
        .origin
        .commit(&[("src/lib.nr", "fn three() {}\n")], "three");
    let second = setup.checkout.ensure(&pinned, false).unwrap();

    assert_eq!(second.action, CheckoutAction::Updated);
    assert_eq!(store.current_commit("widgets").as_deref(), Some(newest.as_str()));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_failed_clone_leaves_nothing_behind() {
    let setup = setup();
    let store = setup.checkout.store();
    let pinned = pin(&setup).with_tag("v9.9.9");

    assert!(setup.checkout.ensure(&pinned, false).is_err());
    assert!(!store.path_for("widgets").exists());
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_batch_isolates_failures() {
    let setup = setup();
    let pins = vec![
        pin(&setup).with_tag("v0.1.0"),
        RepositoryPin::new("broken", "file:///nonexistent/origin", Category::Core),
    ];
    let orchestrator = SyncOrchestrator::with_checkout(setup.checkout.clone(), None);

    let batch = orchestrator.reconcile(&pins, &Selection::Default, false);

    assert!(!batch.success);
    assert_eq!(batch.outcomes.len(), 2);
    assert!(batch.outcomes[0].ok);
    assert!(!batch.outcomes[0].looks_failed());
    assert!(!batch.outcomes[1].ok);
    assert!(batch.outcomes[1].looks_failed());
}
