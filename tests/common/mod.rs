//! Shared test utilities for integration and E2E tests.
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = MirrorFixture::new().with_file("noir/src/main.nr", "fn main() {}");
//!     // ... test code
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{git, GitOrigin, MirrorFixture};
}

/// A temporary mirror root populated with plain files.
pub struct MirrorFixture {
    pub temp: assert_fs::TempDir,
}

impl MirrorFixture {
    pub fn new() -> Self {
        Self {
            temp: assert_fs::TempDir::new().unwrap(),
        }
    }

    /// Add `content` at `relative` under the mirror root.
    pub fn with_file(self, relative: &str, content: &str) -> Self {
        self.temp.child(relative).write_str(content).unwrap();
        self
    }

    /// Mark `name` as a mirrored repository without running git.
    pub fn with_fake_checkout(self, name: &str) -> Self {
        self.temp.child(name).child(".git").create_dir_all().unwrap();
        self
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    /// Write a pin table at the mirror root and return its path.
    pub fn catalog(&self, yaml: &str) -> PathBuf {
        let child = self.temp.child("pins.yaml");
        child.write_str(yaml).unwrap();
        child.path().to_path_buf()
    }
}

/// Run git in `dir`, panicking with stderr on failure; returns trimmed stdout.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A local origin repository served over `file://`.
pub struct GitOrigin {
    pub dir: PathBuf,
}

impl GitOrigin {
    /// Initialise a repository at `dir` allowing partial and by-hash fetches.
    pub fn init(dir: &Path) -> Self {
        std::fs::create_dir_all(dir).unwrap();
        git(dir, &["init", "--quiet", "--initial-branch=main"]);
        git(dir, &["config", "user.name", "Fixture"]);
        git(dir, &["config", "user.email", "fixture@example.com"]);
        git(dir, &["config", "commit.gpgsign", "false"]);
        git(dir, &["config", "tag.gpgsign", "false"]);
        git(dir, &["config", "uploadpack.allowFilter", "true"]);
        git(dir, &["config", "uploadpack.allowAnySHA1InWant", "true"]);
        Self {
            dir: dir.to_path_buf(),
        }
    }

    /// Write files, commit them and return the new commit hash.
    pub fn commit(&self, files: &[(&str, &str)], message: &str) -> String {
        for (relative, content) in files {
            let path = self.dir.join(relative);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }
        git(&self.dir, &["add", "--all"]);
        git(&self.dir, &["commit", "--quiet", "-m", message]);
        git(&self.dir, &["rev-parse", "HEAD"])
    }

    pub fn tag(&self, name: &str) {
        git(&self.dir, &["tag", name]);
    }

    pub fn url(&self) -> String {
        format!("file://{}", self.dir.display())
    }
}
