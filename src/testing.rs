//! Recording `GitOperations` fake shared by unit tests.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::git::CloneOptions;
use crate::repository::GitOperations;

/// HEAD of a freshly cloned branch.
pub const CLONED_HEAD: &str = "c10ed00000000000000000000000000000000000";

/// HEAD after an in-place update.
pub const UPDATED_HEAD: &str = "0da7ed0000000000000000000000000000000000";

#[derive(Debug, Clone, Default)]
struct Head {
    commit: String,
    tags: Vec<String>,
    sparse: Option<Vec<String>>,
}

/// Simulates git against real directories: clones create `.git`, checkouts
/// move a recorded HEAD, and every call is logged.
#[derive(Default)]
pub struct FakeGit {
    calls: Mutex<Vec<(PathBuf, String)>>,
    heads: Mutex<HashMap<PathBuf, Head>>,
    failing_ops: Mutex<HashSet<String>>,
    failing_urls: Mutex<HashSet<String>>,
}

impl FakeGit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend `dir` is already a checkout at `commit` (and `tag`).
    pub fn seed(&self, dir: &Path, commit: &str, tag: Option<&str>) {
        fs::create_dir_all(dir.join(".git")).unwrap();
        self.heads.lock().unwrap().insert(
            dir.to_path_buf(),
            Head {
                commit: commit.to_string(),
                tags: tag.map(str::to_string).into_iter().collect(),
                sparse: None,
            },
        );
    }

    /// Put another tag on the seeded `HEAD` of `dir`.
    pub fn add_tag(&self, dir: &Path, tag: &str) {
        self.update_head(dir, |head| head.tags.push(tag.to_string()));
    }

    /// Make every call of `op` fail (`clone`, `fetch`, `checkout`, `reset`,
    /// `pull`, `sparse-checkout`, `head_commit`).
    pub fn fail_on(&self, op: &str) {
        self.failing_ops.lock().unwrap().insert(op.to_string());
    }

    /// Make clones of `url` fail.
    pub fn fail_url(&self, url: &str) {
        self.failing_urls.lock().unwrap().insert(url.to_string());
    }

    /// Every recorded operation, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, call)| call.clone())
            .collect()
    }

    /// Operations recorded against `dir`.
    pub fn calls_in(&self, dir: &Path) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(d, _)| d == dir)
            .map(|(_, call)| call.clone())
            .collect()
    }

    fn record(&self, dir: &Path, call: String) {
        self.calls.lock().unwrap().push((dir.to_path_buf(), call));
    }

    fn check(&self, op: &str, dir: &Path) -> Result<()> {
        if self.failing_ops.lock().unwrap().contains(op) {
            return Err(Error::GitCommand {
                command: op.to_string(),
                dir: dir.display().to_string(),
                stderr: "simulated failure".to_string(),
            });
        }
        Ok(())
    }

    fn update_head(&self, dir: &Path, update: impl FnOnce(&mut Head)) {
        let mut heads = self.heads.lock().unwrap();
        update(heads.entry(dir.to_path_buf()).or_default());
    }
}

impl GitOperations for FakeGit {
    fn clone_repo(
        &self,
        url: &str,
        target_dir: &Path,
        options: &CloneOptions,
        ref_label: &str,
    ) -> Result<()> {
        let mut call = format!("clone {}", url);
        for arg in options.to_args() {
            call.push(' ');
            call.push_str(&arg);
        }
        self.record(target_dir, call);

        if self.failing_urls.lock().unwrap().contains(url)
            || self.failing_ops.lock().unwrap().contains("clone")
        {
            return Err(Error::GitClone {
                url: url.to_string(),
                r#ref: ref_label.to_string(),
                message: "simulated failure".to_string(),
                hint: None,
            });
        }

        fs::create_dir_all(target_dir.join(".git"))?;
        self.heads.lock().unwrap().insert(
            target_dir.to_path_buf(),
            Head {
                commit: CLONED_HEAD.to_string(),
                ..Head::default()
            },
        );
        Ok(())
    }

    fn fetch(&self, dir: &Path, refspec: &str, depth: Option<u32>) -> Result<()> {
        let call = match depth {
            Some(depth) => format!("fetch --depth={} origin {}", depth, refspec),
            None => format!("fetch origin {}", refspec),
        };
        self.record(dir, call);
        self.check("fetch", dir)
    }

    fn checkout(&self, dir: &Path, rev: &str) -> Result<()> {
        self.record(dir, format!("checkout {}", rev));
        self.check("checkout", dir)?;
        let is_hash = rev.len() >= 7 && rev.chars().all(|c| c.is_ascii_hexdigit());
        self.update_head(dir, |head| {
            if is_hash {
                head.commit = format!("{:0<40}", rev);
                head.tags.clear();
            } else {
                head.tags = vec![rev.to_string()];
            }
        });
        Ok(())
    }

    fn reset_hard(&self, dir: &Path, rev: &str) -> Result<()> {
        self.record(dir, format!("reset --hard {}", rev));
        self.check("reset", dir)?;
        self.update_head(dir, |head| {
            head.commit = UPDATED_HEAD.to_string();
            head.tags.clear();
        });
        Ok(())
    }

    fn pull(&self, dir: &Path) -> Result<()> {
        self.record(dir, "pull".to_string());
        self.check("pull", dir)?;
        self.update_head(dir, |head| head.commit = UPDATED_HEAD.to_string());
        Ok(())
    }

    fn sparse_checkout_set(&self, dir: &Path, paths: &[String]) -> Result<()> {
        self.record(dir, format!("sparse-checkout set {}", paths.join(" ")));
        self.check("sparse-checkout", dir)?;
        self.update_head(dir, |head| head.sparse = Some(paths.to_vec()));
        Ok(())
    }

    fn sparse_checkout_list(&self, dir: &Path) -> Result<Option<Vec<String>>> {
        Ok(self
            .heads
            .lock()
            .unwrap()
            .get(dir)
            .and_then(|head| head.sparse.clone()))
    }

    fn head_commit(&self, dir: &Path, short: bool) -> Result<String> {
        self.check("head_commit", dir)?;
        let heads = self.heads.lock().unwrap();
        let head = heads.get(dir).ok_or_else(|| Error::GitCommand {
            command: "rev-parse HEAD".to_string(),
            dir: dir.display().to_string(),
            stderr: "not a git repository".to_string(),
        })?;
        Ok(if short {
            head.commit.chars().take(7).collect()
        } else {
            head.commit.clone()
        })
    }

    fn tags_at_head(&self, dir: &Path) -> Result<Vec<String>> {
        Ok(self
            .heads
            .lock()
            .unwrap()
            .get(dir)
            .map(|head| head.tags.clone())
            .unwrap_or_default())
    }
}
